//! ntfy push delivery.
//!
//! [`NtfyDelivery`] posts the notification body to `{base}/{channel_key}` and
//! carries everything else in headers. One attempt per notification: the
//! engine treats a failed delivery as "try again next tick".

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use studynudge_core::notification::Notification;
use studynudge_engine::{DispatchError, NotificationDispatcher};

pub const DEFAULT_NTFY_BASE_URL: &str = "https://ntfy.sh";

/// HTTP request timeout for a single delivery attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum NtfyError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The ntfy server returned a non-2xx status code.
    #[error("ntfy returned HTTP {0}")]
    HttpStatus(u16),

    #[error("Invalid {0} header")]
    InvalidHeader(&'static str),
}

impl From<NtfyError> for DispatchError {
    fn from(err: NtfyError) -> Self {
        match err {
            NtfyError::HttpStatus(code) => DispatchError::Rejected(code),
            other => DispatchError::Transport(other.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// NtfyDelivery
// ---------------------------------------------------------------------------

pub struct NtfyDelivery {
    client: reqwest::Client,
    base_url: String,
}

impl NtfyDelivery {
    pub fn new(base_url: impl Into<String>) -> Result<Self, NtfyError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn topic_url(&self, channel_key: &str) -> String {
        format!("{}/{channel_key}", self.base_url)
    }

    /// Execute a single POST and check the response status.
    pub async fn send(&self, notification: &Notification) -> Result<(), NtfyError> {
        let response = self
            .client
            .post(self.topic_url(&notification.channel_key))
            .headers(headers_for(notification)?)
            .body(notification.body.clone())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(NtfyError::HttpStatus(response.status().as_u16()));
        }
        Ok(())
    }
}

#[async_trait]
impl NotificationDispatcher for NtfyDelivery {
    async fn dispatch(&self, notification: &Notification) -> Result<(), DispatchError> {
        self.send(notification).await.map_err(|e| {
            // The channel key is a secret: log the title only.
            tracing::warn!(title = %notification.title, error = %e, "ntfy delivery failed");
            DispatchError::from(e)
        })
    }
}

/// Build the ntfy header set for a notification.
pub fn headers_for(notification: &Notification) -> Result<HeaderMap, NtfyError> {
    let mut headers = HeaderMap::new();
    insert(&mut headers, "title", &notification.title)?;
    insert(&mut headers, "priority", &notification.priority.level().to_string())?;

    if !notification.tags.is_empty() {
        insert(&mut headers, "tags", &notification.tags.join(","))?;
    }

    if let Some(first) = notification.actions.first() {
        insert(&mut headers, "click", &first.url)?;
        let actions = notification
            .actions
            .iter()
            .map(|a| format!("view, {}, {}", a.label, a.url))
            .collect::<Vec<_>>()
            .join("; ");
        insert(&mut headers, "actions", &actions)?;
    }
    Ok(headers)
}

fn insert(headers: &mut HeaderMap, name: &'static str, value: &str) -> Result<(), NtfyError> {
    let value = HeaderValue::from_bytes(&latin1_bytes(value))
        .map_err(|_| NtfyError::InvalidHeader(name))?;
    headers.insert(HeaderName::from_static(name), value);
    Ok(())
}

/// Encode `value` as ISO-8859-1, dropping characters it cannot represent and
/// control characters other than tab.
pub fn latin1_bytes(value: &str) -> Vec<u8> {
    value
        .chars()
        .filter_map(|c| u8::try_from(u32::from(c)).ok())
        .filter(|b| *b == b'\t' || (*b >= 0x20 && *b != 0x7f))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use studynudge_core::notification::{NotificationAction, Priority};

    fn notification() -> Notification {
        Notification {
            channel_key: "abc123".into(),
            title: "Daily Challenge 🚀".into(),
            body: "Today's Challenge: Two Sum".into(),
            tags: vec!["brain".into()],
            priority: Priority::High,
            actions: vec![
                NotificationAction::new("Solve Now", "https://leetcode.com/problems/two-sum/"),
                NotificationAction::new("Manage Settings", "https://app.test/settings/abc123"),
            ],
        }
    }

    #[test]
    fn latin1_drops_wide_and_control_chars() {
        assert_eq!(latin1_bytes("Café ✓"), vec![b'C', b'a', b'f', 0xE9, b' ']);
        assert_eq!(latin1_bytes("a\nb\tc"), b"ab\tc".to_vec());
    }

    #[test]
    fn headers_carry_actions_and_click() {
        let headers = headers_for(&notification()).unwrap();
        assert_eq!(headers["title"], "Daily Challenge ");
        assert_eq!(headers["priority"], "4");
        assert_eq!(headers["tags"], "brain");
        assert_eq!(headers["click"], "https://leetcode.com/problems/two-sum/");
        assert_eq!(
            headers["actions"],
            "view, Solve Now, https://leetcode.com/problems/two-sum/; \
             view, Manage Settings, https://app.test/settings/abc123"
        );
    }

    #[test]
    fn no_actions_means_no_click() {
        let mut n = notification();
        n.actions.clear();
        let headers = headers_for(&n).unwrap();
        assert!(headers.get("click").is_none());
        assert!(headers.get("actions").is_none());
    }

    #[test]
    fn topic_url_trims_trailing_slash() {
        let delivery = NtfyDelivery::new("https://ntfy.example/").unwrap();
        assert_eq!(delivery.topic_url("k"), "https://ntfy.example/k");
    }

    #[test]
    fn status_errors_map_to_rejected() {
        assert!(matches!(
            DispatchError::from(NtfyError::HttpStatus(429)),
            DispatchError::Rejected(429)
        ));
        assert!(matches!(
            DispatchError::from(NtfyError::InvalidHeader("title")),
            DispatchError::Transport(_)
        ));
    }
}
