use std::str::FromStr;
use std::time::Duration;

use studynudge_core::config::NudgeConfig;
use studynudge_core::schedule::{DEFAULT_COOLDOWN_MINUTES, MAX_COOLDOWN_MINUTES};
use studynudge_engine::DEFAULT_MAX_CONCURRENCY;
use studynudge_events::{DEFAULT_NTFY_BASE_URL, DEFAULT_TICK_INTERVAL};
use studynudge_leetcode::DEFAULT_GRAPHQL_URL;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} has invalid value '{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Server configuration loaded from environment variables.
///
/// Everything except `DATABASE_URL` has a default suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    pub database_url: String,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Public base URL of the settings page, used in notification actions.
    pub app_url: String,
    pub ntfy_base_url: String,
    pub leetcode_graphql_url: String,
    pub cooldown_minutes: i64,
    pub scheduler_interval_secs: u64,
    pub scheduler_enabled: bool,
    /// Upper bound on evaluations in flight during one scheduler tick.
    pub max_concurrent_evaluations: usize,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                      | Default                        |
    /// |------------------------------|--------------------------------|
    /// | `HOST`                       | `0.0.0.0`                      |
    /// | `PORT`                       | `3000`                         |
    /// | `DATABASE_URL`               | required                       |
    /// | `CORS_ORIGINS`               | `http://localhost:3000`        |
    /// | `REQUEST_TIMEOUT_SECS`       | `30`                           |
    /// | `APP_URL`                    | `http://localhost:3000`        |
    /// | `NTFY_BASE_URL`              | `https://ntfy.sh`              |
    /// | `LEETCODE_GRAPHQL_URL`       | `https://leetcode.com/graphql` |
    /// | `NUDGE_COOLDOWN_MINUTES`     | `180`                          |
    /// | `SCHEDULER_INTERVAL_SECS`    | `900`                          |
    /// | `SCHEDULER_ENABLED`          | `true`                         |
    /// | `MAX_CONCURRENT_EVALUATIONS` | `8`                            |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let cors_origins: Vec<String> = var("CORS_ORIGINS", "http://localhost:3000")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let cooldown_minutes: i64 = parse(
            "NUDGE_COOLDOWN_MINUTES",
            lookup("NUDGE_COOLDOWN_MINUTES"),
            DEFAULT_COOLDOWN_MINUTES,
        )?;
        if !(0..=MAX_COOLDOWN_MINUTES).contains(&cooldown_minutes) {
            return Err(ConfigError::Invalid {
                var: "NUDGE_COOLDOWN_MINUTES",
                value: cooldown_minutes.to_string(),
                reason: format!("must be between 0 and {MAX_COOLDOWN_MINUTES}"),
            });
        }

        let max_concurrent_evaluations: usize = parse(
            "MAX_CONCURRENT_EVALUATIONS",
            lookup("MAX_CONCURRENT_EVALUATIONS"),
            DEFAULT_MAX_CONCURRENCY,
        )?;
        if max_concurrent_evaluations == 0 {
            return Err(ConfigError::Invalid {
                var: "MAX_CONCURRENT_EVALUATIONS",
                value: "0".into(),
                reason: "must be at least 1".into(),
            });
        }

        let scheduler_interval_secs: u64 = parse(
            "SCHEDULER_INTERVAL_SECS",
            lookup("SCHEDULER_INTERVAL_SECS"),
            DEFAULT_TICK_INTERVAL.as_secs(),
        )?;
        if scheduler_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                var: "SCHEDULER_INTERVAL_SECS",
                value: "0".into(),
                reason: "must be at least 1".into(),
            });
        }

        Ok(Self {
            host: var("HOST", "0.0.0.0"),
            port: parse("PORT", lookup("PORT"), 3000)?,
            database_url,
            cors_origins,
            request_timeout_secs: parse(
                "REQUEST_TIMEOUT_SECS",
                lookup("REQUEST_TIMEOUT_SECS"),
                30,
            )?,
            app_url: var("APP_URL", "http://localhost:3000")
                .trim_end_matches('/')
                .to_string(),
            ntfy_base_url: var("NTFY_BASE_URL", DEFAULT_NTFY_BASE_URL),
            leetcode_graphql_url: var("LEETCODE_GRAPHQL_URL", DEFAULT_GRAPHQL_URL),
            cooldown_minutes,
            scheduler_interval_secs,
            scheduler_enabled: parse("SCHEDULER_ENABLED", lookup("SCHEDULER_ENABLED"), true)?,
            max_concurrent_evaluations,
        })
    }

    /// Engine tunables derived from this configuration.
    pub fn nudge_config(&self) -> NudgeConfig {
        NudgeConfig {
            cooldown_minutes: self.cooldown_minutes,
            app_url: self.app_url.clone(),
        }
    }

    pub fn scheduler_interval(&self) -> Duration {
        Duration::from_secs(self.scheduler_interval_secs)
    }
}

fn parse<T>(var: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => {
            let parsed = value.trim().parse::<T>();
            parsed.map_err(|e| ConfigError::Invalid {
                var,
                reason: e.to_string(),
                value,
            })
        }
    }
}
