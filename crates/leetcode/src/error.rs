#[derive(Debug, thiserror::Error)]
pub enum LeetCodeError {
    /// The HTTP request failed (network, DNS, timeout, undecodable body).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API answered with a non-2xx status code.
    #[error("LeetCode returned HTTP {0}")]
    HttpStatus(u16),

    /// The response carried a GraphQL `errors` array.
    #[error("GraphQL error: {0}")]
    GraphQl(String),

    /// The response had neither data nor errors.
    #[error("Empty GraphQL response")]
    EmptyResponse,
}
