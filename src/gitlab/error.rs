use thiserror::Error;

/// Errors from the GitLab API boundary.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request could not be sent or the connection failed.
    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Non-success HTTP status.
    #[error("HTTP {status} from {url}: {message}")]
    Http {
        url: String,
        status: u16,
        message: String,
    },

    /// Response body did not decode as the expected shape.
    #[error("Failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Project lookup returned 404.
    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    /// Group lookup returned 404.
    #[error("Group not found: {0}")]
    GroupNotFound(u64),
}
