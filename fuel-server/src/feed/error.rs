//! Fuel price feed error types.

/// Errors that can occur when fetching the station feed.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// The request could not be sent or the body could not be read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The feed answered with a non-success status.
    #[error("feed returned status {status}: {message}")]
    Fetch { status: u16, message: String },

    /// The body was not valid JSON.
    #[error("JSON parse error: {message}")]
    Parse {
        message: String,
        /// Leading part of the offending body, for logs.
        body: Option<String>,
    },

    /// The JSON did not contain the station list.
    #[error("unexpected feed structure: {0}")]
    Schema(String),
}

impl FeedError {
    /// HTTP status carried by a `Fetch` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            FeedError::Fetch { status, .. } => Some(*status),
            FeedError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
