//! Error types for voya-api

use thiserror::Error;

/// Result type alias using voya-api Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to the chat backend
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A completed event line was not valid UTF-8
    #[error("invalid UTF-8 in stream: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// A decoded event line could not be parsed into a recognized event
    #[error("malformed event: {0}")]
    MalformedEvent(String),
}

impl Error {
    /// Check if this error is worth retrying at connection time
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(e) => {
                if e.is_timeout() || e.is_connect() {
                    return true;
                }
                e.status().is_some_and(|status| {
                    status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
                })
            }
            _ => false,
        }
    }
}
