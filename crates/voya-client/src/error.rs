//! Error types for voya-client

use thiserror::Error;

/// Result type alias using voya-client Error
pub type Result<T> = std::result::Result<T, Error>;

/// Ways a turn can fail
#[derive(Error, Debug)]
pub enum Error {
    /// Transport-level failure before or during the stream
    #[error(transparent)]
    Api(#[from] voya_api::Error),

    /// An explicit error event from the backend
    #[error("server error: {0}")]
    Server(String),

    /// The stream ended without a terminal event
    #[error("stream ended before a final event")]
    TruncatedStream,

    /// The turn was aborted from outside
    #[error("request cancelled")]
    Cancelled,
}

impl Error {
    /// The natural-language text written into the message history. Backend
    /// error messages pass through verbatim; protocol-level failures all
    /// collapse into one generic line.
    pub fn user_message(&self) -> String {
        match self {
            Error::Server(message) => message.clone(),
            Error::Cancelled => "Request cancelled.".to_string(),
            Error::Api(_) | Error::TruncatedStream => {
                "Request failed, please try again.".to_string()
            }
        }
    }
}
