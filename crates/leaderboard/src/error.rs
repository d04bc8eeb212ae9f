//! Error types for the leaderboard service.

use thiserror::Error;

/// Rejections of client-supplied score data
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScoreError {
    #[error("Invalid data. Name, time (number), and date are required.")]
    InvalidSubmission,
    #[error("Invalid time parameter")]
    InvalidTime,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("store encoding failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("key {key} holds a value of the wrong type")]
    WrongType { key: String },
    #[error("store lock poisoned")]
    Poisoned,
}

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("connection closed before a full request arrived")]
    Incomplete,
    #[error("malformed request: {0}")]
    Malformed(&'static str),
    #[error("request body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl HttpError {
    /// Status code answered for a request that failed to parse
    pub fn status(&self) -> u16 {
        match self {
            HttpError::BodyTooLarge { .. } => 413,
            _ => 400,
        }
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request to {addr} timed out")]
    Timeout { addr: String },
    #[error(transparent)]
    Http(#[from] HttpError),
    #[error("invalid response body: {0}")]
    Json(#[from] serde_json::Error),
    #[error("server answered {status}: {message}")]
    Status { status: u16, message: String },
}

impl From<std::io::Error> for ClientError {
    fn from(e: std::io::Error) -> Self {
        ClientError::Http(HttpError::Io(e))
    }
}
