//! Typed error enum for the write sink.

use thiserror::Error;

/// Errors from sink write calls.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),
    #[error("HTTP status {code}: {message}")]
    HttpStatus { code: u16, message: String },
    #[error("client initialization failed: {0}")]
    ClientInit(String),
}

impl SinkError {
    /// Whether this error is likely transient. The transfer engine retries
    /// every sink error regardless; this is for callers that care.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::HttpRequest(_) => true,
            Self::HttpStatus { code, .. } => *code == 429 || *code >= 500,
            _ => false,
        }
    }
}
