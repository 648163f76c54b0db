//! Typed error enum for the query source.

use thiserror::Error;

/// Errors from Prometheus API calls.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),
    #[error("HTTP status {code}: {body}")]
    HttpStatus { code: u16, body: String },
    #[error("query rejected ({error_type}): {message}")]
    Api { error_type: String, message: String },
    #[error("JSON parse error in {context}: {source}")]
    JsonParse {
        context: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("response missing data: {0}")]
    MissingData(String),
    #[error("invalid sample: {0}")]
    InvalidSample(String),
    #[error("unknown result type: {0}")]
    UnknownResultType(String),
    #[error("client initialization failed: {0}")]
    ClientInit(String),
}

impl SourceError {
    /// Whether this error is transient and a retry might succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::HttpRequest(e) => e.is_timeout() || e.is_connect(),
            Self::HttpStatus { code, .. } => matches!(code, 429 | 502 | 503 | 504),
            Self::Api { error_type, .. } => matches!(error_type.as_str(), "timeout" | "unavailable"),
            _ => false,
        }
    }
}
