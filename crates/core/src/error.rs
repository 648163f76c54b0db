use thiserror::Error;

/// Errors raised while building or validating core domain values.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("invalid precision: {0} (expected one of ns|u|ms|s|m|h)")]
    InvalidPrecision(String),

    #[error("invalid duration {value:?}: {reason}")]
    InvalidDuration { value: String, reason: String },

    #[error("no non-zero retention flag found (looked for {0})")]
    RetentionNotFound(String),

    #[error("invalid time range: end {end} precedes start {start}")]
    InvalidRange { start: String, end: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
