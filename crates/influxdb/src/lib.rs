//! InfluxDB 1.x client used as the migration sink.

#![allow(clippy::missing_errors_doc, reason = "Errors are self-explanatory from Result types")]

mod client;
pub mod error;

use async_trait::async_trait;
use prom2influx_core::WriteBatch;

pub use client::{Credentials, InfluxClient};
pub use error::SinkError;

/// Batch-oriented time-series store. Implementations must tolerate
/// concurrent `write` calls from several metric jobs.
#[async_trait]
pub trait WriteSink: Send + Sync {
    /// Commit one batch as a single write call.
    async fn write(&self, batch: &WriteBatch) -> Result<(), SinkError>;
}
