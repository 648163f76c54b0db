//! Prometheus HTTP API client used as the migration source.

#![allow(clippy::missing_errors_doc, reason = "Errors are self-explanatory from Result types")]

mod api_types;
mod client;
pub mod error;

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use prom2influx_core::QueryResponse;

pub use client::PrometheusClient;
pub use error::SourceError;

/// Bounds and resolution of a range query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub step: Duration,
}

/// Read access to a pull-based monitoring source.
#[async_trait]
pub trait QuerySource: Send + Sync {
    /// Runtime flags of the source, including its retention window.
    async fn flags(&self) -> Result<HashMap<String, String>, SourceError>;

    /// Evaluate `query` over `range`.
    async fn query_range(&self, query: &str, range: QueryRange) -> Result<QueryResponse, SourceError>;
}
