//! Typed error enum for the transfer engine.
//!
//! Only sink writes are retried, inside the window writer. Every variant here
//! is fatal to the job that raised it and therefore to the whole run.

use prom2influx_core::{CoreError, TimeWindow};
use prom2influx_influxdb::SinkError;
use prom2influx_prometheus::SourceError;
use thiserror::Error;

use crate::report::MigrationReport;

#[derive(Debug, Error)]
pub enum TransferError {
    /// Configuration could not be resolved (range, step, retention syntax).
    #[error("config: {0}")]
    Config(#[from] CoreError),

    /// Source flags could not be read while resolving the start time.
    #[error("read source flags: {0}")]
    Flags(#[source] SourceError),

    #[error("query {metric:?} [{window}]: {source}")]
    Query {
        metric: String,
        window: TimeWindow,
        #[source]
        source: SourceError,
    },

    #[error("query {metric:?} [{window}] timed out after {timeout_secs}s")]
    QueryTimeout { metric: String, window: TimeWindow, timeout_secs: u64 },

    /// The source answered with a result shape the converter does not know.
    #[error("unknown value type {result_type:?} for metric {metric:?}")]
    UnknownShape { metric: String, result_type: String },

    /// A batch still failed after every retry.
    #[error("write {metric:?} failed after {attempts} attempts: {source}")]
    Write {
        metric: String,
        attempts: u32,
        #[source]
        source: SinkError,
    },

    /// A job failed; siblings were cancelled. Carries the per-metric report.
    #[error("migration aborted by metric {metric:?}: {source}")]
    Aborted {
        metric: String,
        #[source]
        source: Box<TransferError>,
        report: MigrationReport,
    },

    /// A job task panicked or the admission gate closed.
    #[error("job task failed: {0}")]
    TaskJoin(String),
}

impl TransferError {
    /// Metric the error belongs to, if any.
    #[must_use]
    pub fn metric(&self) -> Option<&str> {
        match self {
            Self::Query { metric, .. }
            | Self::QueryTimeout { metric, .. }
            | Self::UnknownShape { metric, .. }
            | Self::Write { metric, .. }
            | Self::Aborted { metric, .. } => Some(metric),
            Self::Config(_) | Self::Flags(_) | Self::TaskJoin(_) => None,
        }
    }

    /// Report attached to an aborted run.
    #[must_use]
    pub fn report(&self) -> Option<&MigrationReport> {
        match self {
            Self::Aborted { report, .. } => Some(report),
            _ => None,
        }
    }

    /// Innermost engine error, unwrapping `Aborted`.
    #[must_use]
    pub fn root(&self) -> &Self {
        match self {
            Self::Aborted { source, .. } => source.root(),
            other => other,
        }
    }
}
