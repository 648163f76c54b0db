//! Query results returned by the source for one (metric, window) range query.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

/// Label set of one series, ordered by name.
pub type Labels = BTreeMap<String, String>;

/// One numeric sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// A label-tagged sequence of samples.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub labels: Labels,
    pub samples: Vec<Sample>,
}

/// A label-tagged sample at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct InstantSample {
    pub labels: Labels,
    pub sample: Sample,
}

/// Result of a range query, one case per shape the source can return.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    /// Independent series, each with its own samples (`matrix`).
    SeriesSet(Vec<Series>),
    /// One sample per series at one instant (`vector`).
    Vector(Vec<InstantSample>),
    /// A single unlabeled number (`scalar`).
    Scalar(Sample),
    /// A single unlabeled string (`string`).
    String { timestamp: DateTime<Utc>, value: String },
}

impl QueryResult {
    /// Name of the shape as reported by the source.
    #[must_use]
    pub const fn result_type(&self) -> &'static str {
        match *self {
            Self::SeriesSet(_) => "matrix",
            Self::Vector(_) => "vector",
            Self::Scalar(_) => "scalar",
            Self::String { .. } => "string",
        }
    }

    /// Number of values carried, used for progress reporting.
    #[must_use]
    pub fn sample_count(&self) -> usize {
        match self {
            Self::SeriesSet(series) => series.iter().map(|s| s.samples.len()).sum(),
            Self::Vector(samples) => samples.len(),
            Self::Scalar(_) | Self::String { .. } => 1,
        }
    }
}

/// A query result plus any warnings the source attached to it.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResponse {
    pub result: QueryResult,
    pub warnings: Vec<String>,
}

impl From<QueryResult> for QueryResponse {
    fn from(result: QueryResult) -> Self {
        Self { result, warnings: Vec::new() }
    }
}
