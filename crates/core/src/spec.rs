//! Migration configuration, before and after resolution.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use crate::constants::{DEFAULT_STEP, EXTERNAL_LABEL_KEY, WINDOW_STEP_MULTIPLIER};
use crate::error::{CoreError, Result};
use crate::precision::Precision;
use crate::window::Windows;

/// Fixed tag identifying where migrated data came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExternalLabel {
    pub key: String,
    pub value: String,
}

impl ExternalLabel {
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self { key: key.into(), value: value.into() }
    }

    /// The `monitor=<value>` label used by the CLI.
    #[must_use]
    pub fn monitor(value: impl Into<String>) -> Self {
        Self::new(EXTERNAL_LABEL_KEY, value)
    }
}

/// Raw migration settings as supplied by the caller. Unset values are
/// resolved by the orchestrator before any job runs.
#[derive(Debug, Clone)]
pub struct MigrationConfig {
    pub database: String,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub step: Option<Duration>,
    pub concurrency: usize,
    pub retry_limit: u32,
    /// Comma-delimited metric names; empty means a single unnamed job.
    pub metrics: String,
    pub external_label: ExternalLabel,
    pub precision: Precision,
}

impl MigrationConfig {
    /// Split the metric list. An empty list yields one empty-string metric so
    /// that the run still issues exactly one job.
    #[must_use]
    pub fn metric_names(&self) -> Vec<String> {
        if self.metrics.is_empty() {
            return vec![String::new()];
        }
        self.metrics.split(',').map(str::to_owned).collect()
    }

    /// Step with the one-minute default applied.
    #[must_use]
    pub fn effective_step(&self) -> Duration {
        match self.step {
            Some(step) if !step.is_zero() => step,
            _ => DEFAULT_STEP,
        }
    }

    /// Concurrency with the default of one applied.
    #[must_use]
    pub fn effective_concurrency(&self) -> usize {
        self.concurrency.max(1)
    }
}

/// Fully resolved, immutable configuration shared by every metric job.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationSpec {
    pub database: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(serialize_with = "serialize_duration")]
    pub step: Duration,
    pub external_label: ExternalLabel,
    pub concurrency: usize,
    pub retry_limit: u32,
    pub precision: Precision,
}

impl MigrationSpec {
    /// Build a spec from a config whose start and end have been resolved.
    pub fn resolve(config: &MigrationConfig, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if end < start {
            return Err(CoreError::InvalidRange { start: start.to_rfc3339(), end: end.to_rfc3339() });
        }
        let step = config.effective_step();
        Ok(Self {
            database: config.database.clone(),
            start,
            end,
            step,
            external_label: config.external_label.clone(),
            concurrency: config.effective_concurrency(),
            retry_limit: config.retry_limit,
            precision: config.precision,
        })
    }

    /// Length of one query window: the step scaled by the window multiplier.
    #[must_use]
    pub fn window_span(&self) -> chrono::Duration {
        let span = self.step.saturating_mul(WINDOW_STEP_MULTIPLIER);
        chrono::Duration::from_std(span).unwrap_or(chrono::Duration::MAX)
    }

    /// Windows tiling `[start, end)` in time order.
    #[must_use]
    pub fn windows(&self) -> Windows {
        Windows::new(self.start, self.end, self.window_span())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

fn serialize_duration<S: Serializer>(value: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(&humantime::format_duration(*value))
}
