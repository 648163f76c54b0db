//! Migration of a single metric across the whole time range.

use std::sync::Arc;
use std::time::Duration;

use prom2influx_core::{MigrationSpec, QueryResponse, TimeWindow, query_timeout};
use prom2influx_influxdb::WriteSink;
use prom2influx_prometheus::{QueryRange, QuerySource, SourceError};
use tokio_util::sync::CancellationToken;

use crate::converter::convert;
use crate::error::TransferError;
use crate::report::{JobReport, JobStatus};
use crate::writer::write_with_retry;

/// Why a job stopped before its last window.
enum Stop {
    Cancelled,
    Failed(TransferError),
}

impl From<TransferError> for Stop {
    fn from(err: TransferError) -> Self {
        Self::Failed(err)
    }
}

/// Final state of a job: its report plus the error that ended it, if any.
#[derive(Debug)]
pub struct JobOutcome {
    pub report: JobReport,
    pub error: Option<TransferError>,
}

impl JobOutcome {
    pub fn into_result(self) -> Result<JobReport, TransferError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.report),
        }
    }
}

/// Walks one metric's range window by window: query, convert, write.
pub struct MetricJob {
    metric: String,
    spec: Arc<MigrationSpec>,
    source: Arc<dyn QuerySource>,
    sink: Arc<dyn WriteSink>,
    query_timeout: Duration,
}

impl MetricJob {
    #[must_use]
    pub fn new(
        metric: String,
        spec: Arc<MigrationSpec>,
        source: Arc<dyn QuerySource>,
        sink: Arc<dyn WriteSink>,
    ) -> Self {
        Self { metric, spec, source, sink, query_timeout: query_timeout() }
    }

    #[must_use]
    pub fn metric(&self) -> &str {
        &self.metric
    }

    #[must_use]
    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    /// Run to completion, failure or cancellation. Windows are processed in
    /// order; a window starts only after every batch of the previous one was
    /// written.
    pub async fn run(&self, cancel: &CancellationToken) -> JobOutcome {
        let mut report = JobReport::new(&self.metric);
        match self.migrate(cancel, &mut report).await {
            Ok(()) => {
                report.status = JobStatus::Completed;
                JobOutcome { report, error: None }
            },
            Err(Stop::Cancelled) => {
                report.status = JobStatus::Cancelled;
                JobOutcome { report, error: None }
            },
            Err(Stop::Failed(err)) => {
                report.status = JobStatus::Failed(err.to_string());
                JobOutcome { report, error: Some(err) }
            },
        }
    }

    async fn migrate(&self, cancel: &CancellationToken, report: &mut JobReport) -> Result<(), Stop> {
        let metric = self.metric.as_str();
        for window in self.spec.windows() {
            if cancel.is_cancelled() {
                return Err(Stop::Cancelled);
            }
            tracing::info!(metric, "{metric}... {window}");

            let response = self.query(window, cancel).await?;
            tracing::debug!(
                metric,
                result_type = response.result.result_type(),
                samples = response.result.sample_count(),
                "window answered"
            );
            for warning in &response.warnings {
                tracing::warn!(metric, %window, "source warning: {warning}");
            }

            let batches = convert(
                metric,
                &self.spec.external_label,
                &self.spec.database,
                self.spec.precision,
                response.result,
            );
            for batch in &batches {
                write_with_retry(self.sink.as_ref(), metric, batch, self.spec.retry_limit).await?;
                report.batches += 1;
                report.points += batch.len();
            }

            report.windows += 1;
            report.committed_until = Some(window.end);
        }
        Ok(())
    }

    async fn query(&self, window: TimeWindow, cancel: &CancellationToken) -> Result<QueryResponse, Stop> {
        let range = QueryRange { start: window.start, end: window.end, step: self.spec.step };
        let query = tokio::time::timeout(self.query_timeout, self.source.query_range(&self.metric, range));

        let answer = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(Stop::Cancelled),
            answer = query => answer,
        };

        match answer {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(SourceError::UnknownResultType(result_type))) => {
                Err(TransferError::UnknownShape { metric: self.metric.clone(), result_type }.into())
            },
            Ok(Err(source)) => {
                Err(TransferError::Query { metric: self.metric.clone(), window, source }.into())
            },
            Err(_elapsed) => Err(TransferError::QueryTimeout {
                metric: self.metric.clone(),
                window,
                timeout_secs: self.query_timeout.as_secs(),
            }
            .into()),
        }
    }
}

/// Migrate one metric with no sibling jobs to cancel it.
pub async fn run_one(
    metric: &str,
    spec: Arc<MigrationSpec>,
    source: Arc<dyn QuerySource>,
    sink: Arc<dyn WriteSink>,
) -> Result<JobReport, TransferError> {
    let job = MetricJob::new(metric.to_owned(), spec, source, sink);
    job.run(&CancellationToken::new()).await.into_result()
}
