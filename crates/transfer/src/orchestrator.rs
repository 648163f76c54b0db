//! Fans a migration out across metric names under a concurrency cap.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use prom2influx_core::{CoreError, MigrationConfig, MigrationSpec, query_timeout, retention_from_flags};
use prom2influx_influxdb::WriteSink;
use prom2influx_prometheus::QuerySource;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::error::TransferError;
use crate::job::{JobOutcome, MetricJob};
use crate::report::{JobReport, JobStatus, MigrationReport};

pub struct Migration {
    source: Arc<dyn QuerySource>,
    sink: Arc<dyn WriteSink>,
    query_timeout: Duration,
}

impl Migration {
    #[must_use]
    pub fn new(source: Arc<dyn QuerySource>, sink: Arc<dyn WriteSink>) -> Self {
        Self { source, sink, query_timeout: query_timeout() }
    }

    #[must_use]
    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    /// Resolve unset bounds: `end` defaults to `now`, `start` to `now` minus
    /// the source's retention window.
    pub async fn resolve(
        &self,
        config: &MigrationConfig,
        now: DateTime<Utc>,
    ) -> Result<MigrationSpec, TransferError> {
        let end = config.end.unwrap_or(now);
        let start = match config.start {
            Some(start) => start,
            None => {
                let flags = self.source.flags().await.map_err(TransferError::Flags)?;
                let retention = retention_from_flags(&flags)?;
                tracing::debug!(retention_secs = retention.as_secs(), "start derived from source retention");
                chrono::Duration::from_std(retention)
                    .ok()
                    .and_then(|r| now.checked_sub_signed(r))
                    .ok_or_else(|| CoreError::InvalidDuration {
                        value: format!("{retention:?}"),
                        reason: "retention reaches before the representable time range".to_owned(),
                    })?
            },
        };
        Ok(MigrationSpec::resolve(config, start, end)?)
    }

    /// Resolve `config` against the current time and migrate every metric.
    pub async fn run(&self, config: &MigrationConfig) -> Result<MigrationReport, TransferError> {
        let spec = self.resolve(config, Utc::now()).await?;
        self.run_spec(config.metric_names(), spec).await
    }

    /// Run one job per metric, at most `spec.concurrency` at a time.
    ///
    /// The first failing job cancels every other job; metrics not yet
    /// admitted are never started. Returns the per-metric report, wrapped in
    /// `TransferError::Aborted` when any job failed.
    pub async fn run_spec(
        &self,
        metrics: Vec<String>,
        spec: MigrationSpec,
    ) -> Result<MigrationReport, TransferError> {
        match spec.to_json() {
            Ok(json) => tracing::info!("migration spec: {json}"),
            Err(e) => tracing::warn!("could not render migration spec: {e}"),
        }

        let spec = Arc::new(spec);
        let semaphore = Arc::new(Semaphore::new(spec.concurrency.min(Semaphore::MAX_PERMITS)));
        let cancel = CancellationToken::new();
        let mut reports: Vec<JobReport> = metrics.iter().map(|m| JobReport::new(m)).collect();
        tracing::info!(metrics = reports.len(), concurrency = spec.concurrency, "starting migration");
        let mut task_index: HashMap<tokio::task::Id, usize> = HashMap::new();
        let mut jobs: JoinSet<(usize, JobOutcome)> = JoinSet::new();

        for (index, metric) in metrics.into_iter().enumerate() {
            let permit = tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                permit = Arc::clone(&semaphore).acquire_owned() => permit
                    .map_err(|e| TransferError::TaskJoin(format!("admission gate closed: {e}")))?,
            };

            let job = MetricJob::new(metric, Arc::clone(&spec), Arc::clone(&self.source), Arc::clone(&self.sink))
                .with_query_timeout(self.query_timeout);
            let cancel = cancel.clone();
            let handle = jobs.spawn(async move {
                let _permit = permit;
                let outcome = run_job(job, &cancel).await;
                if outcome.error.is_some() {
                    cancel.cancel();
                }
                (index, outcome)
            });
            task_index.insert(handle.id(), index);
        }

        let mut first_error: Option<(String, TransferError)> = None;
        while let Some(joined) = jobs.join_next().await {
            match joined {
                Ok((index, outcome)) => {
                    if let Some(err) = outcome.error {
                        tracing::error!(metric = %outcome.report.metric, "job failed: {err}");
                        if first_error.is_none() {
                            first_error = Some((outcome.report.metric.clone(), err));
                        }
                    }
                    if let Some(slot) = reports.get_mut(index) {
                        *slot = outcome.report;
                    }
                },
                Err(join_err) => {
                    cancel.cancel();
                    let metric = task_index
                        .get(&join_err.id())
                        .and_then(|i| reports.get_mut(*i))
                        .map(|slot| {
                            slot.status = JobStatus::Failed(join_err.to_string());
                            slot.metric.clone()
                        })
                        .unwrap_or_default();
                    tracing::error!(metric = %metric, "job task failed: {join_err}");
                    if first_error.is_none() {
                        first_error = Some((metric, TransferError::TaskJoin(join_err.to_string())));
                    }
                },
            }
        }

        let report = MigrationReport { jobs: reports };
        match first_error {
            Some((metric, source)) => {
                Err(TransferError::Aborted { metric, source: Box::new(source), report })
            },
            None => {
                tracing::info!(
                    metrics = report.jobs.len(),
                    points = report.total_points(),
                    "migration complete"
                );
                Ok(report)
            },
        }
    }
}

async fn run_job(job: MetricJob, cancel: &CancellationToken) -> JobOutcome {
    tracing::info!(metric = %job.metric(), "start {}", job.metric());
    let outcome = job.run(cancel).await;
    let report = &outcome.report;
    match &outcome.error {
        None => tracing::info!(
            metric = %report.metric,
            status = ?report.status,
            windows = report.windows,
            points = report.points,
            "done {}",
            report.metric
        ),
        Some(_) => tracing::warn!(metric = %report.metric, windows = report.windows, "stopped {}", report.metric),
    }
    outcome
}
