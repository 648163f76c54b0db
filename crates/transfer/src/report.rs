//! Per-metric progress collected by the orchestrator.

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "error", rename_all = "lowercase")]
pub enum JobStatus {
    Completed,
    Failed(String),
    /// Stopped by a sibling failure, or never admitted.
    Cancelled,
}

/// What one metric job got done. `committed_until` is the end of the last
/// window whose batches were all written; data before it is in the sink.
#[derive(Debug, Clone, Serialize)]
pub struct JobReport {
    pub metric: String,
    #[serde(flatten)]
    pub status: JobStatus,
    pub windows: usize,
    pub batches: usize,
    pub points: usize,
    pub committed_until: Option<DateTime<Utc>>,
}

impl JobReport {
    #[must_use]
    pub fn new(metric: &str) -> Self {
        Self {
            metric: metric.to_owned(),
            status: JobStatus::Cancelled,
            windows: 0,
            batches: 0,
            points: 0,
            committed_until: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MigrationReport {
    pub jobs: Vec<JobReport>,
}

impl MigrationReport {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.jobs.iter().all(|j| j.status == JobStatus::Completed)
    }

    #[must_use]
    pub fn total_points(&self) -> usize {
        self.jobs.iter().map(|j| j.points).sum()
    }

    #[must_use]
    pub fn count(&self, status: &JobStatus) -> usize {
        self.jobs.iter().filter(|j| &j.status == status).count()
    }

    #[must_use]
    pub fn failed(&self) -> impl Iterator<Item = &JobReport> {
        self.jobs.iter().filter(|j| matches!(j.status, JobStatus::Failed(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_is_flattened_into_job_report() {
        let mut report = JobReport::new("up");
        report.status = JobStatus::Completed;
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["status"], json!("completed"));
        assert!(value.get("error").is_none());

        report.status = JobStatus::Failed("write up failed".to_owned());
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["status"], json!("failed"));
        assert_eq!(value["error"], json!("write up failed"));
        assert_eq!(value["metric"], json!("up"));
    }
}
