use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use prom2influx_core::constants::{DEFAULT_DATABASE, DEFAULT_EXTERNAL_LABEL_VALUE};
use prom2influx_core::{ExternalLabel, MigrationConfig, Precision};
use prom2influx_influxdb::{Credentials, InfluxClient};
use prom2influx_prometheus::PrometheusClient;
use prom2influx_transfer::{JobStatus, Migration, MigrationReport, TransferError};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "prom2influx")]
#[command(about = "Copy Prometheus metric history into InfluxDB", long_about = None)]
struct Cli {
    /// InfluxDB address, e.g. http://localhost:8086
    #[arg(long = "influxdb-url", value_parser = parse_url)]
    influxdb_url: String,

    /// Prometheus address, e.g. http://localhost:9090
    #[arg(long = "prometheus-url", value_parser = parse_url)]
    prometheus_url: String,

    /// Value of the `monitor` tag stamped onto every point
    #[arg(long = "monitor-label", default_value = DEFAULT_EXTERNAL_LABEL_VALUE)]
    monitor_label: String,

    #[arg(long = "influxdb.database", default_value = DEFAULT_DATABASE)]
    database: String,

    /// RFC3339 start time; defaults to now minus the Prometheus retention
    #[arg(long, value_parser = parse_time)]
    start: Option<DateTime<Utc>>,

    /// RFC3339 end time; defaults to now
    #[arg(long, value_parser = parse_time)]
    end: Option<DateTime<Utc>>,

    /// Query resolution; each query covers sixty steps
    #[arg(long, default_value = "1m", value_parser = humantime::parse_duration)]
    step: Duration,

    /// Number of metrics migrated at the same time
    #[arg(long = "c", default_value_t = 1)]
    concurrency: usize,

    /// Extra attempts for a failed write
    #[arg(long, default_value_t = 3)]
    retry: u32,

    /// Comma-separated metric names
    #[arg(long, default_value = "")]
    metrics: String,

    /// Timestamp precision: ns|u|ms|s|m|h
    #[arg(long, default_value = "ns", value_parser = Precision::from_str)]
    precision: Precision,
}

impl Cli {
    fn config(&self) -> MigrationConfig {
        MigrationConfig {
            database: self.database.clone(),
            start: self.start,
            end: self.end,
            step: Some(self.step),
            concurrency: self.concurrency,
            retry_limit: self.retry,
            metrics: self.metrics.clone(),
            external_label: ExternalLabel::monitor(self.monitor_label.clone()),
            precision: self.precision,
        }
    }
}

fn parse_url(s: &str) -> Result<String, String> {
    let url = reqwest::Url::parse(s).map_err(|e| format!("invalid URL {s:?}: {e}"))?;
    match url.scheme() {
        "http" | "https" => Ok(s.to_owned()),
        other => Err(format!("unsupported URL scheme {other:?}")),
    }
}

fn parse_time(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s).map(|t| t.with_timezone(&Utc))
}

fn print_report(report: &MigrationReport) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config();

    let source = PrometheusClient::new(&cli.prometheus_url).context("building Prometheus client")?;
    let credentials = Credentials::from_env();
    if let Some(creds) = &credentials {
        tracing::debug!(user = %creds.username, "using InfluxDB basic auth");
    }
    let sink = InfluxClient::new(&cli.influxdb_url, credentials).context("building InfluxDB client")?;

    let migration = Migration::new(Arc::new(source), Arc::new(sink));
    match migration.run(&config).await {
        Ok(report) => print_report(&report),
        Err(TransferError::Aborted { metric, source, report }) => {
            print_report(&report)?;
            tracing::error!(
                metric = %metric,
                failed = report.failed().count(),
                cancelled = report.count(&JobStatus::Cancelled),
                "migration aborted"
            );
            Err(anyhow::Error::new(*source).context(format!("migration of {metric:?} failed")))
        },
        Err(e) => Err(e.into()),
    }
}
