use prom2influx_core::WriteBatch;
use prom2influx_influxdb::WriteSink;

use crate::error::TransferError;

/// Write `batch`, retrying every sink error immediately up to `retry_limit`
/// more times. Returns the number of attempts used.
pub async fn write_with_retry(
    sink: &dyn WriteSink,
    metric: &str,
    batch: &WriteBatch,
    retry_limit: u32,
) -> Result<u32, TransferError> {
    let max_attempts = retry_limit.saturating_add(1);
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;
        match sink.write(batch).await {
            Ok(()) => {
                tracing::debug!(metric, attempt, points = batch.len(), "batch written");
                return Ok(attempt);
            },
            Err(err) if attempt < max_attempts => {
                tracing::warn!(metric, "write attempt {attempt}/{max_attempts} failed: {err}");
            },
            Err(err) => {
                return Err(TransferError::Write { metric: metric.to_owned(), attempts: attempt, source: err });
            },
        }
    }
}
