//! Shared constants for prom2influx.
//!
//! Defaults of the `prom2influx` command line and the migration engine.

use std::time::Duration;

/// Tag key used for the external label stamped on every migrated point.
pub const EXTERNAL_LABEL_KEY: &str = "monitor";

/// Default external label value.
pub const DEFAULT_EXTERNAL_LABEL_VALUE: &str = "codelab-monitor";

/// Default sink database.
pub const DEFAULT_DATABASE: &str = "prometheus";

/// Field name carrying the sample value.
pub const VALUE_FIELD: &str = "value";

/// Each window spans `step * WINDOW_STEP_MULTIPLIER`.
pub const WINDOW_STEP_MULTIPLIER: u32 = 60;

/// Step used when none is configured.
pub const DEFAULT_STEP: Duration = Duration::from_secs(60);

/// Per-window query timeout.
pub const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 60;

/// Environment override for the per-window query timeout.
pub const QUERY_TIMEOUT_ENV: &str = "PROM2INFLUX_QUERY_TIMEOUT_SECS";

/// Scalar results are written this many days before the reported instant.
pub const SCALAR_BACKDATE_DAYS: i64 = 15;

/// Source flags carrying the retention window, in lookup order.
pub const RETENTION_FLAGS: &[&str] = &["storage.tsdb.retention", "storage.tsdb.retention.time"];

/// Sink credentials.
pub const INFLUX_USER_ENV: &str = "INFLUX_USER";
pub const INFLUX_PASSWORD_ENV: &str = "INFLUX_PWD";
