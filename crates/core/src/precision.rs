//! Write precision codes accepted by the sink.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Timestamp precision of written points.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum Precision {
    #[default]
    #[serde(rename = "ns")]
    Nanoseconds,
    #[serde(rename = "u")]
    Microseconds,
    #[serde(rename = "ms")]
    Milliseconds,
    #[serde(rename = "s")]
    Seconds,
    #[serde(rename = "m")]
    Minutes,
    #[serde(rename = "h")]
    Hours,
}

impl Precision {
    pub const ALL_VARIANTS_STR: &'static str = "ns|u|ms|s|m|h";

    /// Code used in the sink's `precision` query parameter.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::Nanoseconds => "ns",
            Self::Microseconds => "u",
            Self::Milliseconds => "ms",
            Self::Seconds => "s",
            Self::Minutes => "m",
            Self::Hours => "h",
        }
    }

    /// Nanoseconds per unit.
    #[must_use]
    pub const fn nanos_per_unit(&self) -> i64 {
        match *self {
            Self::Nanoseconds => 1,
            Self::Microseconds => 1_000,
            Self::Milliseconds => 1_000_000,
            Self::Seconds => 1_000_000_000,
            Self::Minutes => 60 * 1_000_000_000,
            Self::Hours => 3_600 * 1_000_000_000,
        }
    }

    /// Express `ts` as an integer count of this unit since the epoch, truncating.
    ///
    /// Instants outside the nanosecond range (years before 1677 or after 2262)
    /// are computed from microseconds instead.
    #[must_use]
    pub fn scale(&self, ts: &DateTime<Utc>) -> i64 {
        match ts.timestamp_nanos_opt() {
            Some(nanos) => nanos.div_euclid(self.nanos_per_unit()),
            None => {
                let micros = ts.timestamp_micros();
                match *self {
                    Self::Nanoseconds => micros.saturating_mul(1_000),
                    _ => micros.div_euclid(self.nanos_per_unit() / 1_000),
                }
            },
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Precision {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "ns" | "n" => Ok(Self::Nanoseconds),
            "u" | "us" => Ok(Self::Microseconds),
            "ms" => Ok(Self::Milliseconds),
            "s" => Ok(Self::Seconds),
            "m" => Ok(Self::Minutes),
            "h" => Ok(Self::Hours),
            other => Err(CoreError::InvalidPrecision(other.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_all_codes() {
        for code in Precision::ALL_VARIANTS_STR.split('|') {
            let p: Precision = code.parse().unwrap();
            assert_eq!(p.as_str(), code);
        }
        assert!("d".parse::<Precision>().is_err());
    }

    #[test]
    fn test_scale_truncates_to_unit() {
        let ts = Utc.timestamp_opt(1_700_000_123, 456_789_000).unwrap();
        assert_eq!(Precision::Nanoseconds.scale(&ts), 1_700_000_123_456_789_000);
        assert_eq!(Precision::Microseconds.scale(&ts), 1_700_000_123_456_789);
        assert_eq!(Precision::Milliseconds.scale(&ts), 1_700_000_123_456);
        assert_eq!(Precision::Seconds.scale(&ts), 1_700_000_123);
        assert_eq!(Precision::Minutes.scale(&ts), 1_700_000_123 / 60);
        assert_eq!(Precision::Hours.scale(&ts), 1_700_000_123 / 3600);
    }

    #[test]
    fn test_serde_uses_codes() {
        let json = serde_json::to_string(&Precision::Milliseconds).unwrap();
        assert_eq!(json, "\"ms\"");
    }
}
