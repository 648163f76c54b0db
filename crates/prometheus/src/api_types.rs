//! Wire types of the Prometheus HTTP API and their decoding into `QueryResult`.

use chrono::{DateTime, TimeZone, Utc};
use prom2influx_core::{InstantSample, Labels, QueryResult, Sample, Series};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::SourceError;

/// Common envelope of every API response.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiResponse<T> {
    pub status: String,
    pub data: Option<T>,
    #[serde(rename = "errorType")]
    pub error_type: Option<String>,
    pub error: Option<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl<T> ApiResponse<T> {
    /// Split a successful envelope into data and warnings.
    pub(crate) fn into_data(self, context: &str) -> Result<(T, Vec<String>), SourceError> {
        if self.status != "success" {
            return Err(SourceError::Api {
                error_type: self.error_type.unwrap_or_else(|| "unknown".to_owned()),
                message: self.error.unwrap_or_else(|| format!("status {}", self.status)),
            });
        }
        let data = self.data.ok_or_else(|| SourceError::MissingData(context.to_owned()))?;
        Ok((data, self.warnings))
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct QueryData {
    #[serde(rename = "resultType")]
    pub result_type: String,
    pub result: serde_json::Value,
}

/// `[<unix seconds>, "<value>"]`
type RawSample = (f64, String);

#[derive(Debug, Deserialize)]
struct RawSeries {
    #[serde(default)]
    metric: Labels,
    #[serde(default)]
    values: Vec<RawSample>,
}

#[derive(Debug, Deserialize)]
struct RawInstant {
    #[serde(default)]
    metric: Labels,
    value: RawSample,
}

impl QueryData {
    pub(crate) fn into_result(self) -> Result<QueryResult, SourceError> {
        match self.result_type.as_str() {
            "matrix" => {
                let raw: Vec<RawSeries> = decode(self.result, "matrix result")?;
                let series = raw
                    .into_iter()
                    .map(|s| {
                        let samples = s.values.into_iter().map(sample).collect::<Result<_, _>>()?;
                        Ok(Series { labels: s.metric, samples })
                    })
                    .collect::<Result<_, SourceError>>()?;
                Ok(QueryResult::SeriesSet(series))
            },
            "vector" => {
                let raw: Vec<RawInstant> = decode(self.result, "vector result")?;
                let samples = raw
                    .into_iter()
                    .map(|s| Ok(InstantSample { labels: s.metric, sample: sample(s.value)? }))
                    .collect::<Result<_, SourceError>>()?;
                Ok(QueryResult::Vector(samples))
            },
            "scalar" => {
                let raw: RawSample = decode(self.result, "scalar result")?;
                Ok(QueryResult::Scalar(sample(raw)?))
            },
            "string" => {
                let (ts, value): RawSample = decode(self.result, "string result")?;
                Ok(QueryResult::String { timestamp: timestamp(ts)?, value })
            },
            other => Err(SourceError::UnknownResultType(other.to_owned())),
        }
    }
}

pub(crate) fn decode<T: DeserializeOwned>(value: serde_json::Value, context: &str) -> Result<T, SourceError> {
    serde_json::from_value(value)
        .map_err(|e| SourceError::JsonParse { context: context.to_owned(), source: e })
}

fn sample((ts, value): RawSample) -> Result<Sample, SourceError> {
    let parsed = value
        .parse::<f64>()
        .map_err(|_| SourceError::InvalidSample(format!("value {value:?} at {ts}")))?;
    Ok(Sample { timestamp: timestamp(ts)?, value: parsed })
}

/// Source timestamps are float seconds with millisecond resolution.
fn timestamp(ts: f64) -> Result<DateTime<Utc>, SourceError> {
    let millis = (ts * 1000.0).round();
    if !millis.is_finite() {
        return Err(SourceError::InvalidSample(format!("timestamp {ts}")));
    }
    #[allow(clippy::cast_possible_truncation, reason = "checked finite, out-of-range rejected below")]
    let millis = millis as i64;
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| SourceError::InvalidSample(format!("timestamp {ts}")))
}
