//! Write-side records: points and the batches they are committed in.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::constants::VALUE_FIELD;
use crate::precision::Precision;

/// Tag set of a point or batch, ordered by key.
pub type Tags = BTreeMap<String, String>;

/// Value of a single field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Float(f64),
    String(String),
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

/// One write record.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub measurement: String,
    pub tags: Tags,
    pub fields: BTreeMap<String, FieldValue>,
    /// Falls back to the batch timestamp, then to sink receive time, when unset.
    pub timestamp: Option<DateTime<Utc>>,
    pub precision: Precision,
}

impl Point {
    /// Point with the single `value` field.
    #[must_use]
    pub fn with_value(
        measurement: &str,
        tags: Tags,
        value: impl Into<FieldValue>,
        timestamp: Option<DateTime<Utc>>,
        precision: Precision,
    ) -> Self {
        let fields = BTreeMap::from([(VALUE_FIELD.to_owned(), value.into())]);
        Self { measurement: measurement.to_owned(), tags, fields, timestamp, precision }
    }

    #[must_use]
    pub fn value(&self) -> Option<&FieldValue> {
        self.fields.get(VALUE_FIELD)
    }
}

/// Points committed to one database in a single sink call.
///
/// Batch tags are applied to every point at write time and take precedence
/// over same-named point tags.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteBatch {
    pub database: String,
    pub tags: Tags,
    pub time: Option<DateTime<Utc>>,
    pub precision: Precision,
    pub points: Vec<Point>,
}

impl WriteBatch {
    #[must_use]
    pub fn new(database: &str, precision: Precision) -> Self {
        Self { database: database.to_owned(), tags: Tags::new(), time: None, precision, points: Vec::new() }
    }

    #[must_use]
    pub fn with_tags(mut self, tags: Tags) -> Self {
        self.tags = tags;
        self
    }

    #[must_use]
    pub fn with_time(mut self, time: DateTime<Utc>) -> Self {
        self.time = Some(time);
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }
}
