//! Line-protocol encoding of write batches.
//!
//! Each point becomes `measurement[,tag=value...] field=value[,...] [timestamp]`.
//! Tags are emitted in key order, batch tags override point tags, and the
//! timestamp is scaled to the point's precision.

use std::fmt::Write as _;

use crate::point::{FieldValue, Point, Tags, WriteBatch};

/// Encode every point of `batch`, one per line.
///
/// Points whose fields are all non-finite floats are dropped: the sink cannot
/// store NaN or infinities.
#[must_use]
pub fn encode_batch(batch: &WriteBatch) -> String {
    let mut out = String::new();
    for point in &batch.points {
        if let Some(line) = encode_point(point, batch) {
            out.push_str(&line);
            out.push('\n');
        }
    }
    out
}

/// Encode a single point in the context of its batch. Returns `None` when no
/// field survives.
#[must_use]
pub fn encode_point(point: &Point, batch: &WriteBatch) -> Option<String> {
    let mut fields = String::new();
    for (key, value) in &point.fields {
        let rendered = match value {
            FieldValue::Float(v) if !v.is_finite() => {
                tracing::debug!(measurement = %point.measurement, field = %key, "skipping non-finite value");
                continue;
            },
            FieldValue::Float(v) => v.to_string(),
            FieldValue::String(s) => format!("\"{}\"", escape_string_field(s)),
        };
        if !fields.is_empty() {
            fields.push(',');
        }
        fields.push_str(&escape_key(key));
        fields.push('=');
        fields.push_str(&rendered);
    }
    if fields.is_empty() {
        return None;
    }

    let mut tags: Tags = point.tags.clone();
    tags.extend(batch.tags.iter().map(|(k, v)| (k.clone(), v.clone())));

    let mut line = escape_measurement(&point.measurement);
    for (key, value) in &tags {
        if key.is_empty() || value.is_empty() {
            continue;
        }
        let _ = write!(line, ",{}={}", escape_key(key), escape_key(value));
    }
    line.push(' ');
    line.push_str(&fields);

    if let Some(ts) = point.timestamp.or(batch.time) {
        let _ = write!(line, " {}", point.precision.scale(&ts));
    }
    Some(line)
}

fn escape_measurement(s: &str) -> String {
    escape(s, &[',', ' '])
}

fn escape_key(s: &str) -> String {
    escape(s, &[',', '=', ' '])
}

fn escape_string_field(s: &str) -> String {
    escape(s, &['"', '\\'])
}

fn escape(s: &str, special: &[char]) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if special.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::precision::Precision;
    use chrono::{TimeZone, Utc};

    fn tags(pairs: &[(&str, &str)]) -> Tags {
        pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect()
    }

    #[test]
    fn test_batch_tags_override_point_tags_and_are_sorted() {
        let ts = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let mut batch = WriteBatch::new("prometheus", Precision::Seconds)
            .with_tags(tags(&[("monitor", "series-side"), ("job", "node")]));
        batch.points.push(Point::with_value(
            "up",
            tags(&[("monitor", "codelab-monitor")]),
            1.0,
            Some(ts),
            Precision::Seconds,
        ));
        assert_eq!(encode_batch(&batch), "up,job=node,monitor=series-side value=1 1700000000\n");
    }

    #[test]
    fn test_batch_time_used_when_point_has_none() {
        let ts = Utc.timestamp_opt(1_700_000_000, 5_000_000).unwrap();
        let mut batch = WriteBatch::new("db", Precision::Milliseconds).with_time(ts);
        batch.points.push(Point::with_value("m", Tags::new(), 0.5, None, Precision::Milliseconds));
        assert_eq!(encode_batch(&batch), "m value=0.5 1700000000005\n");
    }

    #[test]
    fn test_string_fields_and_special_characters_are_escaped() {
        let mut batch = WriteBatch::new("db", Precision::Nanoseconds);
        batch.points.push(Point::with_value(
            "my metric,x",
            tags(&[("path", "/a b=c,d")]),
            "say \"hi\" \\o/".to_owned(),
            None,
            Precision::Nanoseconds,
        ));
        assert_eq!(
            encode_batch(&batch),
            "my\\ metric\\,x,path=/a\\ b\\=c\\,d value=\"say \\\"hi\\\" \\\\o/\"\n"
        );
    }

    #[test]
    fn test_non_finite_values_are_dropped() {
        let mut batch = WriteBatch::new("db", Precision::Seconds);
        batch.points.push(Point::with_value("m", Tags::new(), f64::NAN, None, Precision::Seconds));
        batch.points.push(Point::with_value("m", Tags::new(), f64::INFINITY, None, Precision::Seconds));
        batch.points.push(Point::with_value("m", Tags::new(), 2.0, None, Precision::Seconds));
        assert_eq!(encode_batch(&batch), "m value=2\n");
    }

    #[test]
    fn test_empty_tag_values_are_omitted() {
        let mut batch = WriteBatch::new("db", Precision::Seconds);
        batch.points.push(Point::with_value(
            "m",
            tags(&[("instance", ""), ("job", "api")]),
            3.25,
            None,
            Precision::Seconds,
        ));
        assert_eq!(encode_batch(&batch), "m,job=api value=3.25\n");
    }
}
