//! Maps one query result into write batches.

use chrono::Duration;
use prom2influx_core::constants::SCALAR_BACKDATE_DAYS;
use prom2influx_core::{ExternalLabel, Labels, Point, Precision, QueryResult, Tags, WriteBatch};

/// Convert the result of one (metric, window) query into write batches.
///
/// - series set: one batch per series carrying the series labels as batch
///   tags; each point is tagged with the external label only.
/// - vector: one batch; each point carries its series labels with the
///   external label overriding a same-named label.
/// - scalar: one point, batch time moved back by fifteen days.
/// - string: one point with a string field at the reported instant.
#[must_use]
pub fn convert(
    metric: &str,
    external_label: &ExternalLabel,
    database: &str,
    precision: Precision,
    result: QueryResult,
) -> Vec<WriteBatch> {
    let external = || Tags::from([(external_label.key.clone(), external_label.value.clone())]);

    match result {
        QueryResult::SeriesSet(series) => series
            .into_iter()
            .map(|s| {
                let mut batch = WriteBatch::new(database, precision).with_tags(labels_to_tags(s.labels));
                batch.points = s
                    .samples
                    .into_iter()
                    .map(|sample| {
                        Point::with_value(metric, external(), sample.value, Some(sample.timestamp), precision)
                    })
                    .collect();
                batch
            })
            .collect(),
        QueryResult::Vector(samples) => {
            let mut batch = WriteBatch::new(database, precision);
            batch.points = samples
                .into_iter()
                .map(|s| {
                    let mut tags = labels_to_tags(s.labels);
                    tags.insert(external_label.key.clone(), external_label.value.clone());
                    Point::with_value(metric, tags, s.sample.value, Some(s.sample.timestamp), precision)
                })
                .collect();
            vec![batch]
        },
        QueryResult::Scalar(sample) => {
            let time = sample.timestamp - Duration::days(SCALAR_BACKDATE_DAYS);
            let mut batch = WriteBatch::new(database, precision).with_time(time);
            batch.points.push(Point::with_value(metric, external(), sample.value, None, precision));
            vec![batch]
        },
        QueryResult::String { timestamp, value } => {
            let mut batch = WriteBatch::new(database, precision).with_time(timestamp);
            batch.points.push(Point::with_value(metric, external(), value, None, precision));
            vec![batch]
        },
    }
}

fn labels_to_tags(labels: Labels) -> Tags {
    labels.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use prom2influx_core::{FieldValue, InstantSample, Sample, Series};

    fn label() -> ExternalLabel {
        ExternalLabel::monitor("codelab-monitor")
    }

    fn labels(pairs: &[(&str, &str)]) -> Labels {
        pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect()
    }

    fn sample(secs: i64, value: f64) -> Sample {
        Sample { timestamp: Utc.timestamp_opt(secs, 0).unwrap(), value }
    }

    #[test]
    fn test_series_set_yields_batch_per_series() {
        let series: Vec<Series> = (0..3)
            .map(|i| {
                let instance = format!("host-{i}");
                Series {
                    labels: labels(&[("__name__", "up"), ("instance", instance.as_str())]),
                    samples: (0..4).map(|j| sample(1_700_000_000 + j * 60, j as f64)).collect(),
                }
            })
            .collect();

        let batches =
            convert("up", &label(), "prometheus", Precision::Seconds, QueryResult::SeriesSet(series));

        assert_eq!(batches.len(), 3);
        for (i, batch) in batches.iter().enumerate() {
            assert_eq!(batch.points.len(), 4);
            assert_eq!(batch.database, "prometheus");
            assert_eq!(batch.tags.get("instance"), Some(&format!("host-{i}")));
            for point in &batch.points {
                assert_eq!(point.tags, Tags::from([("monitor".to_owned(), "codelab-monitor".to_owned())]));
                assert_eq!(point.measurement, "up");
                assert_eq!(point.precision, Precision::Seconds);
                assert!(point.timestamp.is_some());
            }
        }
    }

    #[test]
    fn test_vector_external_label_wins_on_conflict() {
        let samples = vec![InstantSample {
            labels: labels(&[("monitor", "from-series"), ("job", "node")]),
            sample: sample(1_700_000_000, 2.5),
        }];

        let batches = convert("load", &label(), "db", Precision::Nanoseconds, QueryResult::Vector(samples));

        assert_eq!(batches.len(), 1);
        let point = &batches[0].points[0];
        assert_eq!(point.tags.get("monitor").map(String::as_str), Some("codelab-monitor"));
        assert_eq!(point.tags.get("job").map(String::as_str), Some("node"));
        assert_eq!(point.value(), Some(&FieldValue::Float(2.5)));
        assert!(batches[0].tags.is_empty());
    }

    #[test]
    fn test_scalar_is_backdated_fifteen_days() {
        let ts = Utc.with_ymd_and_hms(2024, 2, 20, 12, 0, 0).unwrap();
        let result = QueryResult::Scalar(Sample { timestamp: ts, value: 42.0 });

        let batches = convert("s", &label(), "db", Precision::Seconds, result);

        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].time, Some(Utc.with_ymd_and_hms(2024, 2, 5, 12, 0, 0).unwrap()));
        let point = &batches[0].points[0];
        assert_eq!(point.timestamp, None);
        assert_eq!(point.tags.len(), 1);
        assert_eq!(point.value(), Some(&FieldValue::Float(42.0)));
    }

    #[test]
    fn test_string_keeps_instant_and_text() {
        let ts = Utc.with_ymd_and_hms(2024, 2, 20, 12, 0, 0).unwrap();
        let result = QueryResult::String { timestamp: ts, value: "ok".to_owned() };

        let batches = convert("s", &label(), "db", Precision::Seconds, result);

        assert_eq!(batches[0].time, Some(ts));
        assert_eq!(batches[0].points[0].value(), Some(&FieldValue::String("ok".to_owned())));
    }

    #[test]
    fn test_empty_series_set_yields_no_batches() {
        let batches = convert("up", &label(), "db", Precision::Seconds, QueryResult::SeriesSet(Vec::new()));
        assert!(batches.is_empty());
    }
}
