//! Fixed-size query windows over a migration range.

use std::fmt;

use chrono::{DateTime, Duration, SecondsFormat, Utc};

/// Half-open interval `[start, end)` queried and written as one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}",
            self.start.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.end.to_rfc3339_opts(SecondsFormat::Secs, true)
        )
    }
}

/// Iterator over contiguous windows of `span`. The last window is clamped to
/// the range end, so no window reaches past it.
#[derive(Debug, Clone)]
pub struct Windows {
    next_start: DateTime<Utc>,
    end: DateTime<Utc>,
    span: Duration,
}

impl Windows {
    #[must_use]
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>, span: Duration) -> Self {
        Self { next_start: start, end, span }
    }
}

impl Iterator for Windows {
    type Item = TimeWindow;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_start >= self.end || self.span <= Duration::zero() {
            return None;
        }
        let start = self.next_start;
        let end = start.checked_add_signed(self.span).map_or(self.end, |e| e.min(self.end));
        self.next_start = end;
        Some(TimeWindow { start, end })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, h, m, 0).unwrap()
    }

    #[test]
    fn test_windows_tile_range_without_gaps() {
        let windows: Vec<_> = Windows::new(at(0, 0), at(3, 0), Duration::hours(1)).collect();
        assert_eq!(windows.len(), 3);
        assert_eq!(windows.first().unwrap().start, at(0, 0));
        assert_eq!(windows.last().unwrap().end, at(3, 0));
        for pair in windows.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
            assert!(pair[0].start < pair[1].start);
        }
    }

    #[test]
    fn test_final_window_is_clamped() {
        let windows: Vec<_> = Windows::new(at(0, 0), at(2, 30), Duration::hours(1)).collect();
        assert_eq!(windows.len(), 3);
        assert_eq!(windows[2], TimeWindow { start: at(2, 0), end: at(2, 30) });
    }

    #[test]
    fn test_empty_range_has_no_windows() {
        assert_eq!(Windows::new(at(1, 0), at(1, 0), Duration::hours(1)).count(), 0);
    }

    #[test]
    fn test_display_uses_rfc3339() {
        let w = TimeWindow { start: at(0, 0), end: at(1, 0) };
        assert_eq!(w.to_string(), "2024-03-01T00:00:00Z 2024-03-01T01:00:00Z");
    }
}
