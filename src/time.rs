use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, Utc};
use serde::{Deserialize, Serialize};

/// Point in time of a measurement.
pub type Timestamp = DateTime<Utc>;

/// The UTC offset.
#[must_use]
pub fn utc() -> FixedOffset {
    Utc.fix()
}

/// Converts a timestamp into wall-clock time at the given offset.
#[must_use]
pub fn local(ts: &Timestamp, offset: FixedOffset) -> NaiveDateTime {
    ts.with_timezone(&offset).naive_local()
}

/// An inclusive window of calendar dates, e.g. the dates picked in a dashboard filter.
///
/// ```
/// use chrono::NaiveDate;
/// use sensorchart::Window;
///
/// let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let end = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
///
/// assert_eq!(7.0, Window::new(start, end).span_days());
/// assert_eq!(0.0, Window::day(start).span_days());
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    /// First day (inclusive)
    pub start: NaiveDate,

    /// Last day (inclusive)
    pub end: NaiveDate,
}

impl Window {
    /// Creates a window from `start` to `end`, both inclusive.
    #[must_use]
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Creates a window covering a single day.
    #[must_use]
    pub fn day(date: NaiveDate) -> Self {
        Self::new(date, date)
    }

    /// Number of calendar days between start and end (same day = 0).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn span_days(&self) -> f64 {
        (self.end - self.start).num_days() as f64
    }

    /// Returns `true` if the timestamp falls on one of the window's days
    /// when viewed at the given offset.
    #[must_use]
    pub fn contains(&self, ts: &Timestamp, offset: FixedOffset) -> bool {
        let date = local(ts, offset).date();
        self.start <= date && date <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{date, offset, ts};

    #[test_log::test]
    fn window_contains_inclusive_bounds() {
        let window = Window::new(date(2024, 3, 1), date(2024, 3, 3));

        assert!(window.contains(&ts("2024-03-01T00:00:00"), offset(0)));
        assert!(window.contains(&ts("2024-03-03T23:59:59"), offset(0)));
        assert!(!window.contains(&ts("2024-03-04T00:00:00"), offset(0)));
        assert!(!window.contains(&ts("2024-02-29T23:59:59"), offset(0)));
    }

    #[test_log::test]
    fn window_respects_offset() {
        let window = Window::day(date(2024, 3, 1));

        // 23:30 UTC on the previous day is already March 1st at UTC+1
        let ts = ts("2024-02-29T23:30:00");
        assert!(window.contains(&ts, offset(3_600)));
        assert!(!window.contains(&ts, offset(0)));
    }

    #[test_log::test]
    fn window_span_days() {
        assert_eq!(0.0, Window::day(date(2024, 1, 1)).span_days());
        assert_eq!(1.0, Window::new(date(2024, 1, 1), date(2024, 1, 2)).span_days());
        assert_eq!(40.0, Window::new(date(2024, 1, 1), date(2024, 2, 10)).span_days());
    }
}
