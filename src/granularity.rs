use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// Widest date span (in days) still charted in 30-minute buckets.
pub const MINUTES_MAX_SPAN_DAYS: f64 = 1.0;

/// Widest date span (in days) still charted in 3-hour buckets.
pub const HOURS_MAX_SPAN_DAYS: f64 = 7.0;

/// Width of the time buckets of a chart.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Granularity {
    /// 30-minute buckets, keyed `HH:MM`
    Minutes30,

    /// 3-hour buckets, keyed `DD/MM HH:00`
    Hours3,

    /// Daily buckets, keyed `DD/MM`
    Daily,
}

impl std::fmt::Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Minutes30 => write!(f, "30m"),
            Self::Hours3 => write!(f, "3h"),
            Self::Daily => write!(f, "1d"),
        }
    }
}

impl Granularity {
    /// Formats the key of the bucket a wall-clock time falls into.
    ///
    /// The key doubles as x-axis label. It carries no year, so keys are
    /// only unique within one aggregation run.
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use sensorchart::Granularity;
    ///
    /// let t = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap().and_hms_opt(17, 44, 0).unwrap();
    ///
    /// assert_eq!("17:30", Granularity::Minutes30.time_key(&t));
    /// assert_eq!("09/03 15:00", Granularity::Hours3.time_key(&t));
    /// assert_eq!("09/03", Granularity::Daily.time_key(&t));
    /// ```
    #[must_use]
    pub fn time_key(&self, t: &NaiveDateTime) -> String {
        match self {
            Self::Minutes30 => format!("{:02}:{:02}", t.hour(), t.minute() / 30 * 30),
            Self::Hours3 => format!("{:02}/{:02} {:02}:00", t.day(), t.month(), t.hour() / 3 * 3),
            Self::Daily => format!("{:02}/{:02}", t.day(), t.month()),
        }
    }

    /// Next finer granularity, `None` if already the finest.
    #[must_use]
    pub fn finer(&self) -> Option<Self> {
        match self {
            Self::Daily => Some(Self::Hours3),
            Self::Hours3 => Some(Self::Minutes30),
            Self::Minutes30 => None,
        }
    }

    /// Returns `true` for the finest granularity.
    #[must_use]
    pub fn is_finest(&self) -> bool {
        self.finer().is_none()
    }
}

/// Chooses a granularity from the span of the charted date range.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GranularityPolicy {
    /// Spans up to (and including) this many days use 30-minute buckets
    pub minutes_max_span_days: f64,

    /// Spans up to (and including) this many days use 3-hour buckets
    pub hours_max_span_days: f64,
}

impl Default for GranularityPolicy {
    fn default() -> Self {
        Self {
            minutes_max_span_days: MINUTES_MAX_SPAN_DAYS,
            hours_max_span_days: HOURS_MAX_SPAN_DAYS,
        }
    }
}

impl GranularityPolicy {
    /// Selects the bucket width for a date span given in days.
    #[must_use]
    pub fn select(&self, span_days: f64) -> Granularity {
        if span_days <= self.minutes_max_span_days {
            Granularity::Minutes30
        } else if span_days <= self.hours_max_span_days {
            Granularity::Hours3
        } else {
            Granularity::Daily
        }
    }
}
