//! Adaptive time-series aggregation for sensor dashboards.
//!
//! Takes raw, irregularly timed sensor readings and turns them into a compact
//! chart-ready series, choosing the time resolution from the charted date span:
//!
//! - up to 1 day: 30-minute buckets (`HH:MM`)
//! - up to 7 days: 3-hour buckets (`DD/MM HH:00`)
//! - beyond: daily buckets (`DD/MM`)
//!
//! If a chart comes out with too few points, it is re-aggregated at the next
//! finer resolution. Readings are grouped per series (sensor type and sensor name)
//! and averaged per bucket; missing values stay missing, nothing is interpolated.
//!
//! A second set of readings (e.g. the same sensors one year earlier) can be merged
//! into the chart, and alerting thresholds can be derived per series from the
//! 5th/95th percentile band of a metric.
//!
//! ```
//! use chrono::{NaiveDate, TimeZone, Utc};
//! use sensorchart::{
//!     Catalog, CatalogLabeler, Domain, Engine, Granularity, Measurement, Sensor, SensorType,
//!     Window,
//! };
//!
//! let catalog = Catalog::new(
//!     [Sensor { id: 1, name: "North wall".into(), type_id: Some(10) }],
//!     [SensorType { id: 10, name: "Temperature".into() }],
//! );
//! let labeler = CatalogLabeler::new(&catalog);
//!
//! let metric = 4;
//! let measurements = [
//!     Measurement::new(5.0, Utc.with_ymd_and_hms(2024, 1, 1, 0, 10, 0).unwrap(), metric).sensor(1),
//!     Measurement::new(7.0, Utc.with_ymd_and_hms(2024, 1, 1, 0, 25, 0).unwrap(), metric).sensor(1),
//!     Measurement::new(9.0, Utc.with_ymd_and_hms(2024, 1, 1, 0, 50, 0).unwrap(), metric).sensor(1),
//! ];
//!
//! let engine = Engine::new();
//! let window = Window::day(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
//!
//! let series = engine.chart(&measurements, &window, &labeler, Domain::default());
//!
//! assert_eq!(Granularity::Minutes30, series.granularity);
//! assert_eq!(2, series.len());
//! assert_eq!(Some(6.0), series.points[0].get("Temperature - North wall"));
//!
//! let thresholds = engine.recommend(&measurements, &window, "metrica_4", &labeler)?;
//! println!("{thresholds:#?}");
//!
//! # Ok::<(), sensorchart::Error>(())
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::all, missing_docs, clippy::cargo)]
#![allow(clippy::cargo_common_metadata)]
#![deny(clippy::unwrap_used)]
#![warn(clippy::indexing_slicing)]
#![warn(clippy::pedantic, clippy::nursery)]
#![warn(clippy::expect_used)]
#![allow(clippy::missing_const_for_fn)]
#![warn(clippy::multiple_crate_versions)]
#![warn(clippy::result_unit_err)]

mod agg;
mod builder;
mod catalog;
mod clip;
mod engine;
mod error;
mod escalate;
mod granularity;
mod label;
mod measurement;
mod merge;
mod threshold;
mod time;
mod time_label;

type HashMap<K, V> = std::collections::HashMap<K, V, rustc_hash::FxBuildHasher>;

pub use agg::{avg::Aggregator, ChartPoint, Series};
pub use builder::Builder;
pub use catalog::{Catalog, Sensor, SensorType};
pub use clip::{clip, Domain};
pub use engine::Engine;
pub use error::{Error, Result};
pub use escalate::{Escalator, MIN_ESCALATION_INPUT, SPARSE_POINT_COUNT};
pub use granularity::{Granularity, GranularityPolicy, HOURS_MAX_SPAN_DAYS, MINUTES_MAX_SPAN_DAYS};
pub use label::{CatalogLabeler, Labeler, DEFAULT_TYPE_NAME};
pub use measurement::{Measurement, Placement};
pub use merge::{merge, merge_points, COMPARISON_PREFIX};
pub use threshold::{
    LegacyMetric, MetricMatcher, MetricSelector, Recommendation, Recommender, LOWER_PERCENTILE,
    METRIC_SELECTOR_PREFIX, STD_DEV_MARGIN, UPPER_PERCENTILE,
};
pub use time::{Timestamp, Window};

/// Value used in time series
pub type Value = f64;

/// Sensor ID
pub type SensorId = u64;

/// Sensor type ID
pub type TypeId = u64;

/// Metric ID
pub type MetricId = u64;

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::{Catalog, Measurement, SensorId, Sensor, SensorType, Timestamp, Value};
    use chrono::{FixedOffset, NaiveDate, NaiveDateTime};

    pub fn naive(s: &str) -> NaiveDateTime {
        s.parse().expect("should be a valid date time")
    }

    pub fn ts(s: &str) -> Timestamp {
        naive(s).and_utc()
    }

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("should be a valid date")
    }

    pub fn offset(secs: i32) -> FixedOffset {
        FixedOffset::east_opt(secs).expect("should be a valid offset")
    }

    /// Sensors:
    ///
    /// - 1 "North wall" (Temperature)
    /// - 2 "Greenhouse" (no type)
    /// - 3 "Humidity" (Humidity)
    pub fn catalog() -> Catalog {
        Catalog::new(
            [
                Sensor {
                    id: 1,
                    name: "North wall".into(),
                    type_id: Some(10),
                },
                Sensor {
                    id: 2,
                    name: "Greenhouse".into(),
                    type_id: None,
                },
                Sensor {
                    id: 3,
                    name: "Humidity".into(),
                    type_id: Some(20),
                },
            ],
            [
                SensorType {
                    id: 10,
                    name: "Temperature".into(),
                },
                SensorType {
                    id: 20,
                    name: "Humidity".into(),
                },
            ],
        )
    }

    /// Reading of metric 1.
    pub fn reading(sensor: SensorId, at: &str, value: Value) -> Measurement {
        Measurement::new(value, ts(at), 1).sensor(sensor)
    }
}
