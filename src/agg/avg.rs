use super::{ChartPoint, Series};
use crate::{
    label::{LabelCache, Labeler},
    time::{local, utc, Timestamp},
    Granularity, Measurement, Value,
};
use chrono::FixedOffset;
use std::collections::{BTreeMap, BTreeSet};

/// Accumulator of one (bucket, series) cell.
#[derive(Copy, Clone, Debug, PartialEq)]
struct Cell {
    sum: Value,
    len: usize,

    /// Latest contributing timestamp
    end: Timestamp,
}

impl Cell {
    fn push(&mut self, value: Value, ts: Timestamp) {
        self.sum += value;
        self.len += 1;
        self.end = self.end.max(ts);
    }

    #[allow(clippy::cast_precision_loss)]
    fn avg(&self) -> Value {
        self.sum / self.len as Value
    }
}

/// All cells sharing one time key.
#[derive(Debug, Default)]
struct Bucket {
    /// Latest timestamp of any cell, used for ordering buckets
    end: Option<Timestamp>,

    cells: crate::HashMap<String, Cell>,
}

impl Bucket {
    fn push(&mut self, label: &str, value: Value, ts: Timestamp) {
        self.end = Some(self.end.map_or(ts, |end| end.max(ts)));

        if let Some(cell) = self.cells.get_mut(label) {
            cell.push(value, ts);
        } else {
            self.cells.insert(
                label.to_owned(),
                Cell {
                    sum: value,
                    len: 1,
                    end: ts,
                },
            );
        }
    }
}

/// Averages raw measurements per time bucket and series.
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use sensorchart::{Aggregator, Catalog, CatalogLabeler, Granularity, Measurement};
///
/// let catalog = Catalog::default();
/// let labeler = CatalogLabeler::new(&catalog);
///
/// let measurements = [
///     Measurement::new(5.0, Utc.with_ymd_and_hms(2024, 1, 1, 0, 10, 0).unwrap(), 1),
///     Measurement::new(7.0, Utc.with_ymd_and_hms(2024, 1, 1, 0, 25, 0).unwrap(), 1),
///     Measurement::new(9.0, Utc.with_ymd_and_hms(2024, 1, 1, 0, 50, 0).unwrap(), 1),
/// ];
///
/// let series = Aggregator::new(&labeler)
///     .granularity(Granularity::Minutes30)
///     .run(&measurements);
///
/// assert_eq!(2, series.len());
/// assert_eq!("00:00", series.points[0].time);
/// assert_eq!(Some(6.0), series.points[0].get("Sensor"));
/// ```
pub struct Aggregator<'a, L: Labeler> {
    /// Derives the series of each measurement
    pub(crate) labeler: &'a L,

    /// Bucket width
    pub(crate) granularity: Granularity,

    /// Offset at which wall-clock time keys are formatted
    pub(crate) offset: FixedOffset,
}

impl<'a, L: Labeler> Aggregator<'a, L> {
    /// Creates an aggregator using daily buckets in UTC.
    #[must_use]
    pub fn new(labeler: &'a L) -> Self {
        Self {
            labeler,
            granularity: Granularity::Daily,
            offset: utc(),
        }
    }

    /// Sets the bucket width.
    #[must_use]
    pub fn granularity(mut self, granularity: Granularity) -> Self {
        self.granularity = granularity;
        self
    }

    /// Sets the offset at which time keys are formatted.
    #[must_use]
    pub fn offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }

    /// Aggregates the measurements.
    ///
    /// Missing and non-finite values are skipped. Points are ordered by the
    /// latest timestamp that fell into each bucket, and every point carries
    /// every series label seen in the run.
    #[must_use]
    pub fn run(&self, measurements: &[Measurement]) -> Series {
        Self::raw(measurements, self.granularity, self.labeler, self.offset)
    }

    pub(crate) fn raw(
        measurements: &[Measurement],
        granularity: Granularity,
        labeler: &L,
        offset: FixedOffset,
    ) -> Series {
        if measurements.is_empty() {
            return Series::empty(granularity);
        }

        let mut labels = LabelCache::new(labeler);

        let buckets = measurements
            .iter()
            .filter_map(|m| m.finite_value().map(|value| (m, value)))
            .fold(
                crate::HashMap::<String, Bucket>::default(),
                |mut buckets, (m, value)| {
                    let key = granularity.time_key(&local(&m.timestamp, offset));
                    let label = labels.get(m);

                    buckets.entry(key).or_default().push(label, value, m.timestamp);
                    buckets
                },
            );

        let all_labels = buckets
            .values()
            .flat_map(|bucket| bucket.cells.keys().cloned())
            .collect::<BTreeSet<_>>();

        let mut buckets = buckets.into_iter().collect::<Vec<_>>();

        // NOTE: Time keys are unique per run, so ties cannot happen
        buckets.sort_by(|(a_key, a), (b_key, b)| (a.end, a_key).cmp(&(b.end, b_key)));

        let points = buckets
            .iter()
            .map(|(key, bucket)| {
                let mut values = all_labels
                    .iter()
                    .map(|label| (label.clone(), None))
                    .collect::<BTreeMap<_, _>>();

                for (label, cell) in &bucket.cells {
                    values.insert(label.clone(), Some(cell.avg()));
                }

                ChartPoint {
                    time: key.clone(),
                    values,
                }
            })
            .collect::<Vec<_>>();

        log::debug!(
            "Aggregated {} measurements into {} points x {} series at {granularity}",
            measurements.len(),
            points.len(),
            all_labels.len(),
        );

        Series {
            granularity,
            labels: all_labels.into_iter().collect(),
            points,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        fixtures::{catalog, offset, reading, ts},
        CatalogLabeler,
    };

    fn run(measurements: &[Measurement], granularity: Granularity) -> Series {
        let catalog = catalog();
        let labeler = CatalogLabeler::new(&catalog);
        Aggregator::new(&labeler)
            .granularity(granularity)
            .run(measurements)
    }

    #[test_log::test]
    fn aggregate_empty() {
        let series = run(&[], Granularity::Daily);
        assert_eq!(Series::empty(Granularity::Daily), series);
        assert!(series.labels.is_empty());
    }

    #[test_log::test]
    fn aggregate_half_hours() {
        let measurements = [
            reading(1, "2024-01-01T00:10:00", 5.0),
            reading(1, "2024-01-01T00:25:00", 7.0),
            reading(1, "2024-01-01T00:50:00", 9.0),
        ];

        let series = run(&measurements, Granularity::Minutes30);
        let label = "Temperature - North wall";

        assert_eq!(Granularity::Minutes30, series.granularity);
        assert_eq!(
            vec![
                ChartPoint::new("00:00").with(label, Some(6.0)),
                ChartPoint::new("00:30").with(label, Some(9.0)),
            ],
            series.points,
        );
    }

    #[test_log::test]
    fn aggregate_average() {
        let measurements = [
            reading(1, "2024-01-01T08:00:00", 10.0),
            reading(1, "2024-01-01T09:00:00", 20.0),
            reading(1, "2024-01-01T10:00:00", 30.0),
        ];

        let series = run(&measurements, Granularity::Daily);

        assert_eq!(1, series.len());
        assert_eq!(Some(20.0), series.points[0].get("Temperature - North wall"));
    }

    #[test_log::test]
    fn aggregate_skips_missing_values() {
        let mut missing = reading(1, "2024-01-01T08:00:00", 0.0);
        missing.value = None;

        let measurements = [
            missing,
            reading(1, "2024-01-01T09:00:00", Value::NAN),
            reading(1, "2024-01-01T10:00:00", 4.0),
            reading(2, "2024-01-02T10:00:00", Value::NAN),
        ];

        let series = run(&measurements, Granularity::Daily);

        // NOTE: Sensor 2 only has a NaN reading, so neither its bucket nor its label exist
        assert_eq!(vec!["Temperature - North wall"], series.labels);
        assert_eq!(1, series.len());
        assert_eq!(Some(4.0), series.points[0].get("Temperature - North wall"));
    }

    #[test_log::test]
    fn aggregate_column_completeness() {
        let measurements = [
            reading(1, "2024-01-01T08:00:00", 1.0),
            reading(2, "2024-01-02T08:00:00", 2.0),
            reading(3, "2024-01-03T08:00:00", 3.0),
            reading(1, "2024-01-03T09:00:00", 4.0),
        ];

        let series = run(&measurements, Granularity::Daily);

        assert_eq!(
            vec!["Humidity", "Sensor - Greenhouse", "Temperature - North wall"],
            series.labels,
        );

        for point in &series.points {
            assert_eq!(
                series.labels,
                point.values.keys().cloned().collect::<Vec<_>>(),
            );
        }

        assert_eq!(None, series.points[0].get("Humidity"));
        assert_eq!(
            Some(&None),
            series.points[0].values.get("Sensor - Greenhouse"),
        );
    }

    #[test_log::test]
    fn aggregate_orders_chronologically() {
        let measurements = [
            reading(1, "2024-11-09T08:00:00", 2.0),
            reading(1, "2024-10-30T08:00:00", 1.0),
            reading(1, "2024-11-10T08:00:00", 3.0),
        ];

        let series = run(&measurements, Granularity::Daily);

        assert_eq!(
            vec!["30/10", "09/11", "10/11"],
            series.points.iter().map(|p| p.time.as_str()).collect::<Vec<_>>(),
        );
    }

    #[test_log::test]
    fn aggregate_deterministic() {
        let measurements = (0..200u32)
            .map(|idx| {
                let mut m = reading(u64::from(idx % 3 + 1), "2024-01-01T00:00:00", f64::from(idx));
                m.timestamp += chrono::Duration::minutes(i64::from(idx) * 7);
                m
            })
            .collect::<Vec<_>>();

        assert_eq!(
            run(&measurements, Granularity::Hours3),
            run(&measurements, Granularity::Hours3),
        );
    }

    #[test_log::test]
    fn aggregate_formats_at_offset() {
        let catalog = catalog();
        let labeler = CatalogLabeler::new(&catalog);

        let measurements = [Measurement::new(1.0, ts("2024-01-01T23:40:00"), 1).sensor(1)];

        let series = Aggregator::new(&labeler)
            .granularity(Granularity::Daily)
            .offset(offset(2 * 3_600))
            .run(&measurements);

        assert_eq!("02/01", series.points[0].time);
    }
}
