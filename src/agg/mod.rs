pub(crate) mod avg;

use crate::{Granularity, Value};
use serde::Serialize;
use std::collections::BTreeMap;

/// One row of a chart: a time label and one value per series.
///
/// A `None` value means there is no data for that series at this time,
/// which is different from a measured zero.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ChartPoint {
    /// Time key of the bucket, used as x-axis label
    pub time: String,

    /// Value per series label
    pub values: BTreeMap<String, Option<Value>>,
}

impl ChartPoint {
    /// Creates a point without any series.
    #[must_use]
    pub fn new<S: Into<String>>(time: S) -> Self {
        Self {
            time: time.into(),
            values: BTreeMap::new(),
        }
    }

    /// Adds a series value.
    #[must_use]
    pub fn with<S: Into<String>>(mut self, label: S, value: Option<Value>) -> Self {
        self.values.insert(label.into(), value);
        self
    }

    /// Returns the value of a series, `None` if absent or missing.
    #[must_use]
    pub fn get(&self, label: &str) -> Option<Value> {
        self.values.get(label).copied().flatten()
    }
}

/// Chart-ready output of one aggregation run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Series {
    /// Bucket width the points were aggregated at
    pub granularity: Granularity,

    /// Every series label seen during the run, sorted
    pub labels: Vec<String>,

    /// Points in ascending chronological order
    pub points: Vec<ChartPoint>,
}

impl Series {
    /// Creates a series without points.
    #[must_use]
    pub fn empty(granularity: Granularity) -> Self {
        Self {
            granularity,
            labels: vec![],
            points: vec![],
        }
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if there are no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn chart_point_serializes_gaps_as_null() -> serde_json::Result<()> {
        let point = ChartPoint::new("30/10")
            .with("Humidity", None)
            .with("Temperature - North wall", Some(21.5));

        assert_eq!(
            r#"{"time":"30/10","values":{"Humidity":null,"Temperature - North wall":21.5}}"#,
            serde_json::to_string(&point)?,
        );

        Ok(())
    }

    #[test_log::test]
    fn series_empty() {
        let series = Series::empty(Granularity::Hours3);

        assert!(series.is_empty());
        assert_eq!(0, series.len());
        assert_eq!(Granularity::Hours3, series.granularity);
    }
}
