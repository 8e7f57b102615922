//! Threshold recommendation for alerting rules.
//!
//! For each series, the values of one metric inside a window are reduced to
//! their 5th/95th percentile band, widened by half a standard deviation on
//! each side. The lower bound never drops below zero.

use crate::{
    label::LabelCache, time::utc, Labeler, Measurement, MetricId, Value, Window,
};
use chrono::FixedOffset;
use nom::{
    bytes::complete::{tag_no_case, take_while1},
    combinator::{all_consuming, map_res, opt},
    sequence::preceded,
    IResult,
};
use regex::Regex;
use serde::Serialize;

/// Prefix of generic metric selectors, as in `metrica_12`.
pub const METRIC_SELECTOR_PREFIX: &str = "metrica_";

/// Lower percentile of the recommended band.
pub const LOWER_PERCENTILE: f64 = 5.0;

/// Upper percentile of the recommended band.
pub const UPPER_PERCENTILE: f64 = 95.0;

/// Fraction of the standard deviation added on each side of the band.
pub const STD_DEV_MARGIN: f64 = 0.5;

/// Metrics of legacy data that is only identifiable by name.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LegacyMetric {
    /// Temperature readings
    Temperature,

    /// Relative humidity readings
    Humidity,

    /// Electrical conductivity readings
    Conductivity,
}

impl LegacyMetric {
    fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "temperatura" | "temperature" => Some(Self::Temperature),
            "humedad" | "humidity" => Some(Self::Humidity),
            "conductividad" | "conductivity" => Some(Self::Conductivity),
            _ => None,
        }
    }

    /// Case-insensitive pattern matched against metric names.
    fn pattern(self) -> &'static str {
        match self {
            Self::Temperature => r"(?i)temperat",
            Self::Humidity => r"(?i)hum(e|i)d",
            Self::Conductivity => r"(?i)conducti",
        }
    }
}

/// Which metric to compute thresholds for.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MetricSelector {
    /// Exact metric ID
    Id(MetricId),

    /// Metric name heuristic, for historical data without reliable IDs
    Legacy(LegacyMetric),
}

fn metric_id(input: &str) -> IResult<&str, MetricId> {
    preceded(
        opt(tag_no_case(METRIC_SELECTOR_PREFIX)),
        map_res(take_while1(|c: char| c.is_ascii_digit()), str::parse::<MetricId>),
    )(input)
}

impl MetricSelector {
    /// Parses `metrica_{id}` or a bare ID.
    ///
    /// Known legacy metric names (`temperatura`, `humedad`, `conductividad`
    /// and their English forms) are only accepted if `legacy_names` is set.
    ///
    /// ```
    /// use sensorchart::{LegacyMetric, MetricSelector};
    ///
    /// assert_eq!(MetricSelector::Id(12), MetricSelector::parse("metrica_12", false)?);
    /// assert_eq!(MetricSelector::Id(12), MetricSelector::parse("12", false)?);
    /// assert_eq!(
    ///     MetricSelector::Legacy(LegacyMetric::Humidity),
    ///     MetricSelector::parse("humedad", true)?,
    /// );
    /// assert!(MetricSelector::parse("humedad", false).is_err());
    /// # Ok::<(), sensorchart::Error>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if the selector names no metric.
    pub fn parse(input: &str, legacy_names: bool) -> crate::Result<Self> {
        let input = input.trim();

        if let Ok((_, id)) = all_consuming(metric_id)(input) {
            return Ok(Self::Id(id));
        }

        match LegacyMetric::from_name(input) {
            Some(metric) if legacy_names => Ok(Self::Legacy(metric)),
            _ => Err(crate::Error::InvalidMetricSelector(input.to_owned())),
        }
    }
}

/// Decides whether a measurement belongs to the selected metric.
#[derive(Clone, Debug)]
pub enum MetricMatcher {
    /// Exact metric ID match
    Id(MetricId),

    /// Metric name pattern match
    ///
    /// This is a heuristic: a name that merely contains the pattern matches as well.
    Name(Regex),
}

impl MetricMatcher {
    /// Builds the matcher for a selector.
    ///
    /// # Errors
    ///
    /// Returns an error if the name pattern does not compile.
    pub fn new(selector: MetricSelector) -> crate::Result<Self> {
        Ok(match selector {
            MetricSelector::Id(id) => Self::Id(id),
            MetricSelector::Legacy(metric) => Self::Name(Regex::new(metric.pattern())?),
        })
    }

    /// Returns `true` if the measurement belongs to the selected metric.
    #[must_use]
    pub fn matches(&self, measurement: &Measurement) -> bool {
        match self {
            Self::Id(id) => measurement.metric_id == *id,
            Self::Name(pattern) => measurement
                .metric_name
                .as_deref()
                .is_some_and(|name| pattern.is_match(name)),
        }
    }
}

/// Recommended alerting thresholds of one series.
///
/// All values are rounded to two decimals.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct Recommendation {
    /// Recommended lower threshold, never negative
    pub min: Value,

    /// Recommended upper threshold
    pub max: Value,

    /// Mean value
    pub avg: Value,

    /// Population standard deviation
    pub std_dev: Value,

    /// 5th percentile
    pub p5: Value,

    /// 95th percentile
    pub p95: Value,

    /// Number of values the recommendation is based on
    pub samples: usize,
}

fn round2(value: Value) -> Value {
    (value * 100.0).round() / 100.0
}

/// Nearest-rank percentile of an ascending, non-empty list.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::indexing_slicing
)]
fn percentile(sorted: &[Value], p: f64) -> Value {
    let rank = ((p / 100.0) * sorted.len() as f64).ceil() as usize;
    let idx = rank.saturating_sub(1).min(sorted.len() - 1);
    sorted[idx]
}

impl Recommendation {
    /// Derives the recommendation from a group of values.
    ///
    /// Returns `None` for an empty group.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_values(mut values: Vec<Value>) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        values.sort_by(Value::total_cmp);

        let len = values.len() as Value;
        let avg = values.iter().sum::<Value>() / len;
        let variance = values.iter().map(|v| (v - avg).powi(2)).sum::<Value>() / len;
        let std_dev = variance.sqrt();

        let p5 = percentile(&values, LOWER_PERCENTILE);
        let p95 = percentile(&values, UPPER_PERCENTILE);

        Some(Self {
            min: round2((p5 - STD_DEV_MARGIN * std_dev).max(0.0)),
            max: round2(p95 + STD_DEV_MARGIN * std_dev),
            avg: round2(avg),
            std_dev: round2(std_dev),
            p5: round2(p5),
            p95: round2(p95),
            samples: values.len(),
        })
    }
}

/// Computes threshold recommendations per series.
pub struct Recommender<'a, L: Labeler> {
    /// Derives the series of each measurement
    pub(crate) labeler: &'a L,

    /// Offset at which the window's days are evaluated
    pub(crate) offset: FixedOffset,
}

impl<'a, L: Labeler> Recommender<'a, L> {
    /// Creates a recommender evaluating windows in UTC.
    #[must_use]
    pub fn new(labeler: &'a L) -> Self {
        Self {
            labeler,
            offset: utc(),
        }
    }

    /// Sets the offset at which the window's days are evaluated.
    #[must_use]
    pub fn offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }

    /// Recommends thresholds for every series that has values of the
    /// selected metric inside the window.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InsufficientData`] if no measurement matches at all.
    pub fn run(
        &self,
        measurements: &[Measurement],
        window: &Window,
        metric: &MetricMatcher,
    ) -> crate::Result<crate::HashMap<String, Recommendation>> {
        let mut labels = LabelCache::new(self.labeler);

        let groups = measurements
            .iter()
            .filter(|m| window.contains(&m.timestamp, self.offset) && metric.matches(m))
            .filter_map(|m| m.finite_value().map(|value| (m, value)))
            .fold(
                crate::HashMap::<String, Vec<Value>>::default(),
                |mut groups, (m, value)| {
                    let label = labels.get(m);

                    if let Some(values) = groups.get_mut(label) {
                        values.push(value);
                    } else {
                        groups.insert(label.to_owned(), vec![value]);
                    }
                    groups
                },
            );

        if groups.is_empty() {
            log::debug!(
                "No values of {metric:?} in {} .. {} among {} measurements",
                window.start,
                window.end,
                measurements.len(),
            );
            return Err(crate::Error::InsufficientData);
        }

        let result = groups
            .into_iter()
            .filter_map(|(label, values)| {
                Recommendation::from_values(values).map(|rec| (label, rec))
            })
            .collect::<crate::HashMap<_, _>>();

        log::debug!("Recommended thresholds for {} series", result.len());

        Ok(result)
    }
}
