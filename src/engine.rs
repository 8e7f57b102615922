use crate::{
    agg::avg::Aggregator,
    builder::Builder,
    clip::clip,
    escalate::Escalator,
    merge::merge_points,
    threshold::{MetricMatcher, MetricSelector, Recommender},
    ChartPoint, Domain, Labeler, Measurement, Recommendation, Series, Window,
};
use std::borrow::Cow;

/// Turns raw measurements into chart-ready series and alerting thresholds.
///
/// The engine holds configuration only; every call works on the
/// measurements it is given and returns new data.
#[derive(Clone, Debug)]
pub struct Engine {
    pub(crate) escalator: Escalator,
    pub(crate) legacy_metric_names: bool,
    pub(crate) comparison_prefix: String,
}

impl Default for Engine {
    fn default() -> Self {
        Self::builder().build()
    }
}

fn clip_series(mut series: Series, domain: Domain) -> Series {
    if let Cow::Owned(points) = clip(&series.points, domain) {
        series.points = points;
    }
    series
}

impl Engine {
    /// Creates an engine with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures a new engine.
    #[must_use]
    pub fn builder() -> Builder {
        Builder::new()
    }

    /// Charts the measurements of a date window.
    ///
    /// The granularity is chosen from the window's span and refined while
    /// the chart is too sparse. Values outside the domain are masked.
    #[must_use]
    pub fn chart<L: Labeler>(
        &self,
        measurements: &[Measurement],
        window: &Window,
        labeler: &L,
        domain: Domain,
    ) -> Series {
        let series = self
            .escalator
            .aggregate(measurements, window.span_days(), labeler);

        clip_series(series, domain)
    }

    /// Charts a primary set of measurements together with a comparison set.
    ///
    /// The comparison set is aggregated at whatever granularity the primary
    /// chart ended up with, so both line up on the same time axis.
    /// Comparison series are prefixed (`cmp_` by default).
    ///
    /// # Errors
    ///
    /// Returns an error if a time label cannot be placed in time.
    pub fn compare<L: Labeler>(
        &self,
        primary: &[Measurement],
        comparison: &[Measurement],
        window: &Window,
        labeler: &L,
        domain: Domain,
    ) -> crate::Result<Vec<ChartPoint>> {
        let primary = self.chart(primary, window, labeler, domain);

        let comparison = clip_series(
            Aggregator::raw(
                comparison,
                primary.granularity,
                labeler,
                self.escalator.offset,
            ),
            domain,
        );

        merge_points(
            &primary.points,
            &comparison.points,
            window.start,
            &self.comparison_prefix,
        )
    }

    /// Parses a metric selector, honouring the legacy name setting.
    ///
    /// # Errors
    ///
    /// Returns an error if the selector names no metric.
    pub fn metric_selector(&self, metric: &str) -> crate::Result<MetricSelector> {
        MetricSelector::parse(metric, self.legacy_metric_names)
    }

    /// Recommends alerting thresholds per series for one metric in a date window.
    ///
    /// `metric` is a selector like `metrica_12`, see [`MetricSelector::parse`].
    ///
    /// # Errors
    ///
    /// Returns an error if the selector is invalid, or if no measurement
    /// of the metric falls into the window.
    pub fn recommend<L: Labeler>(
        &self,
        measurements: &[Measurement],
        window: &Window,
        metric: &str,
        labeler: &L,
    ) -> crate::Result<crate::HashMap<String, Recommendation>> {
        let matcher = MetricMatcher::new(self.metric_selector(metric)?)?;

        Recommender::new(labeler)
            .offset(self.escalator.offset)
            .run(measurements, window, &matcher)
    }
}
