use crate::{agg::avg::Aggregator, time::utc, GranularityPolicy, Labeler, Measurement, Series};
use chrono::FixedOffset;

/// A result with at most this many points is considered too sparse to chart.
pub const SPARSE_POINT_COUNT: usize = 2;

/// Inputs smaller than this are never re-aggregated.
pub const MIN_ESCALATION_INPUT: usize = 3;

/// Aggregates at the granularity the date span calls for, and retries at
/// finer granularities while the result is too sparse.
///
/// Two readings eight days apart would otherwise be charted as two daily
/// points, hiding whatever structure the data has.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Escalator {
    /// Initial granularity selection
    pub policy: GranularityPolicy,

    /// Escalate while the point count is at most this
    pub sparse_point_count: usize,

    /// Escalate only if there are at least this many measurements
    pub min_escalation_input: usize,

    /// Offset at which time keys are formatted
    pub offset: FixedOffset,
}

impl Default for Escalator {
    fn default() -> Self {
        Self {
            policy: GranularityPolicy::default(),
            sparse_point_count: SPARSE_POINT_COUNT,
            min_escalation_input: MIN_ESCALATION_INPUT,
            offset: utc(),
        }
    }
}

impl Escalator {
    fn is_sparse(&self, series: &Series, input_len: usize) -> bool {
        series.len() <= self.sparse_point_count && input_len >= self.min_escalation_input
    }

    /// Aggregates the measurements of a date range spanning `span_days` days.
    ///
    /// Never fails: an empty or still sparse series after escalating
    /// to the finest granularity is returned as is.
    pub fn aggregate<L: Labeler>(
        &self,
        measurements: &[Measurement],
        span_days: f64,
        labeler: &L,
    ) -> Series {
        let mut granularity = self.policy.select(span_days);
        let mut series = Aggregator::raw(measurements, granularity, labeler, self.offset);

        while self.is_sparse(&series, measurements.len()) {
            let Some(finer) = granularity.finer() else {
                break;
            };

            log::trace!(
                "{} points from {} measurements at {granularity}, escalating to {finer}",
                series.len(),
                measurements.len(),
            );

            granularity = finer;
            series = Aggregator::raw(measurements, granularity, labeler, self.offset);
        }

        if granularity.is_finest() && self.is_sparse(&series, measurements.len()) {
            log::trace!("Still {} points at the finest granularity", series.len());
        }

        log::debug!(
            "Charted span of {span_days} days at {granularity} ({} points)",
            series.len(),
        );

        series
    }
}
