use crate::{
    escalate::{Escalator, MIN_ESCALATION_INPUT, SPARSE_POINT_COUNT},
    merge::COMPARISON_PREFIX,
    time::utc,
    Engine, GranularityPolicy,
};
use chrono::FixedOffset;

/// Builder for [`Engine`].
pub struct Builder {
    policy: GranularityPolicy,
    sparse_point_count: usize,
    min_escalation_input: usize,
    utc_offset: FixedOffset,
    legacy_metric_names: bool,
    comparison_prefix: String,
}

impl Builder {
    pub(crate) fn new() -> Self {
        Self {
            policy: GranularityPolicy::default(),
            sparse_point_count: SPARSE_POINT_COUNT,
            min_escalation_input: MIN_ESCALATION_INPUT,
            utc_offset: utc(),
            legacy_metric_names: false,
            comparison_prefix: COMPARISON_PREFIX.to_owned(),
        }
    }

    /// Sets the thresholds that pick a granularity from the date span.
    ///
    /// Default = 30 minutes up to 1 day, 3 hours up to 7 days, daily beyond
    #[must_use]
    pub fn policy(mut self, policy: GranularityPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Charts with at most this many points are re-aggregated at a finer granularity.
    ///
    /// Default = 2
    #[must_use]
    pub fn sparse_point_count(mut self, n: usize) -> Self {
        self.sparse_point_count = n;
        self
    }

    /// Only re-aggregate inputs of at least this many measurements.
    ///
    /// Default = 3
    #[must_use]
    pub fn min_escalation_input(mut self, n: usize) -> Self {
        self.min_escalation_input = n;
        self
    }

    /// Sets the offset at which time keys are formatted and windows are evaluated.
    ///
    /// Default = UTC
    #[must_use]
    pub fn utc_offset(mut self, offset: FixedOffset) -> Self {
        self.utc_offset = offset;
        self
    }

    /// If `true`, metric selectors may name legacy metrics (`temperatura`, ...),
    /// which are matched by a heuristic on the measurement's metric name.
    ///
    /// Default = false
    #[must_use]
    pub fn legacy_metric_names(mut self, enabled: bool) -> Self {
        self.legacy_metric_names = enabled;
        self
    }

    /// Sets the prefix of comparison series in merged charts.
    ///
    /// Default = `cmp_`
    #[must_use]
    pub fn comparison_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.comparison_prefix = prefix.into();
        self
    }

    /// Creates the engine.
    #[must_use]
    pub fn build(self) -> Engine {
        Engine {
            escalator: Escalator {
                policy: self.policy,
                sparse_point_count: self.sparse_point_count,
                min_escalation_input: self.min_escalation_input,
                offset: self.utc_offset,
            },
            legacy_metric_names: self.legacy_metric_names,
            comparison_prefix: self.comparison_prefix,
        }
    }
}
