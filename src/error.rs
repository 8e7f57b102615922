use crate::Granularity;

/// Error type
#[derive(Debug)]
pub enum Error {
    /// A time label that is not a known time key format, or names an impossible date.
    InvalidTimeLabel(String),

    /// Two series aggregated at different granularities were merged.
    GranularityMismatch {
        /// Granularity of the primary series.
        primary: Granularity,

        /// Granularity of the comparison series.
        comparison: Granularity,
    },

    /// A metric selector that could not be resolved.
    InvalidMetricSelector(String),

    /// No measurement survived filtering, so no statistics can be derived.
    InsufficientData,

    /// A metric name pattern failed to compile.
    Pattern(regex::Error),
}

impl From<regex::Error> for Error {
    fn from(value: regex::Error) -> Self {
        Self::Pattern(value)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTimeLabel(label) => {
                write!(f, "InvalidTimeLabel({label:?})")
            }
            Self::GranularityMismatch {
                primary,
                comparison,
            } => {
                write!(f, "GranularityMismatch({primary} vs {comparison})")
            }
            Self::InvalidMetricSelector(selector) => {
                write!(f, "InvalidMetricSelector({selector:?})")
            }
            Self::InsufficientData => {
                write!(f, "InsufficientData")
            }
            Self::Pattern(e) => {
                write!(f, "{e}")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Pattern(e) => Some(e),
            _ => None,
        }
    }
}

/// Result helper type
pub type Result<T> = std::result::Result<T, Error>;
