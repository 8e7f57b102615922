use crate::{ChartPoint, Value};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Displayed Y-axis range.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    /// Lower bound (inclusive)
    pub min: Option<Value>,

    /// Upper bound (inclusive)
    pub max: Option<Value>,
}

impl Domain {
    /// Creates a domain.
    #[must_use]
    pub fn new(min: Option<Value>, max: Option<Value>) -> Self {
        Self { min, max }
    }

    /// Returns `true` if neither bound is set.
    #[must_use]
    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    /// Returns `true` if the value lies within both set bounds.
    #[must_use]
    pub fn contains(&self, value: Value) -> bool {
        self.min.map_or(true, |min| value >= min) && self.max.map_or(true, |max| value <= max)
    }
}

/// Masks values outside the domain as missing.
///
/// Points and series are kept, so a chart re-renders with the same rows.
/// Without any bound the input is handed back as is.
///
/// An inverted domain (`min > max`) masks everything.
///
/// ```
/// use sensorchart::{clip, ChartPoint, Domain};
///
/// let points = [ChartPoint::new("00:00").with("A", Some(120.0)).with("B", Some(20.0))];
/// let clipped = clip(&points, Domain::new(Some(0.0), Some(100.0)));
///
/// assert_eq!(None, clipped[0].get("A"));
/// assert_eq!(Some(20.0), clipped[0].get("B"));
/// ```
#[must_use]
pub fn clip(points: &[ChartPoint], domain: Domain) -> Cow<'_, [ChartPoint]> {
    if domain.is_unbounded() {
        return Cow::Borrowed(points);
    }

    let points = points
        .iter()
        .map(|point| ChartPoint {
            time: point.time.clone(),
            values: point
                .values
                .iter()
                .map(|(label, value)| (label.clone(), value.filter(|&v| domain.contains(v))))
                .collect(),
        })
        .collect::<Vec<_>>();

    Cow::Owned(points)
}
