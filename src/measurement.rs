use crate::{time::Timestamp, MetricId, SensorId, TypeId, Value};
use serde::{Deserialize, Serialize};

/// Nested location path of a measurement.
///
/// Readings fetched through a location carry their sensor identity here
/// instead of in the top-level fields.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    /// Sensor installed at the location
    pub sensor_id: Option<SensorId>,

    /// Sensor type installed at the location
    pub type_id: Option<TypeId>,
}

/// A single raw sensor reading.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Measured value, `None` if the sensor reported nothing
    pub value: Option<Value>,

    /// When the value was measured
    pub timestamp: Timestamp,

    /// Physical quantity (temperature, humidity, ...)
    pub metric_id: MetricId,

    /// Display name of the metric, only present in legacy data
    #[serde(default)]
    pub metric_name: Option<String>,

    /// Sensor that produced the reading
    #[serde(default)]
    pub sensor_id: Option<SensorId>,

    /// Sensor type that produced the reading
    #[serde(default)]
    pub type_id: Option<TypeId>,

    /// Location path the reading was fetched through
    #[serde(default)]
    pub placement: Option<Placement>,
}

impl Measurement {
    /// Creates a measurement without any sensor identity.
    #[must_use]
    pub fn new(value: Value, timestamp: Timestamp, metric_id: MetricId) -> Self {
        Self {
            value: Some(value),
            timestamp,
            metric_id,
            metric_name: None,
            sensor_id: None,
            type_id: None,
            placement: None,
        }
    }

    /// Creates a measurement for which the sensor reported no value.
    #[must_use]
    pub fn missing(timestamp: Timestamp, metric_id: MetricId) -> Self {
        Self {
            value: None,
            ..Self::new(0.0, timestamp, metric_id)
        }
    }

    /// Sets the sensor.
    #[must_use]
    pub fn sensor(mut self, sensor_id: SensorId) -> Self {
        self.sensor_id = Some(sensor_id);
        self
    }

    /// Sets the sensor type.
    #[must_use]
    pub fn sensor_type(mut self, type_id: TypeId) -> Self {
        self.type_id = Some(type_id);
        self
    }

    /// Sets the legacy metric name.
    #[must_use]
    pub fn metric_name<S: Into<String>>(mut self, name: S) -> Self {
        self.metric_name = Some(name.into());
        self
    }

    /// Sets the nested location path.
    #[must_use]
    pub fn placement(mut self, placement: Placement) -> Self {
        self.placement = Some(placement);
        self
    }

    /// Returns the value if it can take part in aggregation.
    ///
    /// Missing and non-finite values are skipped.
    #[must_use]
    pub fn finite_value(&self) -> Option<Value> {
        self.value.filter(|v| v.is_finite())
    }

    /// Resolves the sensor, preferring the direct field over the location path.
    #[must_use]
    pub fn resolve_sensor_id(&self) -> Option<SensorId> {
        self.sensor_id
            .or_else(|| self.placement.as_ref().and_then(|p| p.sensor_id))
    }

    /// Sensor type found on the location path, used as last fallback.
    #[must_use]
    pub fn placement_type_id(&self) -> Option<TypeId> {
        self.placement.as_ref().and_then(|p| p.type_id)
    }
}
