use crate::{SensorId, TypeId};
use serde::{Deserialize, Serialize};

/// A sensor as listed by the inventory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sensor {
    /// Sensor ID
    pub id: SensorId,

    /// Display name
    pub name: String,

    /// Type of the sensor, if known
    #[serde(default)]
    pub type_id: Option<TypeId>,
}

/// A kind of sensor, e.g. "Temperature probe".
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorType {
    /// Type ID
    pub id: TypeId,

    /// Display name
    pub name: String,
}

/// Lookup tables for sensors and sensor types.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    sensors: crate::HashMap<SensorId, Sensor>,
    types: crate::HashMap<TypeId, SensorType>,
}

impl Catalog {
    /// Builds the lookup tables.
    ///
    /// Later entries replace earlier ones with the same ID.
    pub fn new<S, T>(sensors: S, types: T) -> Self
    where
        S: IntoIterator<Item = Sensor>,
        T: IntoIterator<Item = SensorType>,
    {
        Self {
            sensors: sensors.into_iter().map(|s| (s.id, s)).collect(),
            types: types.into_iter().map(|t| (t.id, t)).collect(),
        }
    }

    /// Looks up a sensor.
    #[must_use]
    pub fn sensor(&self, id: SensorId) -> Option<&Sensor> {
        self.sensors.get(&id)
    }

    /// Looks up a sensor type.
    #[must_use]
    pub fn sensor_type(&self, id: TypeId) -> Option<&SensorType> {
        self.types.get(&id)
    }
}
