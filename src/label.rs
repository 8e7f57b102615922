use crate::{Catalog, Measurement, SensorId, TypeId};
use std::hash::Hash;

/// Name used when a measurement's sensor type cannot be resolved.
pub const DEFAULT_TYPE_NAME: &str = "Sensor";

/// Derives the series a measurement belongs to.
///
/// The label is used both as grouping key and as legend entry,
/// so it must be a pure function of the measurement.
pub trait Labeler {
    /// Everything of a measurement that the label depends on.
    ///
    /// Labels are memoized by this key during one aggregation run.
    type Key: Eq + Hash;

    /// Extracts the memoization key.
    fn key(&self, measurement: &Measurement) -> Self::Key;

    /// Computes the series label.
    fn label(&self, measurement: &Measurement) -> String;
}

/// Labels series as `"{type} - {sensor}"` using sensor and type lookup tables.
///
/// ```
/// use sensorchart::{Catalog, CatalogLabeler, Labeler, Measurement, Sensor, SensorType};
/// # let ts = chrono::Utc::now();
///
/// let catalog = Catalog::new(
///     [Sensor { id: 1, name: "North wall".into(), type_id: Some(10) }],
///     [SensorType { id: 10, name: "Temperature".into() }],
/// );
/// let labeler = CatalogLabeler::new(&catalog);
///
/// let m = Measurement::new(21.5, ts, 1).sensor(1);
/// assert_eq!("Temperature - North wall", labeler.label(&m));
/// ```
#[derive(Copy, Clone, Debug)]
pub struct CatalogLabeler<'a> {
    catalog: &'a Catalog,
}

impl<'a> CatalogLabeler<'a> {
    /// Creates a labeler over the given lookup tables.
    #[must_use]
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }
}

impl Labeler for CatalogLabeler<'_> {
    type Key = (Option<SensorId>, Option<TypeId>, Option<TypeId>);

    fn key(&self, measurement: &Measurement) -> Self::Key {
        (
            measurement.resolve_sensor_id(),
            measurement.type_id,
            measurement.placement_type_id(),
        )
    }

    fn label(&self, measurement: &Measurement) -> String {
        let sensor = measurement
            .resolve_sensor_id()
            .and_then(|id| self.catalog.sensor(id));

        let type_name = measurement
            .type_id
            .or_else(|| sensor.and_then(|s| s.type_id))
            .or_else(|| measurement.placement_type_id())
            .and_then(|id| self.catalog.sensor_type(id))
            .map_or(DEFAULT_TYPE_NAME, |t| t.name.as_str());

        match sensor.map(|s| s.name.as_str()) {
            Some(name) if !name.is_empty() && name != type_name => {
                format!("{type_name} - {name}")
            }
            _ => type_name.to_owned(),
        }
    }
}

/// Memoizes labels for the lifetime of a single aggregation run.
pub(crate) struct LabelCache<'a, L: Labeler> {
    labeler: &'a L,
    labels: crate::HashMap<L::Key, String>,
}

impl<'a, L: Labeler> LabelCache<'a, L> {
    pub fn new(labeler: &'a L) -> Self {
        Self {
            labeler,
            labels: crate::HashMap::default(),
        }
    }

    pub fn get(&mut self, measurement: &Measurement) -> &str {
        let labeler = self.labeler;

        self.labels
            .entry(labeler.key(measurement))
            .or_insert_with(|| {
                let label = labeler.label(measurement);
                log::trace!("resolved series label {label:?}");
                label
            })
    }
}
