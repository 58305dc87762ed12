use serde::Deserialize;

use super::{
    encoding::{decode_entities, null_as_default, status_emission, DisplayOrientation, UnitSequence},
    registry::MapperOptions,
    traits::CategoryMapper,
    types::CollectorResult,
};
use crate::{
    config::collectors::UnitSequenceSource,
    core::metrics::{MetricDescriptor, MetricEmission, STATUS_TYPE_LABEL},
    register_collector,
};

pub const SUBSYSTEM: &str = "units";

const LABELS: &[&str] = &["id", "name", "type"];
const STATUS_LABELS: &[&str] = &["id", "name", "type", STATUS_TYPE_LABEL];

pub static DISPLAY_ORIENTATION: MetricDescriptor = MetricDescriptor::new(
    SUBSYSTEM,
    "display_orientation",
    "0 = Unknown, 1 = Auto (inverted), 2 = Auto (Normal), 3 = Inverted, 4 = Normal.",
    LABELS,
);
pub static UNIT_SEQUENCE: MetricDescriptor = MetricDescriptor::new(
    SUBSYSTEM,
    "unit_sequence",
    "0 = Unknown, 1 = Normal, 2 = Reversed.",
    LABELS,
);
pub static STATUS: MetricDescriptor = MetricDescriptor::new(
    SUBSYSTEM,
    "status",
    "Status (1 = Normal, 0 = Not Normal).",
    STATUS_LABELS,
);

/// One element of `/jaws/monitor/units`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Unit {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub display_orientation: String,
    #[serde(deserialize_with = "null_as_default")]
    pub unit_sequence: String,
    #[serde(deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub kind: String,
}

/// Maps PDU units (master and link enclosures).
///
/// The `unit_sequence` code is read from whichever field `sequence_source`
/// selects, see [`UnitSequenceSource`].
#[derive(Debug, Clone, Copy, Default)]
pub struct UnitsMapper {
    sequence_source: UnitSequenceSource,
}

impl UnitsMapper {
    pub fn new(sequence_source: UnitSequenceSource) -> Self {
        Self { sequence_source }
    }

    pub fn from_options(options: &MapperOptions) -> Self {
        Self::new(options.unit_sequence_source)
    }

    fn sequence_field<'a>(&self, unit: &'a Unit) -> &'a str {
        match self.sequence_source {
            UnitSequenceSource::DisplayOrientation => &unit.display_orientation,
            UnitSequenceSource::UnitSequence => &unit.unit_sequence,
        }
    }
}

impl CategoryMapper for UnitsMapper {
    fn category(&self) -> &'static str {
        SUBSYSTEM
    }

    fn map(&self, raw: &[u8]) -> CollectorResult<Vec<MetricEmission>> {
        let units: Vec<Unit> = decode_entities(SUBSYSTEM, raw)?;
        let mut out = Vec::with_capacity(units.len() * 3);

        for unit in &units {
            let labels = vec![unit.id.clone(), unit.name.clone(), unit.kind.clone()];

            out.push(MetricEmission::gauge(
                &DISPLAY_ORIENTATION,
                DisplayOrientation::from_device(&unit.display_orientation).code(),
                labels.clone(),
            ));
            out.push(MetricEmission::gauge(
                &UNIT_SEQUENCE,
                UnitSequence::from_device(self.sequence_field(unit)).code(),
                labels.clone(),
            ));
            out.push(status_emission(&STATUS, &unit.status, "unit", &labels));
        }

        Ok(out)
    }
}

register_collector!(UnitsMapper, SUBSYSTEM, true, UnitsMapper::from_options);
