use serde::Deserialize;

use super::{
    encoding::{decode_entities, null_as_default, status_emission},
    traits::CategoryMapper,
    types::CollectorResult,
};
use crate::{
    core::metrics::{MetricDescriptor, MetricEmission, STATUS_TYPE_LABEL},
    register_collector,
};

pub const SUBSYSTEM: &str = "ocps";

const LABELS: &[&str] = &["id", "name", "type"];
const STATUS_LABELS: &[&str] = &["id", "name", "type", STATUS_TYPE_LABEL];

pub static AMPS_CAPACITY: MetricDescriptor = MetricDescriptor::new(
    SUBSYSTEM,
    "amps_capacity",
    "Integer over-current protector capacity in whole Amps.",
    LABELS,
);
pub static STATUS: MetricDescriptor = MetricDescriptor::new(
    SUBSYSTEM,
    "status",
    "Status (1 = Normal, 0 = Not Normal).",
    STATUS_LABELS,
);

/// One element of `/jaws/monitor/ocps`. Breakers and fuses report no
/// current of their own, only a rating and a trip status.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Ocp {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub current_capacity: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub kind: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OcpsMapper;

impl CategoryMapper for OcpsMapper {
    fn category(&self) -> &'static str {
        SUBSYSTEM
    }

    fn map(&self, raw: &[u8]) -> CollectorResult<Vec<MetricEmission>> {
        let ocps: Vec<Ocp> = decode_entities(SUBSYSTEM, raw)?;
        let mut out = Vec::with_capacity(ocps.len() * 2);

        for ocp in &ocps {
            let labels = vec![ocp.id.clone(), ocp.name.clone(), ocp.kind.clone()];

            out.push(MetricEmission::gauge(
                &AMPS_CAPACITY,
                ocp.current_capacity,
                labels.clone(),
            ));
            out.push(status_emission(&STATUS, &ocp.status, "ocp", &labels));
        }

        Ok(out)
    }
}

register_collector!(OcpsMapper, SUBSYSTEM, true);
