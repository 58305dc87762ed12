use serde::Deserialize;

use super::{
    encoding::{decode_entities, null_as_default, state_emission, status_emission},
    traits::CategoryMapper,
    types::CollectorResult,
};
use crate::{
    core::metrics::{MetricDescriptor, MetricEmission, STATUS_TYPE_LABEL},
    register_collector,
};

pub const SUBSYSTEM: &str = "lines";

const LABELS: &[&str] = &["id", "name"];
const STATUS_LABELS: &[&str] = &["id", "name", STATUS_TYPE_LABEL];

pub static AMPS: MetricDescriptor = MetricDescriptor::new(
    SUBSYSTEM,
    "amps",
    "Floating point line current in hundredth Amps. Available only if line current sensing is present and value is known.",
    LABELS,
);
pub static AMPS_CAPACITY: MetricDescriptor = MetricDescriptor::new(
    SUBSYSTEM,
    "amps_capacity",
    "Integer line current capacity in whole Amps.",
    LABELS,
);
pub static STATE: MetricDescriptor =
    MetricDescriptor::new(SUBSYSTEM, "state", "State (1 = On, 0 = Off).", LABELS);
pub static STATUS: MetricDescriptor = MetricDescriptor::new(
    SUBSYSTEM,
    "status",
    "Status (1 = Normal, 0 = Not Normal).",
    STATUS_LABELS,
);

/// One element of `/jaws/monitor/lines`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Line {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub current: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub current_capacity: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub current_status: String,
    #[serde(deserialize_with = "null_as_default")]
    pub current_utilized: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub state: String,
    #[serde(deserialize_with = "null_as_default")]
    pub status: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LinesMapper;

impl CategoryMapper for LinesMapper {
    fn category(&self) -> &'static str {
        SUBSYSTEM
    }

    fn map(&self, raw: &[u8]) -> CollectorResult<Vec<MetricEmission>> {
        let lines: Vec<Line> = decode_entities(SUBSYSTEM, raw)?;
        let mut out = Vec::with_capacity(lines.len() * 5);

        for line in &lines {
            let labels = vec![line.id.clone(), line.name.clone()];

            out.push(MetricEmission::gauge(&AMPS, line.current, labels.clone()));
            out.push(MetricEmission::gauge(
                &AMPS_CAPACITY,
                line.current_capacity,
                labels.clone(),
            ));

            out.push(status_emission(&STATUS, &line.current_status, "current", &labels));
            out.push(status_emission(&STATUS, &line.status, "line", &labels));

            out.push(state_emission(&STATE, &line.state, &labels));
        }

        Ok(out)
    }
}

register_collector!(LinesMapper, SUBSYSTEM, true);
