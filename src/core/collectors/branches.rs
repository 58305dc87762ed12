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

pub const SUBSYSTEM: &str = "branches";

const LABELS: &[&str] = &["id", "name", "phase_id", "ocp_id"];
const STATUS_LABELS: &[&str] = &["id", "name", "phase_id", "ocp_id", STATUS_TYPE_LABEL];

pub static AMPS: MetricDescriptor = MetricDescriptor::new(
    SUBSYSTEM,
    "amps",
    "Floating point branch current in hundredth Amps. Available only if branch current sensing is present and value is known.",
    LABELS,
);
pub static AMPS_CAPACITY: MetricDescriptor = MetricDescriptor::new(
    SUBSYSTEM,
    "amps_capacity",
    "Integer branch current capacity in whole Amps.",
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

/// One element of `/jaws/monitor/branches`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Branch {
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
    pub ocp_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub phase_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub state: String,
    #[serde(deserialize_with = "null_as_default")]
    pub status: String,
}

impl Branch {
    fn labels(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            self.phase_id.clone(),
            self.ocp_id.clone(),
        ]
    }
}

/// Branch circuits: current, capacity, state and status per branch.
#[derive(Debug, Clone, Copy, Default)]
pub struct BranchesMapper;

impl CategoryMapper for BranchesMapper {
    fn category(&self) -> &'static str {
        SUBSYSTEM
    }

    fn map(&self, raw: &[u8]) -> CollectorResult<Vec<MetricEmission>> {
        let branches: Vec<Branch> = decode_entities(SUBSYSTEM, raw)?;
        let mut out = Vec::with_capacity(branches.len() * 5);

        for branch in &branches {
            let labels = branch.labels();

            out.push(MetricEmission::gauge(&AMPS, branch.current, labels.clone()));
            out.push(MetricEmission::gauge(
                &AMPS_CAPACITY,
                branch.current_capacity,
                labels.clone(),
            ));

            out.push(status_emission(&STATUS, &branch.current_status, "current", &labels));
            out.push(status_emission(&STATUS, &branch.status, "branch", &labels));

            out.push(state_emission(&STATE, &branch.state, &labels));
        }

        Ok(out)
    }
}

register_collector!(BranchesMapper, SUBSYSTEM, true);
