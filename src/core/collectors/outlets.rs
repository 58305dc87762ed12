use serde::Deserialize;

use super::{
    encoding::{decode_entities, null_as_default, state_emission, status_emission, Reactance},
    traits::CategoryMapper,
    types::CollectorResult,
};
use crate::{
    core::metrics::{MetricDescriptor, MetricEmission, STATUS_TYPE_LABEL},
    register_collector,
};

pub const SUBSYSTEM: &str = "outlets";

const LABELS: &[&str] = &[
    "id",
    "name",
    "branch_id",
    "ocp_id",
    "phase_id",
    "socket_adapter",
    "socket_type",
];
const STATUS_LABELS: &[&str] = &[
    "id",
    "name",
    "branch_id",
    "ocp_id",
    "phase_id",
    "socket_adapter",
    "socket_type",
    STATUS_TYPE_LABEL,
];

pub static WATTS: MetricDescriptor = MetricDescriptor::new(
    SUBSYSTEM,
    "watts",
    "Integer outlet power in Watts. Available only if outlet power sensing is present and value is known (AC or DC).",
    LABELS,
);
pub static WATTS_CAPACITY: MetricDescriptor = MetricDescriptor::new(
    SUBSYSTEM,
    "watts_capacity",
    "Integer power capacity in VA for AC products and Watts for DC products.",
    LABELS,
);
pub static VOLTAMPS: MetricDescriptor = MetricDescriptor::new(
    SUBSYSTEM,
    "voltamps",
    "Integer outlet apparent power in Volt-Amps. Available only if outlet apparent power sensing is present and value is known.",
    LABELS,
);
pub static AMPS: MetricDescriptor = MetricDescriptor::new(
    SUBSYSTEM,
    "amps",
    "Floating point outlet current in hundredth Amps. Available only if outlet current sensing is present and value is known.",
    LABELS,
);
pub static AMPS_CAPACITY: MetricDescriptor = MetricDescriptor::new(
    SUBSYSTEM,
    "amps_capacity",
    "Integer outlet current capacity in whole Amps.",
    LABELS,
);
pub static CREST_FACTOR: MetricDescriptor = MetricDescriptor::new(
    SUBSYSTEM,
    "crest_factor",
    "Floating point outlet crest factor in tenths. Available only if outlet crest factor sensing is present and value is known.",
    LABELS,
);
pub static KILOWATTHOURS: MetricDescriptor = MetricDescriptor::new(
    SUBSYSTEM,
    "kilowatthours",
    "Floating point outlet energy in tenth kilowatt-hours (kWh). Available only if energy sensing is present and value is known.",
    LABELS,
);
pub static POWER_FACTOR: MetricDescriptor = MetricDescriptor::new(
    SUBSYSTEM,
    "power_factor",
    "Floating point outlet power factor in hundredths. Available only if outlet power factor sensing is present and value is known.",
    LABELS,
);
pub static REACTANCE: MetricDescriptor = MetricDescriptor::new(
    SUBSYSTEM,
    "reactance",
    "Measured outlet reactance (0 = Unknown, 1 = Capacitive, 2 = Inductive, 3 = Resistive). Available only if outlet power factor sensing is present and value is known.",
    LABELS,
);
pub static VOLTS: MetricDescriptor = MetricDescriptor::new(
    SUBSYSTEM,
    "volts",
    "Floating point outlet voltage in tenth Volts. Available only if voltage sensing is present and value is known.",
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

/// One element of `/jaws/monitor/outlets`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Outlet {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub active_power: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub active_power_status: String,
    #[serde(deserialize_with = "null_as_default")]
    pub apparent_power: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub branch_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub control_state: String,
    #[serde(deserialize_with = "null_as_default")]
    pub current: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub current_capacity: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub current_status: String,
    #[serde(deserialize_with = "null_as_default")]
    pub current_utilized: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub energy: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub ocp_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub phase_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub power_capacity: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub power_factor_status: String,
    #[serde(deserialize_with = "null_as_default")]
    pub socket_adapter: String,
    #[serde(deserialize_with = "null_as_default")]
    pub socket_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub state: String,
    #[serde(deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(deserialize_with = "null_as_default")]
    pub voltage: f64,
    // Only reported by outlets with power factor sensing.
    #[serde(deserialize_with = "null_as_default")]
    pub crest_factor: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub power_factor: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub reactance: String,
}

impl Outlet {
    fn labels(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            self.branch_id.clone(),
            self.ocp_id.clone(),
            self.phase_id.clone(),
            self.socket_adapter.clone(),
            self.socket_type.clone(),
        ]
    }
}

/// Individually metered receptacles.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutletsMapper;

impl CategoryMapper for OutletsMapper {
    fn category(&self) -> &'static str {
        SUBSYSTEM
    }

    fn map(&self, raw: &[u8]) -> CollectorResult<Vec<MetricEmission>> {
        let outlets: Vec<Outlet> = decode_entities(SUBSYSTEM, raw)?;
        let mut out = Vec::with_capacity(outlets.len() * 15);

        for outlet in &outlets {
            let labels = outlet.labels();

            let readings = [
                (&WATTS, outlet.active_power),
                (&WATTS_CAPACITY, outlet.power_capacity),
                (&VOLTAMPS, outlet.apparent_power),
                (&AMPS, outlet.current),
                (&AMPS_CAPACITY, outlet.current_capacity),
                (&CREST_FACTOR, outlet.crest_factor),
                (&KILOWATTHOURS, outlet.energy),
                (&POWER_FACTOR, outlet.power_factor),
                (&VOLTS, outlet.voltage),
                (&REACTANCE, Reactance::from_device(&outlet.reactance).code()),
            ];
            for (descriptor, value) in readings {
                out.push(MetricEmission::gauge(descriptor, value, labels.clone()));
            }

            let statuses = [
                (outlet.active_power_status.as_str(), "active power"),
                (outlet.current_status.as_str(), "current"),
                (outlet.power_factor_status.as_str(), "power factor"),
                (outlet.status.as_str(), "outlet"),
            ];
            for (raw_status, status_type) in statuses {
                out.push(status_emission(&STATUS, raw_status, status_type, &labels));
            }

            out.push(state_emission(&STATE, &outlet.state, &labels));
        }

        Ok(out)
    }
}

register_collector!(OutletsMapper, SUBSYSTEM, true);
