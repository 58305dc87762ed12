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

pub const SUBSYSTEM: &str = "phases";

const LABELS: &[&str] = &["id", "name"];
const STATUS_LABELS: &[&str] = &["id", "name", STATUS_TYPE_LABEL];

pub static WATTS: MetricDescriptor = MetricDescriptor::new(
    SUBSYSTEM,
    "watts",
    "Integer phase power in Watts. Available only if phase power sensing is present and value is known (AC or DC).",
    LABELS,
);
pub static VOLTAMPS: MetricDescriptor = MetricDescriptor::new(
    SUBSYSTEM,
    "voltamps",
    "Integer phase apparent power in Volt-Amps. Available only if phase apparent power sensing is present and value is known.",
    LABELS,
);
pub static AMPS: MetricDescriptor = MetricDescriptor::new(
    SUBSYSTEM,
    "amps",
    "Floating point phase current in hundredth Amps. Available only if phase current sensing is present and value is known.",
    LABELS,
);
pub static CREST_FACTOR: MetricDescriptor = MetricDescriptor::new(
    SUBSYSTEM,
    "crest_factor",
    "Floating point phase crest factor in tenths. Available only if phase crest factor sensing is present and value is known.",
    LABELS,
);
pub static KILOWATTHOURS: MetricDescriptor = MetricDescriptor::new(
    SUBSYSTEM,
    "kilowatthours",
    "Floating point phase energy in tenth kilowatt-hours (kWh). Available only if energy sensing is present and value is known.",
    LABELS,
);
pub static NOMINAL_VOLTS: MetricDescriptor = MetricDescriptor::new(
    SUBSYSTEM,
    "nominal_volts",
    "Integer phase nominal voltage in Volts. Available only if phase voltage sensing present.",
    LABELS,
);
pub static POWER_FACTOR: MetricDescriptor = MetricDescriptor::new(
    SUBSYSTEM,
    "power_factor",
    "Floating point phase power factor in hundredths. Available only if phase power factor sensing is present and value is known.",
    LABELS,
);
pub static REACTANCE: MetricDescriptor = MetricDescriptor::new(
    SUBSYSTEM,
    "reactance",
    "Measured phase reactance (0 = Unknown, 1 = Capacitive, 2 = Inductive, 3 = Resistive). Available only if phase power factor sensing is present and value is known.",
    LABELS,
);
pub static VOLTS: MetricDescriptor = MetricDescriptor::new(
    SUBSYSTEM,
    "volts",
    "Floating point phase voltage in tenth Volts. Available only if voltage sensing is present and value is known.",
    LABELS,
);
pub static VOLTS_DEVIATION: MetricDescriptor = MetricDescriptor::new(
    SUBSYSTEM,
    "volts_deviation",
    "Floating point phase deviation percentage from nominal voltage in tenths. Available only if phase voltage sensing present.",
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

/// One element of `/jaws/monitor/phases`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Phase {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub active_power: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub apparent_power: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub crest_factor: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub current: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub energy: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub nominal_voltage: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub power_factor: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub power_factor_status: String,
    #[serde(deserialize_with = "null_as_default")]
    pub reactance: String,
    #[serde(deserialize_with = "null_as_default")]
    pub state: String,
    #[serde(deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(deserialize_with = "null_as_default")]
    pub voltage: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub voltage_status: String,
    #[serde(deserialize_with = "null_as_default")]
    pub voltage_deviation: f64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PhasesMapper;

impl CategoryMapper for PhasesMapper {
    fn category(&self) -> &'static str {
        SUBSYSTEM
    }

    fn map(&self, raw: &[u8]) -> CollectorResult<Vec<MetricEmission>> {
        let phases: Vec<Phase> = decode_entities(SUBSYSTEM, raw)?;
        let mut out = Vec::with_capacity(phases.len() * 14);

        for phase in &phases {
            let labels = vec![phase.id.clone(), phase.name.clone()];

            let readings = [
                (&WATTS, phase.active_power),
                (&VOLTAMPS, phase.apparent_power),
                (&AMPS, phase.current),
                (&CREST_FACTOR, phase.crest_factor),
                (&KILOWATTHOURS, phase.energy),
                (&NOMINAL_VOLTS, phase.nominal_voltage),
                (&POWER_FACTOR, phase.power_factor),
                (&VOLTS, phase.voltage),
                (&VOLTS_DEVIATION, phase.voltage_deviation),
                (&REACTANCE, Reactance::from_device(&phase.reactance).code()),
            ];
            for (descriptor, value) in readings {
                out.push(MetricEmission::gauge(descriptor, value, labels.clone()));
            }

            out.push(status_emission(
                &STATUS,
                &phase.power_factor_status,
                "power factor",
                &labels,
            ));
            out.push(status_emission(&STATUS, &phase.voltage_status, "voltage", &labels));
            out.push(status_emission(&STATUS, &phase.status, "phase", &labels));

            out.push(state_emission(&STATE, &phase.state, &labels));
        }

        Ok(out)
    }
}

register_collector!(PhasesMapper, SUBSYSTEM, true);

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r#"[{
        "id": "AA1",
        "name": "L1-N",
        "active_power": 1230,
        "apparent_power": 1302,
        "crest_factor": 1.5,
        "current": 10.24,
        "energy": 45012.7,
        "nominal_voltage": 120,
        "power_factor": 0.94,
        "power_factor_status": "Normal",
        "reactance": "Inductive",
        "state": "On",
        "status": "Normal",
        "voltage": 121.3,
        "voltage_status": "High Warning",
        "voltage_deviation": 1.1
    }]"#;

    #[test]
    fn maps_phase_readings() {
        let out = PhasesMapper.map(PAYLOAD.as_bytes()).unwrap();
        assert_eq!(out.len(), 14);

        let names_and_values: Vec<(&str, f64)> =
            out[..10].iter().map(|e| (e.descriptor.name, e.value)).collect();
        assert_eq!(
            names_and_values,
            vec![
                ("watts", 1230.0),
                ("voltamps", 1302.0),
                ("amps", 10.24),
                ("crest_factor", 1.5),
                ("kilowatthours", 45012.7),
                ("nominal_volts", 120.0),
                ("power_factor", 0.94),
                ("volts", 121.3),
                ("volts_deviation", 1.1),
                ("reactance", 2.0),
            ]
        );
    }

    #[test]
    fn three_statuses_and_state() {
        let out = PhasesMapper.map(PAYLOAD.as_bytes()).unwrap();
        let tail: Vec<(Option<&str>, f64)> = out[10..]
            .iter()
            .map(|e| (e.label(STATUS_TYPE_LABEL), e.value))
            .collect();

        assert_eq!(
            tail,
            vec![
                (Some("power factor"), 1.0),
                (Some("voltage"), 0.0),
                (Some("phase"), 1.0),
                (None, 1.0),
            ]
        );
    }

    #[test]
    fn unknown_reactance_is_zero() {
        let out = PhasesMapper
            .map(br#"[{"id": "AA1", "name": "L1", "reactance": "Unknown"}]"#)
            .unwrap();
        let reactance = out.iter().find(|e| e.descriptor.name == "reactance").unwrap();
        assert_eq!(reactance.value, 0.0);
    }
}
