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

pub const SUBSYSTEM: &str = "cords";

const LABELS: &[&str] = &["id", "name", "plug_type"];
const STATUS_LABELS: &[&str] = &["id", "name", "plug_type", STATUS_TYPE_LABEL];

pub static WATTS: MetricDescriptor = MetricDescriptor::new(
    SUBSYSTEM,
    "watts",
    "Integer cord power in Watts. Available only if cord power sensing is present and value is known (AC or DC).",
    LABELS,
);
pub static WATTS_CAPACITY: MetricDescriptor = MetricDescriptor::new(
    SUBSYSTEM,
    "watts_capacity",
    "Integer cord power capacity in Watts.",
    LABELS,
);
pub static VOLTAMPS: MetricDescriptor = MetricDescriptor::new(
    SUBSYSTEM,
    "voltamps",
    "Integer cord apparent power ranging from 0 to maximum rated power in Volt-Amps. Available only if AC cord power sensing is present and value is known.",
    LABELS,
);
pub static KILOWATTHOURS: MetricDescriptor = MetricDescriptor::new(
    SUBSYSTEM,
    "kilowatthours",
    "Floating point cord energy in tenth kilowatt-hours (kWh). Available only if energy sensing is present and value is known.",
    LABELS,
);
pub static HERTZ: MetricDescriptor = MetricDescriptor::new(
    SUBSYSTEM,
    "hertz",
    "Floating point cord frequency in tenth Hertz (Hz). Available only if frequency sensing is present and value is known.",
    LABELS,
);
pub static THREE_PHASE_IMBALANCE: MetricDescriptor = MetricDescriptor::new(
    SUBSYSTEM,
    "three_phase_imbalance",
    "Floating point 3 phase out of balance percentage in tenths. Available only if 3-phase AC cord current sensing is present and value is known.",
    LABELS,
);
pub static POWER_FACTOR: MetricDescriptor = MetricDescriptor::new(
    SUBSYSTEM,
    "power_factor",
    "Floating point cord power factor in hundredths. Available only if AC cord power factor sensing is present and value is known.",
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

/// One element of `/jaws/monitor/cords`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Cord {
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
    pub apparent_power_status: String,
    #[serde(deserialize_with = "null_as_default")]
    pub energy: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub frequency: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub power_capacity: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub power_factor: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub power_factor_status: String,
    #[serde(deserialize_with = "null_as_default")]
    pub power_utilized: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub plug_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub state: String,
    #[serde(deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(deserialize_with = "null_as_default")]
    pub three_phase_imbalance: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub three_phase_imbalance_status: String,
}

impl Cord {
    fn labels(&self) -> Vec<String> {
        vec![self.id.clone(), self.name.clone(), self.plug_type.clone()]
    }
}

/// Input cords: power, energy, frequency and their status flags.
#[derive(Debug, Clone, Copy, Default)]
pub struct CordsMapper;

impl CategoryMapper for CordsMapper {
    fn category(&self) -> &'static str {
        SUBSYSTEM
    }

    fn map(&self, raw: &[u8]) -> CollectorResult<Vec<MetricEmission>> {
        let cords: Vec<Cord> = decode_entities(SUBSYSTEM, raw)?;
        let mut out = Vec::with_capacity(cords.len() * 13);

        for cord in &cords {
            let labels = cord.labels();

            let readings = [
                (&WATTS, cord.active_power),
                (&WATTS_CAPACITY, cord.power_capacity),
                (&VOLTAMPS, cord.apparent_power),
                (&KILOWATTHOURS, cord.energy),
                (&HERTZ, cord.frequency),
                (&THREE_PHASE_IMBALANCE, cord.three_phase_imbalance),
                (&POWER_FACTOR, cord.power_factor),
            ];
            for (descriptor, value) in readings {
                out.push(MetricEmission::gauge(descriptor, value, labels.clone()));
            }

            let statuses = [
                (cord.active_power_status.as_str(), "active power"),
                (cord.apparent_power_status.as_str(), "apparent power"),
                (cord.power_factor_status.as_str(), "power factor"),
                (cord.three_phase_imbalance_status.as_str(), "three phase imbalance"),
                (cord.status.as_str(), "cord"),
            ];
            for (raw_status, status_type) in statuses {
                out.push(status_emission(&STATUS, raw_status, status_type, &labels));
            }

            out.push(state_emission(&STATE, &cord.state, &labels));
        }

        Ok(out)
    }
}

register_collector!(CordsMapper, SUBSYSTEM, true);

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r#"[{
        "id": "AA",
        "name": "Master_Cord_A",
        "active_power": 412,
        "active_power_status": "Normal",
        "apparent_power": 455,
        "apparent_power_status": "Normal",
        "energy": 10234.5,
        "frequency": 60.1,
        "power_capacity": 5760,
        "power_factor": 0.91,
        "power_factor_status": "Low Warning",
        "power_utilized": 7,
        "plug_type": "NEMA L6-30P",
        "state": "On",
        "status": "Normal",
        "three_phase_imbalance": 0,
        "three_phase_imbalance_status": "normal",
        "firmware_only_field": {"ignored": true}
    }]"#;

    fn find<'a>(out: &'a [MetricEmission], name: &str) -> Vec<&'a MetricEmission> {
        out.iter().filter(|e| e.descriptor.fq_name() == name).collect()
    }

    #[test]
    fn raw_readings_pass_through() {
        let out = CordsMapper.map(PAYLOAD.as_bytes()).unwrap();

        assert_eq!(out.len(), 13);
        assert_eq!(find(&out, "servertech_cords_watts")[0].value, 412.0);
        assert_eq!(find(&out, "servertech_cords_watts_capacity")[0].value, 5760.0);
        assert_eq!(find(&out, "servertech_cords_voltamps")[0].value, 455.0);
        assert_eq!(find(&out, "servertech_cords_kilowatthours")[0].value, 10234.5);
        assert_eq!(find(&out, "servertech_cords_hertz")[0].value, 60.1);
        assert_eq!(find(&out, "servertech_cords_power_factor")[0].value, 0.91);
        assert_eq!(
            find(&out, "servertech_cords_watts")[0].labels,
            vec!["AA", "Master_Cord_A", "NEMA L6-30P"]
        );
    }

    #[test]
    fn five_status_emissions_share_one_descriptor() {
        let out = CordsMapper.map(PAYLOAD.as_bytes()).unwrap();
        let statuses = find(&out, "servertech_cords_status");

        let pairs: Vec<(&str, f64)> = statuses
            .iter()
            .map(|e| (e.label(STATUS_TYPE_LABEL).unwrap(), e.value))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("active power", 1.0),
                ("apparent power", 1.0),
                ("power factor", 0.0),
                ("three phase imbalance", 1.0),
                ("cord", 1.0),
            ]
        );
    }

    #[test]
    fn state_on_is_one() {
        let out = CordsMapper.map(PAYLOAD.as_bytes()).unwrap();
        assert_eq!(find(&out, "servertech_cords_state")[0].value, 1.0);
    }

    #[test]
    fn missing_sensors_decode_to_zero() {
        let out = CordsMapper
            .map(br#"[{"id": "AB", "name": "Cord_B", "frequency": null}]"#)
            .unwrap();

        assert_eq!(out.len(), 13);
        assert_eq!(find(&out, "servertech_cords_hertz")[0].value, 0.0);
        assert_eq!(find(&out, "servertech_cords_state")[0].value, 0.0);
        assert_eq!(find(&out, "servertech_cords_watts")[0].labels[2], "");
    }

    #[test]
    fn mapping_is_deterministic() {
        let first = CordsMapper.map(PAYLOAD.as_bytes()).unwrap();
        let second = CordsMapper.map(PAYLOAD.as_bytes()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn truncated_payload_is_an_error() {
        assert!(CordsMapper.map(&PAYLOAD.as_bytes()[..40]).is_err());
    }
}
