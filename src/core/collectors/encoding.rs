//! Conversions from device vocabulary to numeric metric values.
//!
//! All comparisons are case-insensitive, using full Unicode lowercasing.
//! Values outside a vocabulary map to the `Unknown` code (0) instead of
//! failing the scrape.

use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use serde_json::{Map, Value};

use super::{error::CollectorError, types::CollectorResult};
use crate::core::metrics::{MetricDescriptor, MetricEmission};

/// 1.0 when the device reports `Normal`, 0.0 for anything else.
pub fn status_value(raw: &str) -> f64 {
    if raw.to_lowercase() == "normal" {
        1.0
    } else {
        0.0
    }
}

/// 1.0 when the device reports `On`, 0.0 for anything else.
pub fn state_value(raw: &str) -> f64 {
    if raw.to_lowercase() == "on" {
        1.0
    } else {
        0.0
    }
}

/// Measured load type of an outlet or phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reactance {
    Unknown = 0,
    Capacitive = 1,
    Inductive = 2,
    Resistive = 3,
}

impl Reactance {
    pub fn from_device(raw: &str) -> Self {
        match raw.to_lowercase().as_str() {
            "capacitive" => Reactance::Capacitive,
            "inductive" => Reactance::Inductive,
            "resistive" => Reactance::Resistive,
            _ => Reactance::Unknown,
        }
    }

    pub fn code(self) -> f64 {
        f64::from(self as u8)
    }
}

/// Front-panel display orientation of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayOrientation {
    Unknown = 0,
    AutoInverted = 1,
    AutoNormal = 2,
    Inverted = 3,
    Normal = 4,
}

impl DisplayOrientation {
    pub fn from_device(raw: &str) -> Self {
        match raw.to_lowercase().as_str() {
            "auto (inverted)" => DisplayOrientation::AutoInverted,
            "auto (normal)" => DisplayOrientation::AutoNormal,
            "inverted" => DisplayOrientation::Inverted,
            "normal" => DisplayOrientation::Normal,
            _ => DisplayOrientation::Unknown,
        }
    }

    pub fn code(self) -> f64 {
        f64::from(self as u8)
    }
}

/// Outlet numbering sequence of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitSequence {
    Unknown = 0,
    Normal = 1,
    Reversed = 2,
}

impl UnitSequence {
    pub fn from_device(raw: &str) -> Self {
        match raw.to_lowercase().as_str() {
            "normal" => UnitSequence::Normal,
            "reversed" => UnitSequence::Reversed,
            _ => UnitSequence::Unknown,
        }
    }

    pub fn code(self) -> f64 {
        f64::from(self as u8)
    }
}

/// Status gauge: entity labels plus a trailing `status_type` value.
pub fn status_emission(
    descriptor: &'static MetricDescriptor,
    raw: &str,
    status_type: &str,
    labels: &[String],
) -> MetricEmission {
    let mut status_labels = Vec::with_capacity(labels.len() + 1);
    status_labels.extend_from_slice(labels);
    status_labels.push(status_type.to_string());
    MetricEmission::gauge(descriptor, status_value(raw), status_labels)
}

pub fn state_emission(
    descriptor: &'static MetricDescriptor,
    raw: &str,
    labels: &[String],
) -> MetricEmission {
    MetricEmission::gauge(descriptor, state_value(raw), labels.to_vec())
}

/// Decodes a category payload, tagging failures with the category name.
pub fn decode_payload<T: DeserializeOwned>(category: &str, raw: &[u8]) -> CollectorResult<T> {
    serde_json::from_slice(raw).map_err(|source| CollectorError::Decode {
        category: category.to_string(),
        source,
    })
}

/// Decodes an array category. Every element must be a JSON object; derived
/// struct decoding would otherwise fill fields from an array by position.
pub fn decode_entities<T: DeserializeOwned>(category: &str, raw: &[u8]) -> CollectorResult<Vec<T>> {
    let objects: Vec<Map<String, Value>> = decode_payload(category, raw)?;
    objects
        .into_iter()
        .map(|object| from_object(category, object))
        .collect()
}

/// Decodes a single-object category such as `system`.
pub fn decode_entity<T: DeserializeOwned>(category: &str, raw: &[u8]) -> CollectorResult<T> {
    let object: Map<String, Value> = decode_payload(category, raw)?;
    from_object(category, object)
}

fn from_object<T: DeserializeOwned>(category: &str, object: Map<String, Value>) -> CollectorResult<T> {
    serde_json::from_value(Value::Object(object)).map_err(|source| CollectorError::Decode {
        category: category.to_string(),
        source,
    })
}

/// Treats an explicit JSON `null` like a missing field.
///
/// The device reports `null` for readings it has no sensor for; those must
/// decode to the zero value rather than fail the whole category.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_normal_any_case() {
        for raw in ["Normal", "normal", "NORMAL", "nOrMaL"] {
            assert_eq!(status_value(raw), 1.0, "{raw}");
        }
    }

    #[test]
    fn status_everything_else_is_zero() {
        for raw in ["", "Warning", "Not Normal", "normal ", "Alarm", "Off"] {
            assert_eq!(status_value(raw), 0.0, "{raw:?}");
        }
    }

    #[test]
    fn state_on_any_case() {
        assert_eq!(state_value("On"), 1.0);
        assert_eq!(state_value("on"), 1.0);
        assert_eq!(state_value("ON"), 1.0);
    }

    #[test]
    fn state_everything_else_is_zero() {
        for raw in ["Off", "", "ON ", "Idle", "Locked"] {
            assert_eq!(state_value(raw), 0.0, "{raw:?}");
        }
    }

    #[test]
    fn reactance_codes() {
        assert_eq!(Reactance::from_device("Capacitive").code(), 1.0);
        assert_eq!(Reactance::from_device("INDUCTIVE").code(), 2.0);
        assert_eq!(Reactance::from_device("resistive").code(), 3.0);
        for raw in ["", "unknown", "Resistive ", "Reactive"] {
            assert_eq!(Reactance::from_device(raw), Reactance::Unknown, "{raw:?}");
            assert_eq!(Reactance::from_device(raw).code(), 0.0);
        }
    }

    #[test]
    fn display_orientation_codes() {
        assert_eq!(DisplayOrientation::from_device("Auto (Inverted)").code(), 1.0);
        assert_eq!(DisplayOrientation::from_device("Auto (Normal)").code(), 2.0);
        assert_eq!(DisplayOrientation::from_device("Inverted").code(), 3.0);
        assert_eq!(DisplayOrientation::from_device("Normal").code(), 4.0);
        assert_eq!(DisplayOrientation::from_device("Auto").code(), 0.0);
        assert_eq!(DisplayOrientation::from_device("").code(), 0.0);
    }

    #[test]
    fn unit_sequence_codes() {
        assert_eq!(UnitSequence::from_device("Normal").code(), 1.0);
        assert_eq!(UnitSequence::from_device("REVERSED").code(), 2.0);
        assert_eq!(UnitSequence::from_device("Inverted").code(), 0.0);
    }

    #[test]
    fn status_emission_appends_status_type() {
        static DESC: MetricDescriptor = MetricDescriptor::new(
            "lines",
            "status",
            "help",
            &["id", "name", crate::core::metrics::STATUS_TYPE_LABEL],
        );
        let labels = vec!["AA1".to_string(), "L1".to_string()];
        let e = status_emission(&DESC, "Normal", "current", &labels);
        assert_eq!(e.value, 1.0);
        assert_eq!(e.labels, vec!["AA1", "L1", "current"]);
    }

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct Reading {
        #[serde(deserialize_with = "null_as_default")]
        current: f64,
        #[serde(deserialize_with = "null_as_default")]
        status: String,
    }

    #[test]
    fn nulls_and_missing_fields_decode_to_zero_values() {
        let r: Reading = decode_payload("test", br#"{"current": null}"#).unwrap();
        assert_eq!(r.current, 0.0);
        assert_eq!(r.status, "");
    }

    #[test]
    fn entities_decode_from_objects() {
        let readings: Vec<Reading> =
            decode_entities("test", br#"[{"current": 1.5, "status": "Normal"}, {}]"#).unwrap();
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].current, 1.5);
        assert_eq!(readings[1].status, "");
    }

    #[test]
    fn positional_array_entities_are_decode_errors() {
        let err = decode_entities::<Reading>("lines", br#"[["AA1", "x"]]"#).unwrap_err();
        assert!(matches!(err, CollectorError::Decode { ref category, .. } if category == "lines"));
        // a plain struct decode would accept this shape
        assert!(serde_json::from_slice::<Reading>(br#"[2.0, "Normal"]"#).is_ok());
        assert!(decode_entity::<Reading>("test", br#"[2.0, "Normal"]"#).is_err());
    }

    #[test]
    fn single_entity_rejects_non_objects() {
        for raw in [&b"[]"[..], b"null", b"3", br#""Normal""#] {
            assert!(
                matches!(decode_entity::<Reading>("system", raw), Err(CollectorError::Decode { .. })),
                "{:?}",
                String::from_utf8_lossy(raw)
            );
        }
        let r: Reading = decode_entity("system", br#"{"current": 4}"#).unwrap();
        assert_eq!(r.current, 4.0);
    }

    #[test]
    fn non_ascii_input_is_lowercased_not_matched() {
        assert_eq!(status_value("NÖRMAL"), 0.0);
        assert_eq!(state_value("ÖN"), 0.0);
        // U+0130 lowercases to "i" plus a combining dot, so it is not "inductive"
        assert_eq!(Reactance::from_device("\u{130}NDUCTIVE"), Reactance::Unknown);
        assert_eq!(DisplayOrientation::from_device("AUTO (NÖRMAL)"), DisplayOrientation::Unknown);
    }

    #[test]
    fn type_mismatch_is_a_decode_error() {
        let err = decode_payload::<Reading>("test", br#"{"current": "high"}"#).unwrap_err();
        assert!(matches!(err, CollectorError::Decode { ref category, .. } if category == "test"));
    }
}
