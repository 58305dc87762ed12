//! Configuration of the device categories scraped on each request.
//!
//! Every category is compiled in and registered with a default state; this
//! section only carries per-category overrides plus mapper options.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Which JSON field of a unit feeds the `unit_sequence` metric.
///
/// The JAWS payload carries both `display_orientation` and `unit_sequence`.
/// Earlier exporters derived the sequence code from the orientation string,
/// which only ever yields `Normal` or `Unknown`; `unit_sequence` reads the
/// dedicated field instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitSequenceSource {
    #[default]
    DisplayOrientation,
    UnitSequence,
}

/// Per-category switches and mapper options.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct CollectorsConfig {
    /// Overrides of the registered default, keyed by category name,
    /// e.g. `enabled = { units = false }`.
    #[validate(custom(function = "validate_collector_names"))]
    pub enabled: BTreeMap<String, bool>,

    pub unit_sequence_source: UnitSequenceSource,
}

fn validate_collector_names(enabled: &BTreeMap<String, bool>) -> Result<(), ValidationError> {
    match enabled.keys().find(|name| name.trim().is_empty()) {
        Some(_) => {
            let mut err = ValidationError::new("empty_collector_name");
            err.message = Some("Collector name must not be empty".into());
            Err(err)
        }
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_overrides_and_sequence_source() {
        let cfg: CollectorsConfig = toml::from_str(
            r#"
            unit_sequence_source = "unit_sequence"
            [enabled]
            units = false
            system = true
            "#,
        )
        .unwrap();

        assert_eq!(cfg.unit_sequence_source, UnitSequenceSource::UnitSequence);
        assert_eq!(cfg.enabled.get("units"), Some(&false));
        assert_eq!(cfg.enabled.get("system"), Some(&true));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn defaults_keep_orientation_source() {
        let cfg = CollectorsConfig::default();
        assert!(cfg.enabled.is_empty());
        assert_eq!(cfg.unit_sequence_source, UnitSequenceSource::DisplayOrientation);
    }

    #[test]
    fn empty_names_are_rejected() {
        let cfg = CollectorsConfig {
            enabled: [(" ".to_string(), true)].into_iter().collect(),
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }
}
