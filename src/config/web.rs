//! Listener settings for the metrics endpoint.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct WebConfig {
    /// Socket address to bind, e.g. `0.0.0.0:9778`.
    #[validate(length(min = 1, message = "Listen address must not be empty"))]
    pub listen_address: String,

    /// Path under which metrics are exposed.
    #[validate(custom(function = "validate_telemetry_path"))]
    pub telemetry_path: String,
}

fn validate_telemetry_path(path: &str) -> Result<(), ValidationError> {
    if path.starts_with('/') && path.len() > 1 {
        Ok(())
    } else {
        let mut err = ValidationError::new("invalid_telemetry_path");
        err.message = Some(format!("Telemetry path must start with '/': {}", path).into());
        Err(err)
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            listen_address: "0.0.0.0:9778".to_string(),
            telemetry_path: "/metrics".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(WebConfig::default().validate().is_ok());
    }

    #[test]
    fn relative_or_root_path_is_rejected() {
        for path in ["metrics", "/", ""] {
            let cfg = WebConfig {
                telemetry_path: path.to_string(),
                ..Default::default()
            };
            assert!(cfg.validate().is_err(), "{path:?}");
        }
    }
}
