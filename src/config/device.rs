//! Settings for talking to the PDU's HTTP API.

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct DeviceConfig {
    /// Per-request timeout in seconds, applied to every category fetch.
    #[validate(range(min = 1, max = 300, message = "Timeout must be between 1 and 300 seconds"))]
    pub timeout_secs: u64,

    /// Verify the PDU's TLS certificate. Most PDUs ship self-signed
    /// certificates; turning this off must be an explicit choice.
    pub verify_tls: bool,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 20,
            verify_tls: true,
        }
    }
}
