use thiserror::Error;

use crate::core::fetch::FetchError;

/// Custom error type for the collector system.
/// Uses `thiserror` for clean, automatic derivation of `Debug`, `Display`, and `Error`
/// traits, with context-rich error messages.
///
/// Every variant is fatal for the category that raised it during the current
/// scrape only; the orchestrator turns it into `collector_up = 0` and a bump
/// of that category's error counter.
#[derive(Error, Debug)]
pub enum CollectorError {
    /// The device could not be queried (connection, timeout, non-200 status).
    #[error("cannot get {category}: {source}")]
    Fetch {
        category: String,
        #[source]
        source: FetchError,
    },

    /// The payload was not valid JSON or did not match the category shape.
    #[error("cannot unmarshal {category} json: {source}")]
    Decode {
        category: String,
        #[source]
        source: serde_json::Error,
    },

    /// Encountered a parsing error while extracting a metric.
    /// Provides the metric name, where it was found, and a reason for the failure.
    #[error("Failed to parse {metric} from {location}: {reason}")]
    ParseError {
        metric: String,
        location: String,
        reason: String,
    },

    /// Data was found but did not conform to the expected format.
    #[error("Invalid format in {location}: {reason}")]
    InvalidFormat { location: String, reason: String },

    /// Tried to access a collector by name, but it was not registered.
    #[error("Collector not found for: {0}")]
    CollectorNotFound(String),

    /// The spawned collector task ended without reporting (panic or cancellation).
    #[error("Collector task for {name} did not complete: {reason}")]
    TaskFailed { name: String, reason: String },
}
