use super::error::CollectorError;

/// A convenient type alias for results returned by collectors.
///
/// Throughout the collector system, operations that can fail (fetching a
/// category from the device, decoding its JSON, parsing derived values) return
/// a `Result` where the error type is always our domain-specific `CollectorError`.
pub type CollectorResult<T> = std::result::Result<T, CollectorError>;

/// What a single collector run reports back to the orchestrator.
#[derive(Debug)]
pub struct CollectorOutcome {
    /// Errors accumulated by this category over the lifetime of the registry,
    /// including the current run.
    pub total_errors: f64,
    pub result: CollectorResult<()>,
}

impl CollectorOutcome {
    pub fn is_up(&self) -> bool {
        self.result.is_ok()
    }
}
