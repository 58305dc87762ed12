use super::types::CollectorResult;
use crate::core::metrics::MetricEmission;

/// The contract every device category implements.
///
/// A mapper owns the JSON shape of one entity collection exposed under
/// `/jaws/monitor/<path>` and turns a raw payload into metric emissions.
/// Mapping is pure: the same payload always yields the same emissions, and a
/// decode failure yields no emissions at all.
///
/// Mappers are stored as trait objects in the registry, hence the
/// `Send + Sync + 'static` bounds.
pub trait CategoryMapper: Send + Sync + 'static {
    /// Category name, used as metric subsystem and `collector` label.
    fn category(&self) -> &'static str;

    /// Path segment queried on the device. Defaults to the category name.
    fn path(&self) -> &'static str {
        self.category()
    }

    /// Decodes `raw` and produces the category's emissions in entity order.
    fn map(&self, raw: &[u8]) -> CollectorResult<Vec<MetricEmission>>;
}
