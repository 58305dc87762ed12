use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc,
    },
};

use once_cell::sync::Lazy;
use tracing::debug;

use super::{
    error::CollectorError,
    traits::CategoryMapper,
    types::{CollectorOutcome, CollectorResult},
};
use crate::{
    config::collectors::{CollectorsConfig, UnitSequenceSource},
    core::{
        fetch::{Fetcher, Target},
        metrics::MetricSink,
    },
};

/// Settings passed to mapper factories when a collector is instantiated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MapperOptions {
    pub unit_sequence_source: UnitSequenceSource,
}

/// Builds a fresh mapper for one scrape.
pub type MapperFactory = fn(&MapperOptions) -> Arc<dyn CategoryMapper>;

/// Metadata for a single collector that will be submitted to the global inventory.
/// Each collector provides a name, its default enable state and a factory.
pub struct CollectorMeta {
    pub name: &'static str,
    pub enabled_by_default: bool,
    pub factory: MapperFactory,
}

// Tell the `inventory` crate to collect all submitted `CollectorMeta` values.
inventory::collect!(CollectorMeta);

struct RegistryEntry {
    enabled_by_default: bool,
    enabled: AtomicBool,
    errors: Arc<AtomicU64>,
    factory: MapperFactory,
}

/// A collector instantiated for one scrape, bound to its category's
/// cumulative error counter.
#[derive(Clone)]
pub struct EnabledCollector {
    name: &'static str,
    mapper: Arc<dyn CategoryMapper>,
    errors: Arc<AtomicU64>,
}

impl EnabledCollector {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Current value of this category's cumulative error counter.
    pub fn total_errors(&self) -> f64 {
        self.errors.load(Ordering::Relaxed) as f64
    }

    /// Counts one failed run and returns the new cumulative total.
    pub fn record_error(&self) -> f64 {
        (self.errors.fetch_add(1, Ordering::Relaxed) + 1) as f64
    }

    /// Fetches the category, maps it and forwards the emissions to `sink`.
    ///
    /// Emissions reach the sink only when both fetch and mapping succeed, so a
    /// failed category never leaves a partial set of samples behind.
    pub async fn get(
        &self,
        fetcher: &dyn Fetcher,
        target: &Target,
        sink: &dyn MetricSink,
    ) -> CollectorOutcome {
        match self.fetch_and_map(fetcher, target).await {
            Ok(emissions) => {
                debug!(
                    collector = self.name,
                    emissions = emissions.len(),
                    "Mapped category"
                );
                sink.emit_all(emissions);
                CollectorOutcome {
                    total_errors: self.total_errors(),
                    result: Ok(()),
                }
            }
            Err(e) => CollectorOutcome {
                total_errors: self.record_error(),
                result: Err(e),
            },
        }
    }

    async fn fetch_and_map(
        &self,
        fetcher: &dyn Fetcher,
        target: &Target,
    ) -> CollectorResult<Vec<crate::core::metrics::MetricEmission>> {
        let raw = fetcher
            .fetch(target, self.mapper.path())
            .await
            .map_err(|source| CollectorError::Fetch {
                category: self.name.to_string(),
                source,
            })?;
        self.mapper.map(&raw)
    }
}

/// The table of every known category, its enable switch and its error counter.
///
/// Entries are registered once at startup; during scrapes the registry is only
/// read, apart from the atomic switches and counters.
pub struct CollectorRegistry {
    entries: BTreeMap<&'static str, RegistryEntry>,
    options: MapperOptions,
}

impl CollectorRegistry {
    /// Constructs a new registry by iterating over all submitted `CollectorMeta`
    /// entries (via the `inventory` crate). Error counters start at zero.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        for meta in inventory::iter::<CollectorMeta> {
            registry.register(meta.name, meta.enabled_by_default, meta.factory);
        }
        registry
    }

    /// A registry without any category, for tests and custom wiring.
    pub fn empty() -> Self {
        CollectorRegistry {
            entries: BTreeMap::new(),
            options: MapperOptions::default(),
        }
    }

    /// Registers a category. A second registration under the same name
    /// replaces the first one, including its counter.
    pub fn register(&mut self, name: &'static str, enabled_by_default: bool, factory: MapperFactory) {
        self.entries.insert(
            name,
            RegistryEntry {
                enabled_by_default,
                enabled: AtomicBool::new(enabled_by_default),
                errors: Arc::new(AtomicU64::new(0)),
                factory,
            },
        );
    }

    /// Applies the configured enable overrides and mapper options.
    ///
    /// Categories absent from the configuration keep their default state.
    pub fn apply_config(&mut self, config: &CollectorsConfig) -> CollectorResult<()> {
        for (name, enabled) in &config.enabled {
            self.set_enabled(name, *enabled)?;
        }
        self.options = MapperOptions {
            unit_sequence_source: config.unit_sequence_source,
        };
        Ok(())
    }

    /// Flips a category's switch. Takes effect on the next scrape.
    pub fn set_enabled(&self, name: &str, enabled: bool) -> CollectorResult<()> {
        let entry = self
            .entries
            .get(name)
            .ok_or_else(|| CollectorError::CollectorNotFound(name.to_string()))?;
        entry.enabled.store(enabled, Ordering::Relaxed);
        Ok(())
    }

    pub fn is_enabled(&self, name: &str) -> Option<bool> {
        self.entries
            .get(name)
            .map(|e| e.enabled.load(Ordering::Relaxed))
    }

    pub fn is_enabled_by_default(&self, name: &str) -> Option<bool> {
        self.entries.get(name).map(|e| e.enabled_by_default)
    }

    /// Cumulative error count of a category.
    pub fn error_count(&self, name: &str) -> Option<u64> {
        self.entries
            .get(name)
            .map(|e| e.errors.load(Ordering::Relaxed))
    }

    /// Instantiates every category whose switch is on, in name order.
    pub fn build_enabled(&self) -> Vec<EnabledCollector> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.enabled.load(Ordering::Relaxed))
            .map(|(name, entry)| EnabledCollector {
                name: *name,
                mapper: (entry.factory)(&self.options),
                errors: entry.errors.clone(),
            })
            .collect()
    }

    /// Returns the names of all registered categories, sorted.
    pub fn list_names(&self) -> Vec<&'static str> {
        self.entries.keys().copied().collect()
    }

    /// Names of the categories currently switched on, sorted.
    pub fn enabled_names(&self) -> Vec<&'static str> {
        self.entries
            .iter()
            .filter(|(_, e)| e.enabled.load(Ordering::Relaxed))
            .map(|(name, _)| *name)
            .collect()
    }

    /// Checks whether a collector with the given name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of registered collectors.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no collectors are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for CollectorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Names compiled into this binary, collected lazily from the inventory.
static AVAILABLE: Lazy<Vec<&'static str>> = Lazy::new(|| {
    let mut names: Vec<&'static str> = inventory::iter::<CollectorMeta>
        .into_iter()
        .map(|meta| meta.name)
        .collect();
    names.sort_unstable();
    names.dedup();
    names
});

/// Static view of the categories compiled into this binary.
pub struct Collectors;

impl Collectors {
    pub fn list() -> Vec<&'static str> {
        AVAILABLE.clone()
    }

    pub fn exists(name: &str) -> bool {
        AVAILABLE.contains(&name)
    }

    pub fn count() -> usize {
        AVAILABLE.len()
    }
}

/// Macro used by category implementations to register themselves
/// with the global inventory at compile time.
///
/// The three-argument form builds the mapper with `Default`; the four-argument
/// form takes a constructor `fn(&MapperOptions) -> Mapper`.
#[macro_export]
macro_rules! register_collector {
    ($mapper:ty, $name:expr, $enabled:expr) => {
        $crate::register_collector!($mapper, $name, $enabled, |_| <$mapper>::default());
    };
    ($mapper:ty, $name:expr, $enabled:expr, $ctor:expr) => {
        inventory::submit! {
            $crate::core::collectors::registry::CollectorMeta {
                name: $name,
                enabled_by_default: $enabled,
                factory: |options| {
                    let ctor: fn(&$crate::core::collectors::registry::MapperOptions) -> $mapper = $ctor;
                    std::sync::Arc::new(ctor(options))
                },
            }
        }
    };
}
