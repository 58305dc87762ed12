//! Normalized metric model shared by every category mapper.
//!
//! Mappers never talk to a metrics library directly. They produce
//! [`MetricEmission`] values that reference a static [`MetricDescriptor`],
//! and the orchestrator hands those to a [`MetricSink`]. Exposition
//! (Prometheus text format) lives in [`crate::core::exposition`].

use std::sync::Mutex;

/// Namespace prepended to every metric this exporter produces.
pub const NAMESPACE: &str = "servertech";

/// Label appended to status metrics to tell the reported sub-status apart.
pub const STATUS_TYPE_LABEL: &str = "status_type";

/// Identity of a metric family.
///
/// Descriptors are declared as `static` items and shared by every scrape.
#[derive(Debug, PartialEq, Eq)]
pub struct MetricDescriptor {
    pub namespace: &'static str,
    pub subsystem: &'static str,
    pub name: &'static str,
    pub help: &'static str,
    pub labels: &'static [&'static str],
}

impl MetricDescriptor {
    /// Builds a descriptor in the exporter namespace.
    pub const fn new(
        subsystem: &'static str,
        name: &'static str,
        help: &'static str,
        labels: &'static [&'static str],
    ) -> Self {
        Self {
            namespace: NAMESPACE,
            subsystem,
            name,
            help,
            labels,
        }
    }

    /// Fully qualified name, e.g. `servertech_cords_watts`.
    ///
    /// Empty parts are skipped so meta metrics without a subsystem render as
    /// `servertech_scrapes_total`.
    pub fn fq_name(&self) -> String {
        [self.namespace, self.subsystem, self.name]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join("_")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    Gauge,
    Counter,
}

/// A single sample produced during mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricEmission {
    pub descriptor: &'static MetricDescriptor,
    pub kind: MetricKind,
    pub value: f64,
    pub labels: Vec<String>,
}

impl MetricEmission {
    pub fn gauge(descriptor: &'static MetricDescriptor, value: f64, labels: Vec<String>) -> Self {
        Self::new(descriptor, MetricKind::Gauge, value, labels)
    }

    pub fn counter(descriptor: &'static MetricDescriptor, value: f64, labels: Vec<String>) -> Self {
        Self::new(descriptor, MetricKind::Counter, value, labels)
    }

    fn new(
        descriptor: &'static MetricDescriptor,
        kind: MetricKind,
        value: f64,
        labels: Vec<String>,
    ) -> Self {
        debug_assert_eq!(
            descriptor.labels.len(),
            labels.len(),
            "label arity mismatch for {}",
            descriptor.fq_name()
        );
        Self {
            descriptor,
            kind,
            value,
            labels,
        }
    }

    /// Looks up a label value by its name on the descriptor.
    pub fn label(&self, name: &str) -> Option<&str> {
        self.descriptor
            .labels
            .iter()
            .position(|l| *l == name)
            .and_then(|idx| self.labels.get(idx))
            .map(String::as_str)
    }
}

/// Destination for emissions.
///
/// Several collector tasks write into the same sink concurrently, so
/// implementations must serialize appends internally.
pub trait MetricSink: Send + Sync {
    fn emit(&self, emission: MetricEmission);

    fn emit_all(&self, emissions: Vec<MetricEmission>) {
        for emission in emissions {
            self.emit(emission);
        }
    }
}

/// Sink that keeps every emission in memory, in arrival order.
#[derive(Debug, Default)]
pub struct MemorySink {
    emissions: Mutex<Vec<MetricEmission>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of everything emitted so far.
    pub fn snapshot(&self) -> Vec<MetricEmission> {
        self.emissions
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Emissions whose descriptor has the given fully qualified name.
    pub fn by_name(&self, fq_name: &str) -> Vec<MetricEmission> {
        self.snapshot()
            .into_iter()
            .filter(|e| e.descriptor.fq_name() == fq_name)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MetricSink for MemorySink {
    fn emit(&self, emission: MetricEmission) {
        match self.emissions.lock() {
            Ok(mut guard) => guard.push(emission),
            Err(poisoned) => poisoned.into_inner().push(emission),
        }
    }

    fn emit_all(&self, emissions: Vec<MetricEmission>) {
        match self.emissions.lock() {
            Ok(mut guard) => guard.extend(emissions),
            Err(poisoned) => poisoned.into_inner().extend(emissions),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    static TEST_DESC: MetricDescriptor =
        MetricDescriptor::new("cords", "watts", "test help", &["id", "name"]);
    static META_DESC: MetricDescriptor =
        MetricDescriptor::new("", "scrapes_total", "meta", &[]);

    #[test]
    fn fq_name_joins_parts() {
        assert_eq!(TEST_DESC.fq_name(), "servertech_cords_watts");
    }

    #[test]
    fn fq_name_skips_empty_subsystem() {
        assert_eq!(META_DESC.fq_name(), "servertech_scrapes_total");
    }

    #[test]
    fn label_lookup_by_name() {
        let e = MetricEmission::gauge(&TEST_DESC, 1.0, vec!["AA".into(), "Master".into()]);
        assert_eq!(e.label("name"), Some("Master"));
        assert_eq!(e.label("missing"), None);
        assert_eq!(e.kind, MetricKind::Gauge);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "label arity mismatch")]
    fn arity_mismatch_is_caught_in_debug() {
        let _ = MetricEmission::counter(&TEST_DESC, 1.0, vec!["only-one".into()]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn memory_sink_tolerates_concurrent_writers() {
        let sink = Arc::new(MemorySink::new());
        let mut tasks = Vec::new();
        for worker in 0..8 {
            let sink = sink.clone();
            tasks.push(tokio::spawn(async move {
                let batch = (0..50)
                    .map(|i| {
                        MetricEmission::gauge(
                            &TEST_DESC,
                            f64::from(i),
                            vec![worker.to_string(), i.to_string()],
                        )
                    })
                    .collect();
                sink.emit_all(batch);
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(sink.len(), 400);
        assert!(sink.snapshot().iter().all(|e| e.labels.len() == 2));
    }
}
