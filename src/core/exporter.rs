//! Scrape orchestration.
//!
//! The `Exporter` fans one scrape out across every enabled collector, waits
//! for all of them and records per-collector duration, error and up metrics
//! alongside a process-wide scrape counter. A failing category only ever
//! affects its own metrics.

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use tokio::time::Instant;
use tracing::{debug, error};

use super::{
    collectors::{
        error::CollectorError,
        registry::{CollectorRegistry, EnabledCollector},
        types::CollectorOutcome,
    },
    fetch::{Fetcher, Target},
    metrics::{MetricDescriptor, MetricEmission, MetricSink},
};

const COLLECTOR_LABEL: &[&str] = &["collector"];

pub static SCRAPES_TOTAL: MetricDescriptor = MetricDescriptor::new(
    "",
    "scrapes_total",
    "Total number of times servertech_exporter has been scraped.",
    &[],
);
pub static SCRAPE_ERRORS_TOTAL: MetricDescriptor = MetricDescriptor::new(
    "",
    "scrape_errors_total",
    "Total number of errors from a collector.",
    COLLECTOR_LABEL,
);
pub static SCRAPE_DURATION_SECONDS: MetricDescriptor = MetricDescriptor::new(
    "",
    "scrape_duration_seconds",
    "Time it took for a collector's scrape to complete.",
    COLLECTOR_LABEL,
);
pub static COLLECTOR_UP: MetricDescriptor = MetricDescriptor::new(
    "",
    "collector_up",
    "Whether the collector's last scrape was successful (1 = successful, 0 = unsuccessful).",
    COLLECTOR_LABEL,
);

/// How one collector fared during a scrape.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectorReport {
    pub name: &'static str,
    pub duration: Duration,
    pub total_errors: f64,
    pub up: bool,
}

/// Runs scrapes against a device using the collectors enabled in `registry`.
///
/// One `Exporter` is shared by every request; the scrape counter and the
/// registry's error counters therefore accumulate over the process lifetime.
pub struct Exporter {
    registry: Arc<CollectorRegistry>,
    fetcher: Arc<dyn Fetcher>,
    scrapes: AtomicU64,
}

impl Exporter {
    pub fn new(registry: Arc<CollectorRegistry>, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            registry,
            fetcher,
            scrapes: AtomicU64::new(0),
        }
    }

    /// Number of scrapes started so far.
    pub fn scrape_count(&self) -> u64 {
        self.scrapes.load(Ordering::Relaxed)
    }

    /// Performs one scrape of `target`, writing everything into `sink`.
    ///
    /// Collectors run concurrently, so the wall time is bounded by the
    /// slowest category rather than the sum. The call returns only after
    /// every collector has finished; it never fails as a whole.
    pub async fn scrape(&self, target: &Target, sink: Arc<dyn MetricSink>) -> Vec<CollectorReport> {
        let count = self.scrapes.fetch_add(1, Ordering::Relaxed) + 1;
        sink.emit(MetricEmission::counter(&SCRAPES_TOTAL, count as f64, Vec::new()));

        let collectors = self.registry.build_enabled();
        debug!(
            "Scraping {:?} with {} collector(s)",
            target.host,
            collectors.len()
        );

        // Spawn tasks for each enabled collector
        let tasks: Vec<_> = collectors
            .into_iter()
            .map(|collector| {
                let fetcher = Arc::clone(&self.fetcher);
                let sink = Arc::clone(&sink);
                let target = target.clone();
                let task_collector = collector.clone();
                let started = Instant::now();
                let handle = tokio::spawn(async move {
                    let outcome = task_collector
                        .get(fetcher.as_ref(), &target, sink.as_ref())
                        .await;
                    (outcome, started.elapsed())
                });
                (collector, started, handle)
            })
            .collect();

        // Wait for all collection tasks to complete
        let mut reports = Vec::with_capacity(tasks.len());
        for (collector, started, handle) in tasks {
            // A failed task has no elapsed time of its own; the join is the
            // closest bound available.
            let (outcome, elapsed) = match handle.await {
                Ok(finished) => finished,
                Err(join_err) => (
                    CollectorOutcome {
                        total_errors: collector.record_error(),
                        result: Err(CollectorError::TaskFailed {
                            name: collector.name().to_string(),
                            reason: join_err.to_string(),
                        }),
                    },
                    started.elapsed(),
                ),
            };
            let report = finish_collector(&collector, elapsed, outcome, sink.as_ref());
            reports.push(report);
        }

        reports
    }
}

fn finish_collector(
    collector: &EnabledCollector,
    duration: Duration,
    outcome: CollectorOutcome,
    sink: &dyn MetricSink,
) -> CollectorReport {
    let name = collector.name();
    let labels = vec![name.to_string()];
    let up = outcome.is_up();

    if let Err(e) = &outcome.result {
        error!("collector {:?} scrape failed: {}", name, e);
    }

    sink.emit_all(vec![
        MetricEmission::gauge(&SCRAPE_DURATION_SECONDS, duration.as_secs_f64(), labels.clone()),
        MetricEmission::gauge(&SCRAPE_ERRORS_TOTAL, outcome.total_errors, labels.clone()),
        MetricEmission::gauge(&COLLECTOR_UP, if up { 1.0 } else { 0.0 }, labels),
    ]);

    CollectorReport {
        name,
        duration,
        total_errors: outcome.total_errors,
        up,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use bytes::Bytes;
    use tracing_test::traced_test;

    use super::*;
    use crate::core::{
        collectors::{
            encoding::decode_payload, registry::MapperOptions, traits::CategoryMapper,
            types::CollectorResult,
        },
        fetch::FetchError,
        metrics::MemorySink,
    };

    static TEST_DESC: MetricDescriptor = MetricDescriptor::new("test", "value", "help", &["id"]);

    struct ListMapper(&'static str);

    impl CategoryMapper for ListMapper {
        fn category(&self) -> &'static str {
            self.0
        }

        fn map(&self, raw: &[u8]) -> CollectorResult<Vec<MetricEmission>> {
            let values: Vec<f64> = decode_payload(self.0, raw)?;
            Ok(values
                .into_iter()
                .enumerate()
                .map(|(i, v)| MetricEmission::gauge(&TEST_DESC, v, vec![i.to_string()]))
                .collect())
        }
    }

    struct PanickingMapper;

    impl CategoryMapper for PanickingMapper {
        fn category(&self) -> &'static str {
            "explode"
        }

        fn map(&self, _raw: &[u8]) -> CollectorResult<Vec<MetricEmission>> {
            panic!("mapper blew up");
        }
    }

    /// Serves canned bodies per path, optionally after a delay.
    #[derive(Default)]
    struct ScriptedFetcher {
        bodies: HashMap<&'static str, Result<&'static str, u16>>,
        delays: HashMap<&'static str, Duration>,
    }

    impl ScriptedFetcher {
        fn body(mut self, path: &'static str, body: &'static str) -> Self {
            self.bodies.insert(path, Ok(body));
            self
        }

        fn status(mut self, path: &'static str, code: u16) -> Self {
            self.bodies.insert(path, Err(code));
            self
        }

        fn delay(mut self, path: &'static str, delay: Duration) -> Self {
            self.delays.insert(path, delay);
            self
        }
    }

    #[async_trait::async_trait]
    impl Fetcher for ScriptedFetcher {
        async fn fetch(&self, _target: &Target, path: &str) -> Result<Bytes, FetchError> {
            if let Some(delay) = self.delays.get(path) {
                tokio::time::sleep(*delay).await;
            }
            match self.bodies.get(path) {
                Some(Ok(body)) => Ok(Bytes::from_static(body.as_bytes())),
                Some(Err(code)) => Err(FetchError::Status(*code)),
                None => Err(FetchError::Status(404)),
            }
        }
    }

    fn alpha(_: &MapperOptions) -> Arc<dyn CategoryMapper> {
        Arc::new(ListMapper("alpha"))
    }
    fn beta(_: &MapperOptions) -> Arc<dyn CategoryMapper> {
        Arc::new(ListMapper("beta"))
    }
    fn gamma(_: &MapperOptions) -> Arc<dyn CategoryMapper> {
        Arc::new(ListMapper("gamma"))
    }
    fn explode(_: &MapperOptions) -> Arc<dyn CategoryMapper> {
        Arc::new(PanickingMapper)
    }

    fn exporter(registry: CollectorRegistry, fetcher: ScriptedFetcher) -> Exporter {
        Exporter::new(Arc::new(registry), Arc::new(fetcher))
    }

    fn target() -> Target {
        Target::new("pdu.example", "admn", "admn")
    }

    fn meta_value(sink: &MemorySink, fq_name: &str, collector: &str) -> f64 {
        sink.by_name(fq_name)
            .into_iter()
            .find(|e| e.label("collector") == Some(collector))
            .map(|e| e.value)
            .unwrap()
    }

    #[tokio::test]
    async fn zero_collectors_emit_only_scrape_counter() {
        let exporter = exporter(CollectorRegistry::empty(), ScriptedFetcher::default());
        let sink = Arc::new(MemorySink::new());

        let reports = exporter.scrape(&target(), sink.clone()).await;

        assert!(reports.is_empty());
        let all = sink.snapshot();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].descriptor.fq_name(), "servertech_scrapes_total");
        assert_eq!(all[0].value, 1.0);
    }

    #[tokio::test]
    async fn scrape_counter_is_process_wide() {
        let exporter = exporter(CollectorRegistry::empty(), ScriptedFetcher::default());

        for _ in 0..3 {
            exporter.scrape(&target(), Arc::new(MemorySink::new())).await;
        }
        let sink = Arc::new(MemorySink::new());
        exporter.scrape(&target(), sink.clone()).await;

        assert_eq!(exporter.scrape_count(), 4);
        assert_eq!(sink.by_name("servertech_scrapes_total")[0].value, 4.0);
    }

    #[tokio::test]
    #[traced_test]
    async fn transport_error_is_isolated() {
        let mut registry = CollectorRegistry::empty();
        registry.register("alpha", true, alpha);
        registry.register("beta", true, beta);
        let fetcher = ScriptedFetcher::default()
            .body("alpha", "[1.5, 2.5]")
            .status("beta", 401);
        let exporter = exporter(registry, fetcher);

        let sink = Arc::new(MemorySink::new());
        exporter.scrape(&target(), sink.clone()).await;

        assert_eq!(sink.by_name("servertech_test_value").len(), 2);
        assert_eq!(meta_value(&sink, "servertech_collector_up", "alpha"), 1.0);
        assert_eq!(meta_value(&sink, "servertech_collector_up", "beta"), 0.0);
        assert_eq!(meta_value(&sink, "servertech_scrape_errors_total", "beta"), 1.0);
        assert_eq!(meta_value(&sink, "servertech_scrape_errors_total", "alpha"), 0.0);
        assert!(logs_contain("scrape failed"));
        assert!(logs_contain("401"));
    }

    #[tokio::test]
    async fn error_counter_accumulates_across_scrapes() {
        let mut registry = CollectorRegistry::empty();
        registry.register("beta", true, beta);
        let exporter = exporter(registry, ScriptedFetcher::default().body("beta", "{}"));

        exporter.scrape(&target(), Arc::new(MemorySink::new())).await;
        let sink = Arc::new(MemorySink::new());
        let reports = exporter.scrape(&target(), sink.clone()).await;

        assert_eq!(reports[0].total_errors, 2.0);
        assert!(!reports[0].up);
        assert_eq!(meta_value(&sink, "servertech_scrape_errors_total", "beta"), 2.0);
        // decode failure leaves no partial samples behind
        assert!(sink.by_name("servertech_test_value").is_empty());
    }

    #[tokio::test]
    async fn empty_array_is_up_with_no_samples() {
        let mut registry = CollectorRegistry::empty();
        registry.register("alpha", true, alpha);
        let exporter = exporter(registry, ScriptedFetcher::default().body("alpha", "[]"));

        let sink = Arc::new(MemorySink::new());
        exporter.scrape(&target(), sink.clone()).await;

        assert!(sink.by_name("servertech_test_value").is_empty());
        assert_eq!(meta_value(&sink, "servertech_collector_up", "alpha"), 1.0);
        assert_eq!(meta_value(&sink, "servertech_scrape_errors_total", "alpha"), 0.0);
    }

    #[tokio::test]
    async fn disabled_collectors_are_skipped() {
        let mut registry = CollectorRegistry::empty();
        registry.register("alpha", true, alpha);
        registry.register("beta", false, beta);
        let fetcher = ScriptedFetcher::default()
            .body("alpha", "[1]")
            .body("beta", "[1]");
        let exporter = exporter(registry, fetcher);

        let sink = Arc::new(MemorySink::new());
        let reports = exporter.scrape(&target(), sink.clone()).await;

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].name, "alpha");
        assert_eq!(sink.by_name("servertech_collector_up").len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn collectors_run_concurrently() {
        let mut registry = CollectorRegistry::empty();
        registry.register("alpha", true, alpha);
        registry.register("beta", true, beta);
        registry.register("gamma", true, gamma);
        let fetcher = ScriptedFetcher::default()
            .body("alpha", "[1]")
            .body("beta", "[2]")
            .body("gamma", "[3]")
            .delay("alpha", Duration::from_millis(100))
            .delay("beta", Duration::from_millis(200))
            .delay("gamma", Duration::from_millis(300));
        let exporter = exporter(registry, fetcher);

        let started = Instant::now();
        let reports = exporter.scrape(&target(), Arc::new(MemorySink::new())).await;
        let elapsed = started.elapsed();

        assert!(elapsed >= Duration::from_millis(300));
        assert!(elapsed < Duration::from_millis(600), "took {elapsed:?}");
        assert!(reports.iter().all(|r| r.up));

        let gamma = reports.iter().find(|r| r.name == "gamma").unwrap();
        assert!(gamma.duration >= Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn fast_collector_duration_ignores_slower_predecessor() {
        let mut registry = CollectorRegistry::empty();
        registry.register("alpha", true, alpha);
        registry.register("beta", true, beta);
        let fetcher = ScriptedFetcher::default()
            .body("alpha", "[1]")
            .body("beta", "[2]")
            .delay("alpha", Duration::from_millis(300))
            .delay("beta", Duration::from_millis(10));
        let exporter = exporter(registry, fetcher);

        let sink = Arc::new(MemorySink::new());
        let reports = exporter.scrape(&target(), sink.clone()).await;

        let alpha = reports.iter().find(|r| r.name == "alpha").unwrap();
        let beta = reports.iter().find(|r| r.name == "beta").unwrap();
        assert!(alpha.duration >= Duration::from_millis(300));
        assert!(beta.duration >= Duration::from_millis(10));
        assert!(beta.duration < Duration::from_millis(100), "beta took {:?}", beta.duration);
        let gauge = meta_value(&sink, "servertech_scrape_duration_seconds", "beta");
        assert!(gauge < 0.1, "beta gauge {gauge}");
    }

    #[tokio::test]
    #[traced_test]
    async fn panicking_collector_is_reported_down() {
        let mut registry = CollectorRegistry::empty();
        registry.register("alpha", true, alpha);
        registry.register("explode", true, explode);
        let fetcher = ScriptedFetcher::default()
            .body("alpha", "[7]")
            .body("explode", "[]");
        let exporter = exporter(registry, fetcher);

        let sink = Arc::new(MemorySink::new());
        let reports = exporter.scrape(&target(), sink.clone()).await;

        assert_eq!(reports.len(), 2);
        assert_eq!(meta_value(&sink, "servertech_collector_up", "explode"), 0.0);
        assert_eq!(meta_value(&sink, "servertech_scrape_errors_total", "explode"), 1.0);
        assert_eq!(meta_value(&sink, "servertech_collector_up", "alpha"), 1.0);
        assert_eq!(sink.by_name("servertech_test_value")[0].value, 7.0);
        assert!(logs_contain("did not complete"));
    }
}
