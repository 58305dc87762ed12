//! Prometheus text exposition of a scrape.
//!
//! Every scrape writes into its own [`PrometheusSink`], which lazily creates
//! one `GaugeVec` or `CounterVec` per descriptor in a private
//! `prometheus::Registry` and renders it with the text encoder.

use std::{
    collections::HashMap,
    string::FromUtf8Error,
    sync::{Mutex, PoisonError},
};

use prometheus::{CounterVec, Encoder, GaugeVec, Opts, Registry, TextEncoder};
use thiserror::Error;
use tracing::warn;

use super::metrics::{MetricDescriptor, MetricEmission, MetricKind, MetricSink};

pub static BUILD_INFO: MetricDescriptor = MetricDescriptor::new(
    "exporter",
    "build_info",
    "A metric with a constant '1' value labeled by the version the exporter was built from.",
    &["version"],
);

/// Constant build information sample.
pub fn build_info() -> MetricEmission {
    MetricEmission::gauge(&BUILD_INFO, 1.0, vec![env!("CARGO_PKG_VERSION").to_string()])
}

#[derive(Error, Debug)]
pub enum ExpositionError {
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),

    #[error("exposition is not valid UTF-8: {0}")]
    Utf8(#[from] FromUtf8Error),
}

#[derive(Clone)]
enum Family {
    Gauge(GaugeVec),
    Counter(CounterVec),
}

/// Sink backed by a per-scrape Prometheus registry.
pub struct PrometheusSink {
    registry: Registry,
    families: Mutex<HashMap<String, Family>>,
}

impl PrometheusSink {
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
            families: Mutex::new(HashMap::new()),
        }
    }

    /// Content type of [`PrometheusSink::render`] output.
    pub fn content_type(&self) -> String {
        TextEncoder::new().format_type().to_string()
    }

    /// Encodes everything emitted so far in the text format.
    pub fn render(&self) -> Result<String, ExpositionError> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    fn family(&self, descriptor: &MetricDescriptor, kind: MetricKind) -> Result<Family, ExpositionError> {
        let fq_name = descriptor.fq_name();
        let mut families = self.families.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(family) = families.get(&fq_name) {
            return Ok(family.clone());
        }

        let opts = Opts::new(fq_name.clone(), descriptor.help);
        let family = match kind {
            MetricKind::Gauge => {
                let vec = GaugeVec::new(opts, descriptor.labels)?;
                self.registry.register(Box::new(vec.clone()))?;
                Family::Gauge(vec)
            }
            MetricKind::Counter => {
                let vec = CounterVec::new(opts, descriptor.labels)?;
                self.registry.register(Box::new(vec.clone()))?;
                Family::Counter(vec)
            }
        };
        families.insert(fq_name, family.clone());
        Ok(family)
    }

    fn record(&self, emission: &MetricEmission) -> Result<(), ExpositionError> {
        let labels: Vec<&str> = emission.labels.iter().map(String::as_str).collect();

        match (self.family(emission.descriptor, emission.kind)?, emission.kind) {
            (Family::Gauge(vec), MetricKind::Gauge) => {
                vec.get_metric_with_label_values(&labels)?.set(emission.value);
            }
            (Family::Counter(vec), MetricKind::Counter) => {
                vec.get_metric_with_label_values(&labels)?
                    .inc_by(emission.value.max(0.0));
            }
            _ => {
                return Err(ExpositionError::Prometheus(prometheus::Error::Msg(format!(
                    "{} already registered with a different type",
                    emission.descriptor.fq_name()
                ))))
            }
        }
        Ok(())
    }
}

impl Default for PrometheusSink {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricSink for PrometheusSink {
    fn emit(&self, emission: MetricEmission) {
        if let Err(e) = self.record(&emission) {
            warn!("Dropping sample {}: {}", emission.descriptor.fq_name(), e);
        }
    }
}
