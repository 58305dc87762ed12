//! Scrape engine: metric model, category collectors, device transport,
//! orchestration and exposition.

pub mod collectors;
pub mod exporter;
pub mod exposition;
pub mod fetch;
pub mod metrics;
