//! servertech-exporter: Prometheus exporter for ServerTech PDUs
//!
//! The exporter polls the JAWS monitoring API of a ServerTech power
//! distribution unit on demand and republishes its readings as Prometheus
//! metrics. Each HTTP scrape names its device through query parameters, so
//! one exporter instance can serve any number of PDUs.
//!
//! ## Modules
//!
//! * `config`: Configuration structures, loading, validation, and defaults.
//!   Supports TOML configuration files with validation via the `validator` crate.
//!
//! * `core`: Core runtime components:
//!   - Metric model and sinks
//!   - Category collectors and their registry
//!   - Device HTTP transport
//!   - Scrape orchestration and Prometheus exposition
//!
//! * `logger`: Centralized logging initialization using `tracing`.
//!   Supports console output in multiple formats (compact, pretty, JSON)
//!   and optional systemd journald integration.
//!
//! * `server`: The axum HTTP front end.
//!
//! ## Features
//!
//! Every device category is a cargo feature (`collector-branches`,
//! `collector-cords`, …); `all-collectors` (default) enables them all.

pub mod config;
pub mod core;
pub mod logger;
pub mod server;
