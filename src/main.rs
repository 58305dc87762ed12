use std::{
    process,
    sync::{Arc, OnceLock},
};

use servertech_exporter::{
    config::Config,
    core::{
        collectors::registry::{CollectorRegistry, Collectors},
        exporter::Exporter,
        fetch::HttpFetcher,
    },
    logger::LoggerManager,
    print_error, server,
};
use tracing::{debug, error, info};

static CONFIG: OnceLock<Config> = OnceLock::new();

pub fn config() -> &'static Config {
    CONFIG.get_or_init(|| {
        Config::new().unwrap_or_else(|e| {
            print_error!("{}", e);
            process::exit(1);
        })
    })
}

fn log_collectors_table(enabled: Vec<&str>, available: Vec<&'static str>) {
    use std::collections::BTreeSet;

    let enabled_set: BTreeSet<&str> = enabled.into_iter().collect();
    let available_set: BTreeSet<&str> = available.into_iter().collect();

    let name_width = available_set
        .iter()
        .map(|s| s.len())
        .max()
        .unwrap_or(10)
        .max("Collector".len());

    info!("{:<width$} | Status", "Collector", width = name_width);
    info!("{}-+-{}", "-".repeat(name_width), "-".repeat(12));

    for name in available_set {
        let status = if enabled_set.contains(name) {
            "ENABLED"
        } else {
            "DISABLED"
        };
        info!("{:<width$} | {}", name, status, width = name_width);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = config();
    let logger_manager = LoggerManager::new(cfg.logger.clone()).unwrap_or_else(|e| {
        print_error!("Failed to setup Log Manager: {}", e);
        process::exit(1);
    });
    logger_manager.init().unwrap_or_else(|e| {
        print_error!("Failed to init Log Manager: {}", e);
        process::exit(1);
    });
    info!(
        "Starting servertech-exporter version {}...",
        env!("CARGO_PKG_VERSION")
    );
    info!("Log level: {}", cfg.logger.level);
    debug!("{:#?}", cfg.device);

    let mut registry = CollectorRegistry::new();
    registry.apply_config(&cfg.collectors).unwrap_or_else(|e| {
        error!("Invalid collector configuration: {}", e);
        process::exit(1);
    });
    log_collectors_table(registry.enabled_names(), Collectors::list());

    let fetcher = HttpFetcher::new(&cfg.device).unwrap_or_else(|e| {
        error!("Failed to build device HTTP client: {}", e);
        process::exit(1);
    });

    let exporter = Arc::new(Exporter::new(Arc::new(registry), Arc::new(fetcher)));

    server::serve(&cfg.web, exporter).await?;

    info!("Shutdown complete");
    Ok(())
}
