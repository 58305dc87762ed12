//! Application configuration loading, validation, and management.
//!
//! The top-level [`Config`] aggregates logging, collector, device and web
//! settings. It is read from a TOML file once at startup and treated as
//! immutable afterwards.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use validator::Validate;

use self::{
    collectors::CollectorsConfig, device::DeviceConfig, logger::LoggerConfig, web::WebConfig,
};

pub mod collectors;
pub mod device;
pub mod logger;
pub mod web;

/// Environment variable pointing at the configuration file.
pub const CONFIG_ENV: &str = "SERVERTECH_EXPORTER_CONFIG";

/// Location checked when [`CONFIG_ENV`] is unset.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/servertech-exporter/config.toml";

/// Timestamped console output for use before the tracing subscriber exists.
#[macro_export]
macro_rules! print_info {
    ($($arg:tt)*) => {
        $crate::config::print_line(console::style("INFO").green(), format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! print_warn {
    ($($arg:tt)*) => {
        $crate::config::print_line(console::style("WARN").yellow(), format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! print_error {
    ($($arg:tt)*) => {
        $crate::config::print_line(console::style("ERROR").red(), format_args!($($arg)*))
    };
}

#[doc(hidden)]
pub fn print_line(level: console::StyledObject<&str>, args: std::fmt::Arguments<'_>) {
    let format = time::macros::format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:6]Z"
    );
    let now = time::OffsetDateTime::now_utc()
        .format(&format)
        .unwrap_or_default();
    println!("{}  {} {}", console::style(now).dim(), level, args);
}

/// Errors that can occur during configuration loading, parsing or validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error while reading configuration: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Parse error while reading configuration: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Top-level application configuration.
#[derive(Serialize, Deserialize, Debug, Validate, Clone, Default)]
#[serde(default)]
pub struct Config {
    #[validate(nested)]
    pub logger: LoggerConfig,

    #[validate(nested)]
    pub collectors: CollectorsConfig,

    #[validate(nested)]
    pub device: DeviceConfig,

    #[validate(nested)]
    pub web: WebConfig,
}

impl Config {
    /// Locates and loads the configuration file, or falls back to defaults
    /// when none exists.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if an existing file cannot be read, parsed, or
    /// validated, or if [`CONFIG_ENV`] names a missing file.
    pub fn new() -> Result<Self, ConfigError> {
        match Self::get_config_path()? {
            Some(path) => Self::load(&path),
            None => {
                print_warn!("No configuration file found, using built-in defaults");
                Ok(Config::default())
            }
        }
    }

    /// Priority:
    /// 1. `SERVERTECH_EXPORTER_CONFIG` environment variable
    /// 2. `/etc/servertech-exporter/config.toml`
    fn get_config_path() -> Result<Option<PathBuf>, ConfigError> {
        if let Ok(config_path) = std::env::var(CONFIG_ENV) {
            let path = PathBuf::from(config_path);
            if !path.exists() {
                return Err(ConfigError::Config(format!(
                    "{} points to a missing file: {}",
                    CONFIG_ENV,
                    path.display()
                )));
            }
            print_info!("Using config from {}: {}", CONFIG_ENV, path.display());
            return Ok(Some(path));
        }

        let fallback = Path::new(DEFAULT_CONFIG_PATH);
        if fallback.exists() {
            print_info!("Using default config path: {}", fallback.display());
            return Ok(Some(fallback.to_path_buf()));
        }

        Ok(None)
    }

    /// Loads and validates configuration from the specified path.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        print_info!("Loading configuration from: {}", path.display());

        let config_str = fs::read_to_string(path)?;
        let config = Self::parse(&config_str)?;

        print_info!("Successfully loaded config from: {}", path.display());
        Ok(config)
    }

    /// Parses and validates a TOML document.
    pub fn parse(content: &str) -> Result<Config, ConfigError> {
        let config: Config =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        config
            .validate()
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;

        Ok(config)
    }
}
