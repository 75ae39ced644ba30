//! Configuration module for container_probe.
//!
//! This module provides centralized configuration loading from environment variables.
//!
//! # Example
//!
//! ```rust,ignore
//! use container_probe::config::Config;
//!
//! let config = Config::from_env()?;
//! let probe = config.probe.probe();
//! println!("In container: {:?}", probe.in_container());
//! ```

mod error;
mod logging;
mod parse;
mod probe;

pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use probe::ProbeConfig;

/// Complete application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Probe configuration.
    pub probe: ProbeConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            probe: ProbeConfig::from_env()?,
            logging: LoggingConfig::from_env()?,
        })
    }

    /// Print configuration summary to log.
    pub fn log_summary(&self) {
        use tracing::debug;

        debug!("Configuration loaded:");
        debug!("  Host root: {}", self.probe.host_root.display());
        debug!("  Log filter: {}", self.logging.filter);
        debug!("  Log format: {:?}", self.logging.format);
    }
}

/// Serializes tests that mutate process environment variables.
#[cfg(test)]
pub(crate) static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        std::env::remove_var("PROBE_HOST_ROOT");
        std::env::remove_var("SERVICE_NAME");
        std::env::remove_var("LOG_FORMAT");

        let config = Config::from_env().expect("Should load config");

        assert_eq!(config.logging.service_name, "container_probe");
        assert_eq!(config.logging.format, LogFormat::Json);
    }
}
