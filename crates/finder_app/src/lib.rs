//! Finder service: HTTP boundary around the search core.
pub mod config;
pub mod render;
pub mod routes;
pub mod server;

use config::{AppConfig, ConfigError};

/// Sets up the global logger from the service configuration.
pub fn init_logging(config: &AppConfig) -> Result<(), ConfigError> {
    let level = config.level_filter()?;
    engine_logging::initialize(level, config.log_destination.into(), &config.log_file);
    Ok(())
}
