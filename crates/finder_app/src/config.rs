//! Service configuration, read from a RON file.
//!
//! Lookup order: the path in `FINDER_CONFIG`, then `./finder.ron` if it
//! exists, then built-in defaults. Every field is optional in the file.

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use engine_logging::LogDestination;
use finder_core::DEFAULT_MAX_URLS;
use finder_engine::FetchSettings;
use log::LevelFilter;
use serde::Deserialize;
use thiserror::Error;

pub const CONFIG_ENV: &str = "FINDER_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "finder.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse config {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("invalid log level {0:?}")]
    LogLevel(String),
    #[error("invalid listen address {0}")]
    Address(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogTarget {
    Terminal,
    File,
    Both,
}

impl From<LogTarget> for LogDestination {
    fn from(target: LogTarget) -> Self {
        match target {
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::File => LogDestination::File,
            LogTarget::Both => LogDestination::Both,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub max_body_bytes: usize,
    pub max_urls: usize,
    pub shutdown_grace_secs: u64,
    pub log_level: String,
    pub log_destination: LogTarget,
    pub log_file: PathBuf,
    pub fetch: FetchConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            max_body_bytes: 1000,
            max_urls: DEFAULT_MAX_URLS,
            shutdown_grace_secs: 5,
            log_level: "info".to_string(),
            log_destination: LogTarget::Terminal,
            log_file: PathBuf::from("./finder.log"),
            fetch: FetchConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub worker_deadline_ms: u64,
    pub redirect_limit: usize,
    pub max_bytes: u64,
    pub allowed_content_types: Vec<String>,
    pub max_in_flight: Option<usize>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        let defaults = FetchSettings::default();
        Self {
            connect_timeout_ms: defaults.connect_timeout.as_millis() as u64,
            request_timeout_ms: defaults.request_timeout.as_millis() as u64,
            worker_deadline_ms: defaults.worker_deadline.as_millis() as u64,
            redirect_limit: defaults.redirect_limit,
            max_bytes: defaults.max_bytes,
            allowed_content_types: defaults.allowed_content_types,
            max_in_flight: defaults.max_in_flight,
        }
    }
}

impl FetchConfig {
    pub fn to_settings(&self) -> FetchSettings {
        FetchSettings {
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
            worker_deadline: Duration::from_millis(self.worker_deadline_ms),
            redirect_limit: self.redirect_limit,
            max_bytes: self.max_bytes,
            allowed_content_types: self.allowed_content_types.clone(),
            max_in_flight: self.max_in_flight,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Self::from_path(Path::new(&path));
        }
        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.is_file() {
            return Self::from_path(local);
        }
        Ok(Self::default())
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        ron::from_str(&content).map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }

    pub fn level_filter(&self) -> Result<LevelFilter, ConfigError> {
        self.log_level
            .parse()
            .map_err(|_| ConfigError::LogLevel(self.log_level.clone()))
    }

    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        let raw = format!("{}:{}", self.host, self.port);
        raw.parse().map_err(|_| ConfigError::Address(raw))
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}
