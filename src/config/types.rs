// Configuration types module
// Defines the host configuration structures

use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct HostConfig {
    pub server: ServerConfig,
    pub performance: PerformanceConfig,
    pub logging: LoggingConfig,
    pub app: AppConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Client application settings
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Compiled client assembly; its build descriptor sits next to it
    pub client_assembly_path: PathBuf,
    /// Execution mode name (`Development`, `Staging`, `Production`, ...)
    pub environment: String,
    /// Process identity used to pick the auto-rebuild strategy
    pub application_name: String,
}

/// Execution mode and process identity seen by the pipeline composer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostEnvironment {
    pub environment_name: String,
    pub application_name: String,
}

impl HostEnvironment {
    pub const DEVELOPMENT: &'static str = "Development";
    pub const PRODUCTION: &'static str = "Production";

    pub fn new(environment_name: impl Into<String>, application_name: impl Into<String>) -> Self {
        Self {
            environment_name: environment_name.into(),
            application_name: application_name.into(),
        }
    }

    pub fn development(application_name: impl Into<String>) -> Self {
        Self::new(Self::DEVELOPMENT, application_name)
    }

    pub fn production(application_name: impl Into<String>) -> Self {
        Self::new(Self::PRODUCTION, application_name)
    }

    /// Mode names compare case-insensitively
    pub fn is_development(&self) -> bool {
        self.environment_name.eq_ignore_ascii_case(Self::DEVELOPMENT)
    }
}
