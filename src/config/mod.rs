// Configuration module entry point
// Loads the host configuration from file and environment

mod types;

use std::net::SocketAddr;

pub use types::{
    AppConfig, HostConfig, HostEnvironment, LoggingConfig, PerformanceConfig, ServerConfig,
};

/// Config file used when none is given on the command line (extension optional)
pub const DEFAULT_CONFIG_FILE: &str = "spa-host";

/// Environment variable prefix, e.g. `SPA_HOST__SERVER__PORT=8080`
pub const ENV_PREFIX: &str = "SPA_HOST";

impl HostConfig {
    /// Load configuration from the specified file path (extension optional)
    ///
    /// The file may be absent as long as the environment supplies
    /// `app.client_assembly_path`.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 5000)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("app.environment", HostEnvironment::PRODUCTION)?
            .set_default("app.application_name", "spa-host")?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }

    /// Execution mode and identity for pipeline composition
    pub fn environment(&self) -> HostEnvironment {
        HostEnvironment::new(&self.app.environment, &self.app.application_name)
    }
}
