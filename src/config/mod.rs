// Configuration module entry point
// Loads application configuration and holds the shared runtime state

mod state;
mod types;

use std::net::SocketAddr;

pub use state::AppState;
pub use types::{
    AssetsConfig, Config, HttpConfig, LogFormat, LoggingConfig, PerformanceConfig, ServerConfig,
};

/// Config file used when no path is passed on the command line
pub const DEFAULT_CONFIG_PATH: &str = "config";

/// Prefix for environment overrides, e.g. `ECHOBIN__SERVER__PORT=9000`
pub const ENV_PREFIX: &str = "ECHOBIN";

impl Config {
    /// Load configuration from the path given as first CLI argument,
    /// falling back to `config.toml` in the working directory
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let path = std::env::args()
            .nth(1)
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(&path)
    }

    /// Load configuration from specified file path (extension optional)
    ///
    /// A missing file is not an error; every field has a default.
    pub fn load_from(config_path: &str) -> Result<Self, ::config::ConfigError> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::with_name(config_path).required(false))
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}
