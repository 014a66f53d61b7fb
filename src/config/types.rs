// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
    pub assets: AssetsConfig,
}

/// Listener configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Log output encoding
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set
    pub level: String,
    pub format: LogFormat,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    pub access_log_format: String,
    pub show_headers: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
            access_log: true,
            access_log_format: "combined".to_string(),
            show_headers: false,
        }
    }
}

/// Connection handling configuration (seconds)
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            keep_alive_timeout: 75,
            read_timeout: 30,
            write_timeout: 30,
            max_connections: None,
        }
    }
}

/// HTTP behaviour configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HttpConfig {
    pub server_name: String,
    pub max_body_size: u64,
    /// Header set by the trusted edge proxy with the caller's address
    pub client_ip_header: String,
    /// Include the error chain and request dump on 500 pages
    pub error_details: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            server_name: "echobin".to_string(),
            max_body_size: 10_485_760, // 10MB
            client_ip_header: "CF-Connecting-IP".to_string(),
            error_details: true,
        }
    }
}

/// Static asset catch-all configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AssetsConfig {
    /// Directory served for unmatched paths; plain 404 when unset
    pub dir: Option<String>,
    pub index_files: Vec<String>,
    /// `Cache-Control` max-age of served files in seconds; 0 sends `no-cache`
    pub max_age: u32,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            dir: None,
            index_files: vec!["index.html".to_string(), "index.htm".to_string()],
            max_age: 3600,
        }
    }
}
