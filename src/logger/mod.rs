//! Logger module
//!
//! Installs the `tracing` subscriber and provides the logging helpers used by
//! the server:
//! - Server lifecycle logging
//! - Access logging with multiple formats (target `access`)
//! - Connection error and warning logging

mod format;

pub use format::AccessLogEntry;

use crate::config::{Config, LogFormat, LoggingConfig};
use crate::error::LoggerError;
use hyper::HeaderMap;
use std::net::SocketAddr;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Tracing target of access log lines
pub const ACCESS_TARGET: &str = "access";

/// Initialize the global subscriber
///
/// `RUST_LOG` wins over `logging.level` when set. Should be called once at
/// application startup.
pub fn init(config: &LoggingConfig) -> Result<(), LoggerError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)?,
    };

    let registry = tracing_subscriber::registry().with(filter);
    let installed = match config.format {
        LogFormat::Text => registry.with(fmt::layer()).try_init(),
        LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
    };
    installed.map_err(|e| LoggerError::Init(Box::new(e)))
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    tracing::info!(
        %addr,
        server_name = %config.http.server_name,
        log_level = %config.logging.level,
        max_body_size = config.http.max_body_size,
        max_connections = ?config.performance.max_connections,
        assets = ?config.assets.dir,
        "echobin listening on http://{addr}"
    );
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    tracing::debug!(%peer_addr, "connection accepted");
}

pub fn log_connection_rejected(peer_addr: &SocketAddr, active: usize, max: u64) {
    tracing::warn!(%peer_addr, active, max, "max connections reached, connection rejected");
}

pub fn log_connection_error(err: &hyper::Error) {
    tracing::warn!(error = %err, "failed to serve connection");
}

pub fn log_connection_timeout(secs: u64) {
    tracing::warn!(timeout_secs = secs, "connection timed out");
}

pub fn log_accept_error(err: &std::io::Error) {
    tracing::error!(error = %err, "failed to accept connection");
}

pub fn log_shutdown(active: usize) {
    tracing::info!(active_connections = active, "shutdown signal received, draining");
}

pub fn log_headers(headers: &HeaderMap, show: bool) {
    if show {
        for (name, value) in headers {
            tracing::debug!(header = %name, value = ?value, "request header");
        }
    }
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    tracing::info!(target: ACCESS_TARGET, "{}", entry.format(format));
}
