//! Server configuration parsed from environment variables.

use std::net::IpAddr;
use std::time::Duration;

use crate::services::export::ArchiveNaming;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
pub const DEFAULT_SESSION_IDLE_TTL_SECS: u64 = 24 * 60 * 60;
pub const DEFAULT_SESSION_SWEEP_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid PORT: {0}")]
    InvalidPort(String),
    #[error("invalid BIND_ADDR: {0}")]
    InvalidBindAddr(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: IpAddr,
    pub port: u16,
    /// Sessions untouched for this long are evicted with their items.
    pub session_idle_ttl: Duration,
    pub session_sweep_interval: Duration,
    /// Request body cap for item submissions and captures.
    pub max_upload_bytes: usize,
    pub archive_naming: ArchiveNaming,
    pub cookie_secure: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: IpAddr::from([0, 0, 0, 0]),
            port: DEFAULT_PORT,
            session_idle_ttl: Duration::from_secs(DEFAULT_SESSION_IDLE_TTL_SECS),
            session_sweep_interval: Duration::from_secs(DEFAULT_SESSION_SWEEP_INTERVAL_SECS),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            archive_naming: ArchiveNaming::Timestamped,
            cookie_secure: false,
        }
    }
}

impl AppConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `BIND_ADDR`: default `0.0.0.0`
    /// - `SESSION_IDLE_TTL_SECS`: default 86400
    /// - `SESSION_SWEEP_INTERVAL_SECS`: default 60
    /// - `MAX_UPLOAD_BYTES`: default 50 MiB
    /// - `EXPORT_TIMESTAMPED_NAME`: `true` (default) for `items_{ms}.zip`,
    ///   `false` for `items.zip`
    /// - `COOKIE_SECURE`: default false
    ///
    /// # Errors
    ///
    /// Returns an error when `PORT` or `BIND_ADDR` is set but malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`AppConfig::from_env`], reading values through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns an error when `PORT` or `BIND_ADDR` is set but malformed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };
        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_owned())
            .trim()
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::InvalidBindAddr(e.to_string()))?;

        let parse_or = |key: &str, default: u64| -> u64 {
            lookup(key)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(default)
        };
        let session_idle_ttl = Duration::from_secs(parse_or("SESSION_IDLE_TTL_SECS", DEFAULT_SESSION_IDLE_TTL_SECS));
        let session_sweep_interval =
            Duration::from_secs(parse_or("SESSION_SWEEP_INTERVAL_SECS", DEFAULT_SESSION_SWEEP_INTERVAL_SECS).max(1));
        let max_upload_bytes = lookup("MAX_UPLOAD_BYTES")
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);

        let archive_naming = match lookup("EXPORT_TIMESTAMPED_NAME").as_deref().and_then(parse_bool) {
            Some(false) => ArchiveNaming::Fixed,
            _ => ArchiveNaming::Timestamped,
        };
        let cookie_secure = lookup("COOKIE_SECURE").as_deref().and_then(parse_bool).unwrap_or(false);

        Ok(Self {
            bind_addr,
            port,
            session_idle_ttl,
            session_sweep_interval,
            max_upload_bytes,
            archive_naming,
            cookie_secure,
        })
    }
}

pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
