//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::time::Duration;

use crate::cache::Expiry;

/// Default port of the HTTP server
pub const DEFAULT_SERVER_PORT: u16 = 8080;

/// Default interval between expiry sweeps
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Default maximum size of a PUT body in bytes
pub const DEFAULT_MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Interval between expiry sweeps, zero disables sweeping
    pub sweep_interval: Duration,
    /// Number of independent cache partitions, 1 = single cache
    pub partitions: usize,
    /// Expiry applied to PUT requests without a `cache-expiry` header
    pub default_expiry: Expiry,
    /// Maximum size of a PUT body in bytes
    pub max_body_bytes: usize,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 8080)
    /// - `SWEEP_INTERVAL` - Sweep interval such as `30s`; `0` or negative disables (default: 1m)
    /// - `CACHE_PARTITIONS` - Number of cache partitions (default: 1)
    /// - `DEFAULT_EXPIRY` - Expiry for PUTs without header; negative = never (default: never)
    /// - `MAX_BODY_BYTES` - Maximum PUT body size (default: 8 MiB)
    ///
    /// Unparsable values fall back to their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a Config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            server_port: lookup("SERVER_PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
            sweep_interval: lookup("SWEEP_INTERVAL")
                .and_then(|v| v.parse::<Expiry>().ok())
                .map(|expiry| match expiry {
                    Expiry::After(interval) => interval,
                    Expiry::Never => Duration::ZERO,
                })
                .unwrap_or(defaults.sweep_interval),
            partitions: lookup("CACHE_PARTITIONS")
                .and_then(|v| v.parse().ok())
                .filter(|count| *count > 0)
                .unwrap_or(defaults.partitions),
            default_expiry: lookup("DEFAULT_EXPIRY")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.default_expiry),
            max_body_bytes: lookup("MAX_BODY_BYTES")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_body_bytes),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: DEFAULT_SERVER_PORT,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            partitions: 1,
            default_expiry: Expiry::Never,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}
