//! Configuration Module
//!
//! Sync defaults and fixture-server settings, loaded from environment variables.
//! Configuration is a plain value handed to the adapter; nothing here is global.

use std::env;
use std::time::Duration;

/// Default timeout for a dispatched request, in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 2000;

/// Default cache TTL in seconds for written-back responses.
pub const DEFAULT_CACHE_TTL: u64 = 3600;

// == Sync Config ==
/// Defaults read by every dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Timeout applied when a call does not override it
    pub default_timeout: Duration,
    /// TTL in seconds applied when a call does not pass `cache_time`
    pub default_cache_ttl: u64,
}

impl SyncConfig {
    /// Loads sync defaults from the environment.
    ///
    /// # Environment Variables
    /// - `SYNC_TIMEOUT_MS` - Request timeout in milliseconds (default: 2000)
    /// - `SYNC_CACHE_TTL` - Cache TTL in seconds (default: 3600)
    pub fn from_env() -> Self {
        Self {
            default_timeout: Duration::from_millis(env_or("SYNC_TIMEOUT_MS", DEFAULT_TIMEOUT_MS)),
            default_cache_ttl: env_or("SYNC_CACHE_TTL", DEFAULT_CACHE_TTL),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn with_cache_ttl(mut self, ttl_seconds: u64) -> Self {
        self.default_cache_ttl = ttl_seconds;
        self
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            default_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            default_cache_ttl: DEFAULT_CACHE_TTL,
        }
    }
}

// == Server Config ==
/// Settings for the fixture server binary.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP server port
    pub server_port: u16,
}

impl ServerConfig {
    /// Loads server settings from the environment.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 5000)
    pub fn from_env() -> Self {
        Self {
            server_port: env_or("SERVER_PORT", 5000),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { server_port: 5000 }
    }
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
