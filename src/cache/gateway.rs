//! Cache Gateway
//!
//! Read-through access to an optional cache client. Reads fail loudly, writes
//! are best-effort.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use super::client::CacheClient;
use super::entry::CacheEntry;
use crate::error::Result;

/// Thin wrapper around an optional [`CacheClient`].
///
/// Without a client every call behaves as if caching were switched off.
#[derive(Clone, Default)]
pub struct CacheGateway {
    client: Option<Arc<dyn CacheClient>>,
}

impl CacheGateway {
    pub fn new(client: Arc<dyn CacheClient>) -> Self {
        Self {
            client: Some(client),
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.client.is_some()
    }

    // == Lookup ==
    /// Reads `key`, returning the parsed entry on a hit.
    ///
    /// A client failure is `SyncError::CacheRead` and a malformed stored value
    /// is `SyncError::Decode`; neither falls back to the network.
    pub async fn lookup(&self, key: &str) -> Result<Option<CacheEntry>> {
        let Some(client) = &self.client else {
            return Ok(None);
        };

        match client.get(key).await? {
            Some(raw) => {
                debug!(key, "cache hit");
                CacheEntry::from_json(&raw).map(Some)
            }
            None => {
                debug!(key, "cache miss");
                Ok(None)
            }
        }
    }

    // == Store ==
    /// Writes `entry` under `key` and arms its TTL.
    ///
    /// Failures are logged and dropped so they never affect the caller.
    pub async fn store(&self, key: &str, entry: &CacheEntry, ttl_seconds: u64) {
        let Some(client) = &self.client else {
            return;
        };

        let raw = match entry.to_json() {
            Ok(raw) => raw,
            Err(err) => {
                warn!(key, error = %err, "failed to serialize cache entry");
                return;
            }
        };

        if let Err(err) = client.set(key, raw).await {
            warn!(key, error = %err, "cache write failed");
            return;
        }
        if let Err(err) = client.expire(key, ttl_seconds).await {
            warn!(key, error = %err, "cache expire failed");
        }
    }
}

impl fmt::Debug for CacheGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheGateway")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
