//! Cache client contract.

use async_trait::async_trait;

use crate::error::CacheClientError;

/// External cache store the adapter reads through.
///
/// Implementations must be safe to share across concurrent calls; the adapter
/// never serializes access to them.
#[async_trait]
pub trait CacheClient: Send + Sync {
    /// Raw stored value for `key`, or `None` on a miss.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheClientError>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: String) -> Result<(), CacheClientError>;

    /// Expires `key` after `ttl_seconds`.
    async fn expire(&self, key: &str, ttl_seconds: u64) -> Result<(), CacheClientError>;
}
