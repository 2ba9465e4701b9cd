//! Memory Cache Module
//!
//! In-process cache client with per-key TTL, for tests and local development.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::client::CacheClient;
use crate::error::CacheClientError;

// == Stored Value ==
/// A raw value with an optional absolute expiry.
#[derive(Debug, Clone)]
struct StoredValue {
    value: String,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    expires_at: Option<u64>,
}

impl StoredValue {
    /// Expired once the current time reaches `expires_at`.
    fn is_expired(&self, now: u64) -> bool {
        matches!(self.expires_at, Some(expires) if now >= expires)
    }
}

// == Memory Cache ==
/// Redis-like string store: `set` clears any TTL, `expire` arms one.
///
/// Expired keys read as absent and are dropped on access; the reaper task
/// (see [`spawn_cleanup_task`](super::spawn_cleanup_task)) sweeps the rest.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, StoredValue>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    // == Cleanup Expired ==
    /// Removes all expired entries. Returns the number removed.
    pub async fn cleanup_expired(&self) -> usize {
        let now = current_timestamp_ms();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, stored| !stored.is_expired(now));
        before - entries.len()
    }

    /// Remaining TTL in seconds, or None if the key has none or is absent.
    pub async fn ttl_remaining(&self, key: &str) -> Option<u64> {
        let now = current_timestamp_ms();
        let entries = self.entries.read().await;
        let expires = entries.get(key)?.expires_at?;
        Some(expires.saturating_sub(now) / 1000)
    }

    /// Number of stored keys, expired ones included until reaped.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl CacheClient for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheClientError> {
        let now = current_timestamp_ms();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                None => return Ok(None),
                Some(stored) if !stored.is_expired(now) => return Ok(Some(stored.value.clone())),
                Some(_) => {}
            }
        }

        self.entries.write().await.remove(key);
        Ok(None)
    }

    async fn set(&self, key: &str, value: String) -> Result<(), CacheClientError> {
        self.entries.write().await.insert(
            key.to_string(),
            StoredValue {
                value,
                expires_at: None,
            },
        );
        Ok(())
    }

    async fn expire(&self, key: &str, ttl_seconds: u64) -> Result<(), CacheClientError> {
        let expires_at = current_timestamp_ms().saturating_add(ttl_seconds.saturating_mul(1000));
        if let Some(stored) = self.entries.write().await.get_mut(key) {
            stored.expires_at = Some(expires_at);
        }
        Ok(())
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = MemoryCache::new();

        cache.set("key1", "value1".to_string()).await.unwrap();
        assert_eq!(cache.get("key1").await.unwrap().as_deref(), Some("value1"));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_get_missing_is_none() {
        let cache = MemoryCache::new();
        assert!(cache.get("nonexistent").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_clears_ttl() {
        let cache = MemoryCache::new();

        cache.set("key1", "v1".to_string()).await.unwrap();
        cache.expire("key1", 60).await.unwrap();
        assert!(cache.ttl_remaining("key1").await.is_some());

        cache.set("key1", "v2".to_string()).await.unwrap();
        assert!(cache.ttl_remaining("key1").await.is_none());
    }

    #[tokio::test]
    async fn test_expire_missing_key_is_noop() {
        let cache = MemoryCache::new();
        cache.expire("ghost", 10).await.unwrap();
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_ttl_remaining_seconds() {
        let cache = MemoryCache::new();
        cache.set("key1", "v".to_string()).await.unwrap();
        cache.expire("key1", 10).await.unwrap();

        let remaining = cache.ttl_remaining("key1").await.unwrap();
        assert!(remaining <= 10);
        assert!(remaining >= 9);
    }

    #[tokio::test]
    async fn test_expired_key_reads_absent_and_is_dropped() {
        let cache = MemoryCache::new();
        cache.set("key1", "v".to_string()).await.unwrap();
        cache.expire("key1", 0).await.unwrap();

        assert!(cache.get("key1").await.unwrap().is_none());
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn test_huge_ttl_saturates() {
        let cache = MemoryCache::new();
        cache.set("key1", "v".to_string()).await.unwrap();
        cache.expire("key1", u64::MAX / 100).await.unwrap();
        cache.set("key2", "v".to_string()).await.unwrap();
        cache.expire("key2", u64::MAX).await.unwrap();

        assert_eq!(cache.get("key1").await.unwrap().as_deref(), Some("v"));
        assert_eq!(cache.get("key2").await.unwrap().as_deref(), Some("v"));
        assert_eq!(cache.cleanup_expired().await, 0);
    }

    #[tokio::test]
    async fn test_cleanup_expired() {
        let cache = MemoryCache::new();
        cache.set("short", "v".to_string()).await.unwrap();
        cache.expire("short", 1).await.unwrap();
        cache.set("long", "v".to_string()).await.unwrap();
        cache.expire("long", 10).await.unwrap();
        cache.set("forever", "v".to_string()).await.unwrap();

        tokio::time::sleep(Duration::from_millis(1100)).await;

        assert_eq!(cache.cleanup_expired().await, 1);
        assert_eq!(cache.len().await, 2);
        assert!(cache.get("long").await.unwrap().is_some());
    }
}
