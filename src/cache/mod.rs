//! Cache Module
//!
//! Read-through cache plumbing: the client contract, the gateway the adapter
//! talks to, and an in-process client with TTL expiration.

mod cleanup;
mod client;
mod entry;
mod gateway;
mod memory;

// Re-export public types
pub use cleanup::spawn_cleanup_task;
pub use client::CacheClient;
pub use entry::CacheEntry;
pub use gateway::CacheGateway;
pub use memory::MemoryCache;
