//! Super Sync - cache-aware persistence adapter
//!
//! Maps create/read/update/delete/patch intents on a resource to HTTP calls,
//! reads through an optional cache, and reports each outcome exactly once
//! through callbacks and the returned result.

pub mod adapter;
pub mod cache;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod fixture;
pub mod intent;
pub mod options;
pub mod request;
pub mod resolve;
pub mod resource;
pub mod transport;

pub use adapter::{SyncAdapter, SyncAdapterBuilder};
pub use cache::{CacheClient, MemoryCache};
pub use config::SyncConfig;
pub use dispatch::RequestHook;
pub use error::{Result, SyncError};
pub use intent::Intent;
pub use options::{Completion, SyncOptions};
pub use resource::{Model, Resource};
pub use transport::{HttpTransport, OutgoingRequest, Transport};
