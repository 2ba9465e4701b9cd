//! Cache Entry Module
//!
//! The serialized shape of a cached response.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, SyncError};

// == Cache Entry ==
/// A cached response: decoded body plus the headers it arrived with.
///
/// Stored as the JSON text `{"body":...,"headers":{...}}`. The TTL is applied
/// separately through the client's `expire`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub body: Value,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl CacheEntry {
    pub fn new(body: Value, headers: BTreeMap<String, String>) -> Self {
        Self { body, headers }
    }

    /// Parses a stored value.
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(SyncError::Decode)
    }

    /// Serializes for storage.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(SyncError::Encode)
    }
}
