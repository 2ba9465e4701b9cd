//! Request Identity
//!
//! Derives the target url, the outgoing payload, and the cache key for one
//! call. Pure: nothing here touches the network or the cache.

use std::collections::BTreeMap;
use std::time::Duration;

use serde_json::{Map, Value};

use crate::config::SyncConfig;
use crate::error::{Result, SyncError};
use crate::intent::Intent;
use crate::options::SyncOptions;
use crate::resource::Resource;

// == Request Descriptor ==
/// Everything the dispatcher and cache gateway need to know about one call.
///
/// Built once per call by [`derive`] and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    /// Absolute url the request targets
    pub target_url: String,
    /// Body for create/update/patch, query for read/delete
    pub payload: Value,
    /// Caller-supplied headers
    pub headers: BTreeMap<String, String>,
    /// Effective timeout for the exchange
    pub timeout: Duration,
    /// Whether this call reads and populates the cache
    pub cache_enabled: bool,
    /// TTL applied to a written-back entry
    pub cache_ttl: u64,
    /// `target_url` followed by the canonical JSON of `payload`
    pub cache_key: String,
}

// == Derive ==
/// Computes the request identity for `intent` against `resource`.
///
/// Payload precedence: explicit `data`, then `attrs` for a patch, then the
/// resource's representation for create/update, else an empty object.
/// Caching is on only when the call asks for it and a cache is available.
///
/// # Arguments
/// * `intent` - Operation being performed
/// * `resource` - Supplies the fallback url and the JSON representation
/// * `options` - Per-call overrides
/// * `config` - Adapter defaults for timeout and TTL
/// * `cache_available` - Whether a cache client is configured
///
/// # Returns
/// The descriptor, or `SyncError::InvalidUrl` when neither the options nor
/// the resource carry a url.
pub fn derive<R: Resource + ?Sized>(
    intent: Intent,
    resource: &R,
    options: &SyncOptions,
    config: &SyncConfig,
    cache_available: bool,
) -> Result<RequestDescriptor> {
    let target_url = options
        .url
        .clone()
        .or_else(|| resource.url())
        .ok_or_else(|| SyncError::InvalidUrl("no url on options or resource".to_string()))?;

    let payload = match (&options.data, &options.attrs) {
        (Some(data), _) => data.clone(),
        (None, Some(attrs)) if intent == Intent::Patch => attrs.clone(),
        _ if intent.serializes_resource() => resource.to_json(options),
        _ => Value::Object(Map::new()),
    };

    let cache_key = cache_key(&target_url, &payload);

    Ok(RequestDescriptor {
        target_url,
        payload,
        headers: options.headers.clone(),
        timeout: options.timeout.unwrap_or(config.default_timeout),
        cache_enabled: options.cache && cache_available,
        // A zero TTL means "unset", not "expire now".
        cache_ttl: options
            .cache_time
            .filter(|ttl| *ttl > 0)
            .unwrap_or(config.default_cache_ttl),
        cache_key,
    })
}

/// Cache key for a url/payload pair.
pub fn cache_key(url: &str, payload: &Value) -> String {
    let mut key = String::with_capacity(url.len() + 32);
    key.push_str(url);
    write_canonical(payload, &mut key);
    key
}

/// JSON text with object keys sorted at every depth.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));

            out.push('{');
            for (i, (k, v)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(k.clone()).to_string());
                out.push(':');
                write_canonical(v, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}
