//! Resource contract
//!
//! A resource knows where it lives and how to serialize itself. Persistence
//! semantics (validation, dirty tracking) stay with the implementor.

use serde_json::{Map, Value};

use crate::intent::Intent;
use crate::options::SyncOptions;

/// Something that can be synced over HTTP.
pub trait Resource: Send + Sync {
    /// Url of the resource, if it has one.
    fn url(&self) -> Option<String>;

    /// Serialized representation sent by create and update.
    fn to_json(&self, options: &SyncOptions) -> Value;

    /// Lifecycle notification fired when a dispatch begins.
    fn on_request(&self, _intent: Intent, _options: &SyncOptions) {}
}

// == Model ==
/// Plain attribute bag with an optional url.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Model {
    url: Option<String>,
    attributes: Map<String, Value>,
}

impl Model {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            attributes: Map::new(),
        }
    }

    /// Model with no url; every call must pass one in its options.
    pub fn detached() -> Self {
        Self::default()
    }

    pub fn with_attributes(mut self, attributes: Value) -> Self {
        if let Value::Object(map) = attributes {
            self.attributes = map;
        }
        self
    }

    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = Some(url.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.attributes.insert(key.into(), value);
    }

    /// Merges a server response into the attributes; non-objects are ignored.
    pub fn merge(&mut self, body: &Value) {
        if let Value::Object(map) = body {
            for (k, v) in map {
                self.attributes.insert(k.clone(), v.clone());
            }
        }
    }
}

impl Resource for Model {
    fn url(&self) -> Option<String> {
        self.url.clone()
    }

    fn to_json(&self, _options: &SyncOptions) -> Value {
        Value::Object(self.attributes.clone())
    }
}
