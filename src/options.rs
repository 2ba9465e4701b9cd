//! Per-call options
//!
//! Everything a caller can tune for one sync call, plus the callback channel
//! and the slot where response metadata is recorded after resolution.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde_json::{Map, Value};

use crate::error::SyncError;

/// Invoked with the decoded body on success.
pub type SuccessCallback = Box<dyn FnOnce(&Value) + Send + Sync>;

/// Invoked with the failure on rejection.
pub type ErrorCallback = Box<dyn FnOnce(&SyncError) + Send + Sync>;

/// Invoked after `success` or `error`, whichever fired.
pub type CompleteCallback = Box<dyn FnOnce(Completion<'_>) + Send + Sync>;

/// What a `complete` callback receives.
#[derive(Debug, Clone, Copy)]
pub enum Completion<'a> {
    Success(&'a Value),
    Failure(&'a SyncError),
}

impl<'a> Completion<'a> {
    pub fn is_success(&self) -> bool {
        matches!(self, Completion::Success(_))
    }

    /// The body that was resolved, or the body carried by a remote rejection.
    pub fn body(&self) -> Option<&'a Value> {
        match *self {
            Completion::Success(body) => Some(body),
            Completion::Failure(err) => err.body(),
        }
    }
}

/// Metadata recorded on the options once a call resolves successfully.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseInfo {
    /// Response headers, lower-cased names
    pub headers: BTreeMap<String, String>,
    /// Whether the body came from the cache
    pub cached: bool,
}

// == Sync Options ==
/// Options for a single sync call.
#[derive(Default)]
pub struct SyncOptions {
    /// Overrides the resource's url
    pub url: Option<String>,
    /// Explicit payload; wins over anything derived from the resource
    pub data: Option<Value>,
    /// Changed attributes for a patch save
    pub attrs: Option<Value>,
    /// Extra request headers, merged over computed defaults
    pub headers: BTreeMap<String, String>,
    /// Overrides the configured default timeout
    pub timeout: Option<Duration>,
    /// Opt into the read-through cache for this call
    pub cache: bool,
    /// Overrides the configured cache TTL, in seconds
    pub cache_time: Option<u64>,
    /// Arbitrary caller values, visible to the request hook
    pub extra: Map<String, Value>,
    /// Filled in after a successful resolution
    pub response: Option<ResponseInfo>,
    pub(crate) success: Option<SuccessCallback>,
    pub(crate) error: Option<ErrorCallback>,
    pub(crate) complete: Option<CompleteCallback>,
}

impl SyncOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn attrs(mut self, attrs: Value) -> Self {
        self.attrs = Some(attrs);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn cache(mut self, enabled: bool) -> Self {
        self.cache = enabled;
        self
    }

    pub fn cache_time(mut self, seconds: u64) -> Self {
        self.cache_time = Some(seconds);
        self
    }

    pub fn extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    pub fn on_success(mut self, callback: impl FnOnce(&Value) + Send + Sync + 'static) -> Self {
        self.success = Some(Box::new(callback));
        self
    }

    pub fn on_error(mut self, callback: impl FnOnce(&SyncError) + Send + Sync + 'static) -> Self {
        self.error = Some(Box::new(callback));
        self
    }

    pub fn on_complete(
        mut self,
        callback: impl for<'a> FnOnce(Completion<'a>) + Send + Sync + 'static,
    ) -> Self {
        self.complete = Some(Box::new(callback));
        self
    }

    /// Response headers recorded by the last successful resolution.
    pub fn response_headers(&self) -> Option<&BTreeMap<String, String>> {
        self.response.as_ref().map(|res| &res.headers)
    }
}

impl fmt::Debug for SyncOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncOptions")
            .field("url", &self.url)
            .field("data", &self.data)
            .field("attrs", &self.attrs)
            .field("headers", &self.headers)
            .field("timeout", &self.timeout)
            .field("cache", &self.cache)
            .field("cache_time", &self.cache_time)
            .field("extra", &self.extra)
            .field("response", &self.response)
            .field("success", &self.success.is_some())
            .field("error", &self.error.is_some())
            .field("complete", &self.complete.is_some())
            .finish()
    }
}
