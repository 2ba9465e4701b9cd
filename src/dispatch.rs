//! Request Dispatcher
//!
//! Turns a request descriptor into a wire request, runs it under the armed
//! timeout, and classifies what comes back.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::cache::CacheEntry;
use crate::error::{Result, SyncError};
use crate::intent::Intent;
use crate::options::SyncOptions;
use crate::request::{append_query, RequestDescriptor};
use crate::resource::Resource;
use crate::transport::{OutgoingRequest, Transport, TransportResponse};

/// Hook run on every outgoing request right before it is sent.
///
/// Receives the mutable request plus the intent, resource and call options,
/// so cross-cutting concerns (auth tokens, tracing ids) can be injected.
pub type RequestHook =
    Arc<dyn Fn(&mut OutgoingRequest, Intent, &dyn Resource, &SyncOptions) + Send + Sync>;

// == Sync Response ==
/// A successful response: decoded body plus lower-cased headers.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncResponse {
    pub body: Value,
    pub headers: BTreeMap<String, String>,
}

impl From<CacheEntry> for SyncResponse {
    fn from(entry: CacheEntry) -> Self {
        Self {
            body: entry.body,
            headers: entry.headers,
        }
    }
}

impl From<&SyncResponse> for CacheEntry {
    fn from(response: &SyncResponse) -> Self {
        CacheEntry::new(response.body.clone(), response.headers.clone())
    }
}

// == Request Dispatcher ==
#[derive(Clone)]
pub struct RequestDispatcher {
    transport: Arc<dyn Transport>,
    hook: Option<RequestHook>,
}

impl RequestDispatcher {
    pub fn new(transport: Arc<dyn Transport>, hook: Option<RequestHook>) -> Self {
        Self { transport, hook }
    }

    /// Sends the request described by `descriptor` and classifies the reply.
    ///
    /// The timeout covers the whole exchange including the body read. When it
    /// fires the transport future is dropped, which aborts the call.
    ///
    /// # Arguments
    /// * `descriptor` - Target, payload, headers and timeout for the call
    /// * `intent` - Selects the HTTP method and body/query placement
    /// * `resource` - Passed through to the request hook
    /// * `options` - Passed through to the request hook
    ///
    /// # Returns
    /// The decoded response, or `Timeout`, `Transport`, `RemoteStatus`,
    /// `Decode` on failure.
    pub async fn dispatch(
        &self,
        descriptor: &RequestDescriptor,
        intent: Intent,
        resource: &dyn Resource,
        options: &SyncOptions,
    ) -> Result<SyncResponse> {
        let mut request = build_request(descriptor, intent)?;

        if let Some(hook) = &self.hook {
            hook(&mut request, intent, resource, options);
        }

        debug!(
            method = %request.method,
            url = %request.url,
            timeout_ms = descriptor.timeout.as_millis() as u64,
            "sending request"
        );

        let response = tokio::time::timeout(descriptor.timeout, self.transport.send(request))
            .await
            .map_err(|_| SyncError::Timeout {
                after: descriptor.timeout,
            })??;

        debug!(status = response.status, url = %response.url, "response received");
        classify(response)
    }
}

impl fmt::Debug for RequestDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestDispatcher")
            .field("hook", &self.hook.is_some())
            .finish()
    }
}

// == Build Request ==
/// Places the payload and headers for `intent`.
///
/// Body intents get a JSON body with explicit framing headers; read and
/// delete get the payload appended to the query string. Caller headers are
/// applied last and win over the computed ones.
pub fn build_request(descriptor: &RequestDescriptor, intent: Intent) -> Result<OutgoingRequest> {
    let mut url = Url::parse(&descriptor.target_url)
        .map_err(|e| SyncError::InvalidUrl(format!("{}: {}", descriptor.target_url, e)))?;

    let body = if intent.sends_body() {
        Some(serde_json::to_string(&descriptor.payload).map_err(SyncError::Encode)?)
    } else {
        append_query(&mut url, &descriptor.payload);
        None
    };

    let mut request = OutgoingRequest::new(intent.method(), url);
    if let Some(body) = body {
        request.set_header("content-length", body.len().to_string());
        request.set_header("content-type", "application/json");
        request.body = Some(body);
    }

    for (name, value) in &descriptor.headers {
        request.set_header(name, value.clone());
    }

    Ok(request)
}

// == Classify ==
/// 4xx/5xx become `RemoteStatus`; anything else must carry JSON (or nothing).
fn classify(response: TransportResponse) -> Result<SyncResponse> {
    if response.is_error() {
        let body = if response.body.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&response.body).unwrap_or(Value::String(response.body))
        };
        return Err(SyncError::RemoteStatus {
            status: response.status,
            url: response.url,
            headers: response.headers,
            body,
        });
    }

    let body = if response.body.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&response.body).map_err(SyncError::Decode)?
    };

    Ok(SyncResponse {
        body,
        headers: response.headers,
    })
}
