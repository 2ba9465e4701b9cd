//! Fixture Handlers
//!
//! Canned endpoints that record what they receive, so sync calls can be
//! checked end to end against a real HTTP server.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, Method, StatusCode, Uri},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::RwLock;

// == Recorded Request ==
/// What the last recording endpoint saw.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    /// Decoded query pairs; a repeated key keeps its last value
    pub query: BTreeMap<String, String>,
    /// Lower-cased header names
    pub headers: BTreeMap<String, String>,
    /// JSON body, or null when empty or not JSON
    pub body: Value,
}

impl RecordedRequest {
    fn capture(method: &Method, uri: &Uri, headers: &HeaderMap, body: &[u8]) -> Self {
        let query = uri
            .query()
            .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            .unwrap_or_default();

        Self {
            method: method.to_string(),
            path: uri.path().to_string(),
            query,
            headers: header_map(headers),
            body: serde_json::from_slice(body).unwrap_or(Value::Null),
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

// == Fixture State ==
/// Shared state for the fixture router.
#[derive(Clone, Default)]
pub struct FixtureState {
    last_request: Arc<RwLock<Option<RecordedRequest>>>,
}

impl FixtureState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent request seen by a recording endpoint.
    pub async fn last_request(&self) -> Option<RecordedRequest> {
        self.last_request.read().await.clone()
    }

    async fn record(&self, request: RecordedRequest) {
        *self.last_request.write().await = Some(request);
    }
}

/// Handler for ANY /foo/bar
pub async fn foo_bar_handler(
    State(state): State<FixtureState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Json<Value> {
    state
        .record(RecordedRequest::capture(&method, &uri, &headers, &body))
        .await;
    Json(json!({ "foo": "bar" }))
}

/// Handler for ANY /custom/url
pub async fn custom_url_handler(
    State(state): State<FixtureState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Json<Value> {
    state
        .record(RecordedRequest::capture(&method, &uri, &headers, &body))
        .await;
    Json(json!({ "baz": "qux" }))
}

/// Handler for GET /err
pub async fn err_handler() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": "Not Found" })),
    )
}

/// Handler for GET /headers
pub async fn headers_handler() -> impl IntoResponse {
    ([("x-foo-bar", "baz")], Json(json!({ "foo": "headers" })))
}

/// Handler for GET /passheaders
///
/// Echoes the request headers back as a JSON object.
pub async fn pass_headers_handler(headers: HeaderMap) -> Json<BTreeMap<String, String>> {
    Json(header_map(&headers))
}

#[derive(Debug, Deserialize)]
pub struct SlowParams {
    #[serde(default)]
    pub ms: u64,
}

/// Handler for GET /slow?ms=N
pub async fn slow_handler(Query(params): Query<SlowParams>) -> Json<Value> {
    tokio::time::sleep(Duration::from_millis(params.ms)).await;
    Json(json!({ "slow": true }))
}

fn header_map(headers: &HeaderMap) -> BTreeMap<String, String> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect()
}
