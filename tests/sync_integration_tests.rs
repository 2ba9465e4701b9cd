//! Integration Tests for Sync Calls
//!
//! Drives the adapter over real HTTP against the fixture server.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{json, Value};
use super_sync::fixture::{spawn_fixture_server, FixtureState};
use super_sync::{
    CacheClient, Intent, MemoryCache, Model, OutgoingRequest, RequestHook, Resource, SyncAdapter,
    SyncConfig, SyncError, SyncOptions,
};

// == Helper Functions ==

async fn start() -> (SocketAddr, FixtureState) {
    let (addr, state, _handle) = spawn_fixture_server().await.unwrap();
    (addr, state)
}

fn url(addr: SocketAddr, path: &str) -> String {
    format!("http://{}{}", addr, path)
}

// == GET Requests ==

#[tokio::test]
async fn test_read_updates_the_model() {
    let (addr, _state) = start().await;
    let adapter = SyncAdapter::new();
    let mut model = Model::new(url(addr, "/foo/bar"));

    adapter
        .fetch(&mut model, &mut SyncOptions::new())
        .await
        .unwrap();

    assert_eq!(model.get("foo"), Some(&json!("bar")));
}

#[tokio::test]
async fn test_read_puts_data_in_query() {
    let (addr, state) = start().await;
    let adapter = SyncAdapter::new();
    let model = Model::new(url(addr, "/foo/bar"));

    let mut options = SyncOptions::new().data(json!({"foo": "bar"}));
    let body = adapter.read(&model, &mut options).await.unwrap();

    assert_eq!(body, json!({"foo": "bar"}));
    let recorded = state.last_request().await.unwrap();
    assert_eq!(recorded.method, "GET");
    assert_eq!(recorded.path, "/foo/bar");
    assert_eq!(recorded.query["foo"], "bar");
    assert_eq!(recorded.body, Value::Null);
}

#[tokio::test]
async fn test_delete_puts_data_in_query() {
    let (addr, state) = start().await;
    let adapter = SyncAdapter::new();
    let model = Model::new(url(addr, "/foo/bar")).with_attributes(json!({"ignored": true}));

    let mut options = SyncOptions::new().data(json!({"id": 7}));
    adapter.delete(&model, &mut options).await.unwrap();

    let recorded = state.last_request().await.unwrap();
    assert_eq!(recorded.method, "DELETE");
    assert_eq!(recorded.query["id"], "7");
    assert!(recorded.header("content-length").map_or(true, |len| len == "0"));
}

#[tokio::test]
async fn test_options_url_wins() {
    let (addr, state) = start().await;
    let adapter = SyncAdapter::new();
    let mut model = Model::new(url(addr, "/foo/bar"));

    let mut options = SyncOptions::new().url(url(addr, "/custom/url"));
    adapter.fetch(&mut model, &mut options).await.unwrap();

    assert_eq!(model.get("baz"), Some(&json!("qux")));
    assert_eq!(state.last_request().await.unwrap().path, "/custom/url");
}

#[tokio::test]
async fn test_error_carries_the_response() {
    let (addr, _state) = start().await;
    let adapter = SyncAdapter::new();
    let model = Model::new(url(addr, "/err"));

    let seen_url = Arc::new(Mutex::new(None));
    let slot = seen_url.clone();
    let mut options = SyncOptions::new().on_error(move |err| {
        if let SyncError::RemoteStatus { url, .. } = err {
            *slot.lock().unwrap() = Some(url.clone());
        }
    });

    let err = adapter.read(&model, &mut options).await.unwrap_err();

    assert_eq!(err.status(), Some(404));
    assert_eq!(
        seen_url.lock().unwrap().as_deref(),
        Some(url(addr, "/err").as_str())
    );
}

#[tokio::test]
async fn test_complete_sees_error_body() {
    let (addr, _state) = start().await;
    let adapter = SyncAdapter::new();
    let model = Model::new(url(addr, "/err"));

    let message = Arc::new(Mutex::new(None));
    let slot = message.clone();
    let mut options = SyncOptions::new().on_complete(move |done| {
        *slot.lock().unwrap() = done
            .body()
            .and_then(|body| body["message"].as_str())
            .map(String::from);
    });

    assert!(adapter.read(&model, &mut options).await.is_err());
    assert_eq!(message.lock().unwrap().as_deref(), Some("Not Found"));
}

#[tokio::test]
async fn test_response_headers_are_recorded() {
    let (addr, _state) = start().await;
    let adapter = SyncAdapter::new();
    let model = Model::new(url(addr, "/foo/bar"));

    let mut options = SyncOptions::new().url(url(addr, "/headers"));
    let body = adapter.read(&model, &mut options).await.unwrap();

    assert_eq!(body, json!({"foo": "headers"}));
    assert_eq!(options.response_headers().unwrap()["x-foo-bar"], "baz");
}

#[tokio::test]
async fn test_caller_headers_are_sent() {
    let (addr, _state) = start().await;
    let adapter = SyncAdapter::new();
    let model = Model::new(url(addr, "/passheaders"));

    let mut options = SyncOptions::new().header("X-Foo", "Bar");
    let body = adapter.read(&model, &mut options).await.unwrap();

    assert_eq!(body["x-foo"], "Bar");
}

#[tokio::test]
async fn test_hook_receives_call_arguments() {
    let (addr, _state) = start().await;
    let seen = Arc::new(AtomicUsize::new(0));
    let counter = seen.clone();
    let hook: RequestHook = Arc::new(
        move |request: &mut OutgoingRequest,
              intent: Intent,
              resource: &dyn Resource,
              options: &SyncOptions| {
            assert_eq!(intent, Intent::Read);
            assert!(resource.url().unwrap().ends_with("/foo/bar"));
            assert_eq!(options.extra["foo"], "bar");
            request.set_header("authorization", "Bearer token");
            counter.fetch_add(1, Ordering::SeqCst);
        },
    );
    let adapter = SyncAdapter::builder().request_hook(hook).build();
    let model = Model::new(url(addr, "/foo/bar"));

    let mut options = SyncOptions::new()
        .url(url(addr, "/passheaders"))
        .extra("foo", json!("bar"));
    let body = adapter.read(&model, &mut options).await.unwrap();

    assert_eq!(seen.load(Ordering::SeqCst), 1);
    assert_eq!(body["authorization"], "Bearer token");
}

#[tokio::test]
async fn test_result_channel_without_callbacks() {
    let (addr, _state) = start().await;
    let adapter = SyncAdapter::new();

    let ok = adapter
        .read(&Model::new(url(addr, "/foo/bar")), &mut SyncOptions::new())
        .await;
    assert!(ok.is_ok());

    let err = adapter
        .read(&Model::new(url(addr, "/err")), &mut SyncOptions::new())
        .await;
    assert!(err.is_err());
}

#[tokio::test]
async fn test_slow_server_times_out() {
    let (addr, _state) = start().await;
    let adapter = SyncAdapter::builder()
        .config(SyncConfig::default().with_timeout(Duration::from_millis(50)))
        .build();
    let model = Model::new(url(addr, "/slow"));

    let successes = Arc::new(AtomicUsize::new(0));
    let counter = successes.clone();
    let mut options = SyncOptions::new()
        .data(json!({"ms": 500}))
        .on_success(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

    let err = adapter.read(&model, &mut options).await.unwrap_err();
    assert!(err.is_timeout());

    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(successes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_per_call_timeout_overrides_default() {
    let (addr, _state) = start().await;
    let adapter = SyncAdapter::builder()
        .config(SyncConfig::default().with_timeout(Duration::from_millis(20)))
        .build();
    let model = Model::new(url(addr, "/slow"));

    let mut options = SyncOptions::new()
        .data(json!({"ms": 50}))
        .timeout(Duration::from_secs(2));
    let body = adapter.read(&model, &mut options).await.unwrap();

    assert_eq!(body, json!({"slow": true}));
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    // Bind then drop to get a port nobody listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let adapter = SyncAdapter::new();
    let result = adapter
        .read(&Model::new(url(addr, "/foo/bar")), &mut SyncOptions::new())
        .await;

    assert!(matches!(result, Err(SyncError::Transport(_))));
}

// == POST / PUT / PATCH Requests ==

#[tokio::test]
async fn test_create_sets_content_length_and_body() {
    let (addr, state) = start().await;
    let adapter = SyncAdapter::new();
    let model = Model::new(url(addr, "/foo/bar")).with_attributes(json!({"foo": "bar"}));

    adapter.create(&model, &mut SyncOptions::new()).await.unwrap();

    let recorded = state.last_request().await.unwrap();
    assert_eq!(recorded.method, "POST");
    assert_eq!(recorded.header("content-length"), Some("13"));
    assert_eq!(recorded.header("content-type"), Some("application/json"));
    assert_eq!(recorded.body, json!({"foo": "bar"}));
    assert!(recorded.query.is_empty());
}

#[tokio::test]
async fn test_update_sends_model() {
    let (addr, state) = start().await;
    let adapter = SyncAdapter::new();
    let model = Model::new(url(addr, "/foo/bar")).with_attributes(json!({"foo": "bar", "n": 2}));

    adapter.update(&model, &mut SyncOptions::new()).await.unwrap();

    let recorded = state.last_request().await.unwrap();
    assert_eq!(recorded.method, "PUT");
    assert_eq!(recorded.body, json!({"foo": "bar", "n": 2}));
}

#[tokio::test]
async fn test_patch_sends_attrs() {
    let (addr, state) = start().await;
    let adapter = SyncAdapter::new();
    let model = Model::new(url(addr, "/foo/bar")).with_attributes(json!({"other": 1}));

    let mut options = SyncOptions::new().attrs(json!({"foo": "bar"}));
    adapter.patch(&model, &mut options).await.unwrap();

    let recorded = state.last_request().await.unwrap();
    assert_eq!(recorded.method, "PATCH");
    assert_eq!(recorded.header("content-length"), Some("13"));
    assert_eq!(recorded.body, json!({"foo": "bar"}));
}

#[tokio::test]
async fn test_create_error_carries_url() {
    let (addr, _state) = start().await;
    let adapter = SyncAdapter::new();
    let model = Model::new(url(addr, "/err")).with_attributes(json!({"foo": "bar"}));

    // /err only answers GET, so a POST is rejected by the router.
    let err = adapter
        .create(&model, &mut SyncOptions::new())
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(405));
    match err {
        SyncError::RemoteStatus { url: failed_url, .. } => {
            assert_eq!(failed_url, url(addr, "/err"));
        }
        other => panic!("expected RemoteStatus, got {:?}", other),
    }
}

// == Caching ==

#[tokio::test]
async fn test_cached_read_skips_the_network() {
    let (addr, state) = start().await;
    let cache = Arc::new(MemoryCache::new());
    let target = url(addr, "/foo/bar");
    cache
        .set(
            &format!("{}{{}}", target),
            r#"{"body":{"foo":"bar"},"headers":{}}"#.to_string(),
        )
        .await
        .unwrap();
    let adapter = SyncAdapter::builder().cache_client(cache).build();

    let mut options = SyncOptions::new().cache(true);
    let body = adapter
        .read(&Model::new(target), &mut options)
        .await
        .unwrap();

    assert_eq!(body, json!({"foo": "bar"}));
    assert!(state.last_request().await.is_none());
}

#[tokio::test]
async fn test_cache_miss_populates_then_hits() {
    let (addr, state) = start().await;
    let cache = Arc::new(MemoryCache::new());
    let adapter = SyncAdapter::builder()
        .config(SyncConfig::default().with_cache_ttl(60))
        .cache_client(cache.clone())
        .build();
    let model = Model::new(url(addr, "/headers"));

    let mut first = SyncOptions::new().cache(true);
    adapter.read(&model, &mut first).await.unwrap();
    assert!(!first.response.as_ref().unwrap().cached);
    assert_eq!(cache.len().await, 1);

    let mut second = SyncOptions::new().cache(true);
    let body = adapter.read(&model, &mut second).await.unwrap();

    assert_eq!(body, json!({"foo": "headers"}));
    let info = second.response.unwrap();
    assert!(info.cached);
    assert_eq!(info.headers["x-foo-bar"], "baz");
    // /headers does not record, and nothing else was hit.
    assert!(state.last_request().await.is_none());
}
