//! Fixture Routes
//!
//! Configures the Axum router for the fixture server.

use std::net::SocketAddr;

use axum::{
    routing::{any, get},
    Router,
};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::error;

use super::handlers::{
    custom_url_handler, err_handler, foo_bar_handler, headers_handler, pass_headers_handler,
    slow_handler, FixtureState,
};

/// Creates the fixture router.
///
/// # Endpoints
/// - `ANY /foo/bar` - Records the request, answers `{"foo":"bar"}`
/// - `ANY /custom/url` - Records the request, answers `{"baz":"qux"}`
/// - `GET /err` - 404 with `{"message":"Not Found"}`
/// - `GET /headers` - Answers with an `X-Foo-Bar: baz` header
/// - `GET /passheaders` - Echoes request headers
/// - `GET /slow?ms=N` - Answers after N milliseconds
pub fn create_router(state: FixtureState) -> Router {
    Router::new()
        .route("/foo/bar", any(foo_bar_handler))
        .route("/custom/url", any(custom_url_handler))
        .route("/err", get(err_handler))
        .route("/headers", get(headers_handler))
        .route("/passheaders", get(pass_headers_handler))
        .route("/slow", get(slow_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves a fresh fixture router on an ephemeral localhost port.
///
/// Returns the bound address, the state to inspect recorded requests, and the
/// server task handle.
pub async fn spawn_fixture_server(
) -> std::io::Result<(SocketAddr, FixtureState, JoinHandle<()>)> {
    let state = FixtureState::new();
    let listener = TcpListener::bind(("127.0.0.1", 0)).await?;
    let addr = listener.local_addr()?;
    let app = create_router(state.clone());

    let handle = tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, app).await {
            error!("Fixture server stopped: {}", err);
        }
    });

    Ok((addr, state, handle))
}
