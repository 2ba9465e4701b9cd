//! Fixture Server Module
//!
//! A small HTTP server with canned endpoints for exercising sync calls.
//!
//! # Endpoints
//! - `ANY /foo/bar`, `ANY /custom/url` - Recording endpoints
//! - `GET /err` - Always 404
//! - `GET /headers`, `GET /passheaders` - Header round trips
//! - `GET /slow` - Delayed response for timeout checks

pub mod handlers;
pub mod routes;

pub use handlers::{FixtureState, RecordedRequest};
pub use routes::{create_router, spawn_fixture_server};
