//! Spectacle host server library logic.
//!
//! Exposes the forwarding pipeline over HTTP: `POST /collect` takes a tag
//! configuration and event data, runs the invocation and answers with its
//! outcome, translating identity cookie writes into `Set-Cookie` headers.

pub mod api;
pub mod config;
pub mod cookies;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Extension, Json, Router,
};
use config::TagDefaults;
use serde_json::{json, Value};
use spectacle_forwarder::Forwarder;
use spectacle_types::ContainerVersion;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The forwarding pipeline.
    pub forwarder: Forwarder,
    /// Defaults for blank tag fields.
    pub tag_defaults: TagDefaults,
    /// Container mode reported to the console log policy.
    pub container: ContainerVersion,
}

/// Maximum request body size (256 KiB).
const MAX_REQUEST_BODY_BYTES: usize = 256 * 1024;

/// Health check handler.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/collect", post(api::collect_handler))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(Arc::new(state)))
}
