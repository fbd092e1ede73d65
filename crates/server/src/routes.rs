use std::sync::Arc;

use axum::{routing::get, Json, Router};
use service::KvStore;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;

use crate::rpc;

/// Shared handler state: the one store connection opened at startup.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn KvStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }
}

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

pub fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Build the full application router: health, the `/trpc` link and the console assets.
pub fn build_router(state: AppState, static_dir: &str, cors: CorsLayer) -> Router {
    let index = format!("{}/index.html", static_dir.trim_end_matches('/'));
    let assets = ServeDir::new(static_dir).fallback(ServeFile::new(index));

    Router::new()
        .route("/health", get(health))
        .route("/trpc/:procs", get(rpc::handle_query).post(rpc::handle_mutation))
        .with_state(state)
        .fallback_service(assets)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // one INFO span per request, headers excluded
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                // status code and latency on response
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
