//! HTTP handlers and routers for the service.

pub mod api;
pub mod content_type;
pub mod health;
pub mod storage;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use http::header::{ACCEPT, ORIGIN};
use http::Method;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultOnFailure, DefaultOnResponse, TraceLayer};
use tower_http::LatencyUnit;

use crate::ServiceState;

const API_PREFIX: &str = "/api/v0";
const STATUS_PREFIX: &str = "/_status";
const STORAGE_PREFIX: &str = "/storage";

/// Maximum upload size in bytes (64 MB)
pub const MAX_UPLOAD_SIZE_BYTES: usize = 64 * 1024 * 1024;

/// Build the full service router.
pub fn router(state: ServiceState) -> Router {
    let cors_layer = CorsLayer::new()
        .allow_methods(vec![Method::GET])
        .allow_headers(vec![ACCEPT, ORIGIN])
        .allow_origin(Any)
        .allow_credentials(false);

    let trace_layer = TraceLayer::new_for_http()
        .on_response(
            DefaultOnResponse::new()
                .include_headers(false)
                .latency_unit(LatencyUnit::Micros),
        )
        .on_failure(DefaultOnFailure::new().latency_unit(LatencyUnit::Micros));

    Router::new()
        .nest(STATUS_PREFIX, health::router(state.clone()))
        .nest(
            &format!("{}/buckets", API_PREFIX),
            api::v0::buckets::router(state.clone()),
        )
        .nest(STORAGE_PREFIX, storage::router(state.clone()))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE_BYTES))
        .with_state(state)
        .layer(cors_layer)
        .layer(trace_layer)
}
