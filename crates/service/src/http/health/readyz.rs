use axum::extract::State;
use axum::response::{IntoResponse, Response};
use http::StatusCode;

use crate::ServiceState;

/// Readiness means the registry database can answer queries.
pub async fn handler(State(state): State<ServiceState>) -> Response {
    match sqlx::query("SELECT 1")
        .fetch_one(state.database().pool())
        .await
    {
        Ok(_) => (StatusCode::OK, "ready").into_response(),
        Err(e) => {
            tracing::error!("readiness probe failed: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "not ready").into_response()
        }
    }
}
