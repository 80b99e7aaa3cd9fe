use axum::extract::{Json, State};
use axum::response::{IntoResponse, Response};
use http::StatusCode;

use crate::database::DatabaseError;
use crate::ServiceState;

pub async fn handler(State(state): State<ServiceState>) -> Result<Response, ListError> {
    let buckets = state.database().list_buckets().await?;
    Ok((StatusCode::OK, Json(buckets)).into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum ListError {
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),
}

impl IntoResponse for ListError {
    fn into_response(self) -> Response {
        let ListError::Database(e) = self;
        tracing::error!("failed to list buckets: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Unexpected error".to_string(),
        )
            .into_response()
    }
}
