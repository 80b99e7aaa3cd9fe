use axum::extract::{Json, Path, State};
use axum::response::{IntoResponse, Response};
use http::StatusCode;

use crate::database::DatabaseError;
use crate::ServiceState;

/// Deletion is final: the registry record goes away, but neither remote
/// objects nor cache entries under the name are purged.
pub async fn handler(
    State(state): State<ServiceState>,
    Path(name): Path<String>,
) -> Result<Response, DeleteError> {
    let bucket = state
        .database()
        .delete_bucket(&name)
        .await?
        .ok_or(DeleteError::NotFound(name))?;

    Ok((StatusCode::OK, Json(bucket)).into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum DeleteError {
    #[error("bucket not found: {0}")]
    NotFound(String),
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),
}

impl IntoResponse for DeleteError {
    fn into_response(self) -> Response {
        match self {
            DeleteError::NotFound(_) => StatusCode::NOT_FOUND.into_response(),
            DeleteError::Database(e) => {
                tracing::error!("failed to delete bucket: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Unexpected error".to_string(),
                )
                    .into_response()
            }
        }
    }
}
