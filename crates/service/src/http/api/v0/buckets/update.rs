use axum::extract::{Json, Path, State};
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::database::DatabaseError;
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    /// New visibility; only the flag is mutable after creation
    pub is_public: bool,
}

pub async fn handler(
    State(state): State<ServiceState>,
    Path(name): Path<String>,
    Json(req): Json<UpdateRequest>,
) -> Result<Response, UpdateError> {
    let bucket = state
        .database()
        .set_bucket_visibility(&name, req.is_public)
        .await?
        .ok_or(UpdateError::NotFound(name))?;

    Ok((StatusCode::OK, Json(bucket)).into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum UpdateError {
    #[error("bucket not found: {0}")]
    NotFound(String),
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),
}

impl IntoResponse for UpdateError {
    fn into_response(self) -> Response {
        match self {
            UpdateError::NotFound(_) => StatusCode::NOT_FOUND.into_response(),
            UpdateError::Database(e) => {
                tracing::error!("failed to update bucket: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Unexpected error".to_string(),
                )
                    .into_response()
            }
        }
    }
}
