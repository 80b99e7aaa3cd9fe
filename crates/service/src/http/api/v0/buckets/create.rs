use axum::extract::{Json, State};
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::database::{valid_bucket_name, DatabaseError};
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequest {
    /// Globally unique bucket name
    pub name: String,

    /// Owning identity. Authentication is out of scope here; the upstream
    /// authorization layer attaches the caller identity before the request
    /// reaches this service.
    #[serde(default)]
    pub owner_id: Option<Uuid>,

    /// Buckets default to private
    #[serde(default)]
    pub is_public: Option<bool>,
}

pub async fn handler(
    State(state): State<ServiceState>,
    Json(req): Json<CreateRequest>,
) -> Result<Response, CreateError> {
    if !valid_bucket_name(&req.name) {
        return Err(CreateError::InvalidName(req.name));
    }

    let bucket = state
        .database()
        .create_bucket(
            &req.name,
            req.owner_id.unwrap_or_default(),
            req.is_public.unwrap_or(false),
        )
        .await
        .map_err(|e| match e {
            DatabaseError::DuplicateName(name) => CreateError::Duplicate(name),
            e => CreateError::Database(e),
        })?;

    Ok((StatusCode::OK, Json(bucket)).into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum CreateError {
    #[error("invalid bucket name: {0}")]
    InvalidName(String),
    #[error("a bucket named '{0}' already exists")]
    Duplicate(String),
    #[error("database error: {0}")]
    Database(DatabaseError),
}

impl IntoResponse for CreateError {
    fn into_response(self) -> Response {
        match self {
            CreateError::InvalidName(_) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "invalid_name" })),
            )
                .into_response(),
            CreateError::Duplicate(_) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "duplicated_entry" })),
            )
                .into_response(),
            CreateError::Database(e) => {
                tracing::error!("failed to create bucket: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Unexpected error".to_string(),
                )
                    .into_response()
            }
        }
    }
}
