use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use http::StatusCode;

use store::StoreError;

use crate::ServiceState;

/// Accept object bytes and upload them write-through to the remote
/// backend. The disk cache is not updated; a reader holding a cached copy
/// keeps seeing the previous bytes until the entry is cleared.
pub async fn handler(
    State(state): State<ServiceState>,
    Path((bucket, key)): Path<(String, String)>,
    body: Bytes,
) -> Result<Response, WriteError> {
    state.store().write(&bucket, &key, body).await?;
    Ok(StatusCode::CREATED.into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for WriteError {
    fn into_response(self) -> Response {
        match self {
            WriteError::Store(StoreError::BucketNotFound(_)) => {
                StatusCode::NOT_FOUND.into_response()
            }
            WriteError::Store(StoreError::InvalidKey(_)) => StatusCode::BAD_REQUEST.into_response(),
            WriteError::Store(e) => {
                tracing::error!("failed to write object: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}
