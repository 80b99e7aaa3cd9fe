use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use http::StatusCode;

use store::StoreError;

use crate::http::content_type;
use crate::ServiceState;

/// Serve object bytes. Cache hits never touch the remote backend; a key
/// the backend does not know maps to 404, not a server error.
pub async fn handler(
    State(state): State<ServiceState>,
    Path((bucket, key)): Path<(String, String)>,
) -> Result<Response, ReadError> {
    let body = state
        .store()
        .read(&bucket, &key)
        .await?
        .ok_or(ReadError::NotFound)?;

    let content_type = content_type::resolve(&key, &body);
    Ok((
        StatusCode::OK,
        [(http::header::CONTENT_TYPE, content_type)],
        body,
    )
        .into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("object not found")]
    NotFound,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for ReadError {
    fn into_response(self) -> Response {
        match self {
            ReadError::NotFound | ReadError::Store(StoreError::BucketNotFound(_)) => {
                StatusCode::NOT_FOUND.into_response()
            }
            ReadError::Store(StoreError::InvalidKey(_)) => StatusCode::BAD_REQUEST.into_response(),
            ReadError::Store(e) => {
                tracing::error!("failed to read object: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}
