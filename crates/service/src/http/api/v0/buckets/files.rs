use axum::extract::{Json, Path, Query, State};
use axum::response::{IntoResponse, Response};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::json;

use store::{ObjectEntry, StoreError};

use crate::ServiceState;

#[derive(Debug, Deserialize)]
pub struct FilesQuery {
    /// Limit results to keys below this prefix
    #[serde(default)]
    pub prefix: Option<String>,
    /// Base64-encoded continuation marker from a previous page
    #[serde(default)]
    pub cursor: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilesResponse {
    pub entries: Vec<ObjectEntry>,
    /// Opaque cursor for the next page, base64 on the wire
    pub next_cursor: Option<String>,
}

pub async fn handler(
    State(state): State<ServiceState>,
    Path(name): Path<String>,
    Query(query): Query<FilesQuery>,
) -> Result<Response, FilesError> {
    // Cursors travel base64-encoded; the engine takes the decoded form.
    let cursor = match &query.cursor {
        Some(encoded) => {
            let raw = STANDARD
                .decode(encoded)
                .map_err(|_| FilesError::InvalidCursor)?;
            Some(String::from_utf8(raw).map_err(|_| FilesError::InvalidCursor)?)
        }
        None => None,
    };

    let listing = state
        .store()
        .list(&name, query.prefix.as_deref(), cursor.as_deref())
        .await?;

    let next_cursor = listing.next_cursor.map(|c| STANDARD.encode(c));
    Ok((
        StatusCode::OK,
        Json(FilesResponse {
            entries: listing.entries,
            next_cursor,
        }),
    )
        .into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum FilesError {
    #[error("cursor is not valid base64")]
    InvalidCursor,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for FilesError {
    fn into_response(self) -> Response {
        match self {
            FilesError::InvalidCursor => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "invalid_cursor" })),
            )
                .into_response(),
            FilesError::Store(StoreError::BucketNotFound(_)) => {
                StatusCode::NOT_FOUND.into_response()
            }
            FilesError::Store(e) => {
                tracing::error!("failed to list bucket files: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Unexpected error".to_string(),
                )
                    .into_response()
            }
        }
    }
}
