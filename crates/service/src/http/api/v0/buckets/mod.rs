use axum::routing::{get, put};
use axum::Router;

use crate::ServiceState;

pub mod create;
pub mod delete;
pub mod files;
pub mod list;
pub mod update;

// Re-export for convenience
pub use create::CreateRequest;
pub use files::FilesResponse;
pub use update::UpdateRequest;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route("/", get(list::handler).post(create::handler))
        .route("/:name", put(update::handler).delete(delete::handler))
        .route("/:name/files", get(files::handler))
        .with_state(state)
}
