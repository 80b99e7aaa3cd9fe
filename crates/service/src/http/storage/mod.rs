use axum::routing::get;
use axum::Router;

use crate::ServiceState;

pub mod read;
pub mod write;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route("/:bucket/*key", get(read::handler).put(write::handler))
        .with_state(state)
}
