use axum::routing::get;
use axum::Router;

use crate::ServiceState;

pub mod healthz;
pub mod readyz;
pub mod version;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route("/healthz", get(healthz::handler))
        .route("/readyz", get(readyz::handler))
        .route("/version", get(version::handler))
        .with_state(state)
}
