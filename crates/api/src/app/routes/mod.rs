use axum::{routing::get, Router};

pub mod stores;
pub mod system;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/stores", stores::router())
}
