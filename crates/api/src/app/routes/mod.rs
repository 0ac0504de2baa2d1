use axum::{Router, routing::get};

pub mod forms;
pub mod system;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/forms", forms::router())
}
