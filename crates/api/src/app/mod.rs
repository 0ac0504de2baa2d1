//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: infrastructure wiring (identity repository, syncer, form store)
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use formgate_auth::VerifierConfig;
use formgate_infra::AppConfig;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router from process configuration (entrypoint used by `main.rs`).
pub async fn build_app(config: &AppConfig) -> anyhow::Result<Router> {
    let services = services::build_services(config.database_url.as_deref()).await?;
    Ok(build_router(config.verifier.clone(), services))
}

/// Assemble the router around already-built services.
pub fn build_router(verifier: VerifierConfig, services: services::AppServices) -> Router {
    let auth_state = middleware::AuthState {
        verifier: Arc::new(verifier),
    };

    // Protected routes: require a verified identity assertion.
    let protected = routes::router()
        .layer(Extension(Arc::new(services)))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .route("/plans", get(routes::system::plans))
        .merge(protected)
        .layer(ServiceBuilder::new())
}
