use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};

use crate::app::dto::PlansResponse;
use crate::context::IdentityContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// Public tier table: limits and gated features, for pricing pages.
pub async fn plans() -> impl IntoResponse {
    Json(PlansResponse::current())
}

pub async fn whoami(Extension(identity): Extension<IdentityContext>) -> impl IntoResponse {
    Json(serde_json::json!({
        "user_id": identity.user_id().as_str(),
        "tier": identity.tier(),
        "tier_defaulted": identity.tier_defaulted(),
        "limits": identity.tier().limits(),
    }))
}
