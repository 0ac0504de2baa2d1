use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use chrono::Utc;

use formgate_auth::validate_schema_features;
use formgate_core::FormId;
use formgate_infra::FormRecord;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::IdentityContext;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_form).get(list_forms))
        .route("/validate", post(validate_schema))
}

/// Store a form definition owned by the caller.
///
/// Order: provision the owner's shadow identity, gate the schema's features,
/// then write if the plan's form quota allows it.
pub async fn create_form(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<IdentityContext>,
    Json(body): Json<dto::CreateFormRequest>,
) -> axum::response::Response {
    if body.title.trim().is_empty() {
        return errors::json_error(StatusCode::BAD_REQUEST, "validation_error", "title must not be empty");
    }

    if let Err(e) = services.syncer.ensure_identity(identity.user_id().as_str()).await {
        return errors::sync_error_to_response(e);
    }

    if let Err(e) = validate_schema_features(&body.schema, identity.tier()) {
        tracing::info!(user_id = %identity.user_id(), tier = %identity.tier(), denial = %e, "schema feature gate denied");
        return errors::feature_gate_to_response(e);
    }

    let record = FormRecord {
        id: FormId::new(),
        owner_id: identity.user_id().clone(),
        title: body.title,
        schema: body.schema,
        created_at: Utc::now(),
    };
    if let Err(e) = services.forms.insert_within_quota(record.clone(), identity.tier()) {
        return errors::form_store_to_response(e);
    }

    (StatusCode::CREATED, Json(dto::FormResponse::from(record))).into_response()
}

pub async fn list_forms(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<IdentityContext>,
) -> axum::response::Response {
    match services.forms.list_by_owner(identity.user_id()) {
        Ok(forms) => {
            let forms: Vec<dto::FormResponse> = forms.into_iter().map(dto::FormResponse::from).collect();
            Json(serde_json::json!({ "forms": forms })).into_response()
        }
        Err(e) => errors::form_store_to_response(e),
    }
}

/// Feature-gate a schema without storing it (editor preview).
pub async fn validate_schema(
    Extension(identity): Extension<IdentityContext>,
    Json(body): Json<dto::ValidateSchemaRequest>,
) -> axum::response::Response {
    match validate_schema_features(&body.schema, identity.tier()) {
        Ok(()) => Json(serde_json::json!({ "valid": true, "tier": identity.tier() })).into_response(),
        Err(e) => errors::feature_gate_to_response(e),
    }
}
