use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use formgate_auth::{FeatureGateError, SyncError};
use formgate_core::QuotaExceeded;
use formgate_infra::FormStoreError;

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// The single response for every signature verification failure.
pub fn unauthorized() -> axum::response::Response {
    json_error(StatusCode::UNAUTHORIZED, "unauthorized", "unauthorized")
}

/// Feature gate denials carry the feature and required tier for upgrade prompts.
pub fn feature_gate_to_response(err: FeatureGateError) -> axum::response::Response {
    let message = err.to_string();
    let status = match err {
        FeatureGateError::FeatureNotAvailable { .. } => StatusCode::FORBIDDEN,
        FeatureGateError::SchemaTooDeep { .. } => StatusCode::UNPROCESSABLE_ENTITY,
    };
    let mut body = serde_json::to_value(&err).unwrap_or_else(|_| json!({}));
    body["message"] = json!(message);
    (status, axum::Json(body)).into_response()
}

pub fn quota_to_response(err: QuotaExceeded) -> axum::response::Response {
    (
        StatusCode::FORBIDDEN,
        axum::Json(json!({
            "error": "quota_exceeded",
            "message": err.to_string(),
            "resource": err.resource,
            "limit": err.limit,
            "tier": err.tier,
        })),
    )
        .into_response()
}

pub fn sync_error_to_response(err: SyncError) -> axum::response::Response {
    match err {
        SyncError::InvalidInput(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_input", msg),
        SyncError::Storage(e) => {
            tracing::error!(error = %e, "identity provisioning failed");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "storage_error", "identity provisioning failed")
        }
    }
}

pub fn form_store_to_response(err: FormStoreError) -> axum::response::Response {
    match err {
        FormStoreError::Quota(e) => quota_to_response(e),
        FormStoreError::Storage(msg) => {
            tracing::error!(error = %msg, "form storage failed");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "storage_error", "form storage failed")
        }
    }
}
