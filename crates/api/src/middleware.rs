use std::sync::Arc;

use axum::{
    extract::State,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use formgate_auth::signature::{HEADER_PLAN_TIER, HEADER_SIGNATURE, HEADER_TIMESTAMP, HEADER_USER_ID};
use formgate_auth::{SignedHeaders, VerifierConfig, verify};

use crate::app::errors;
use crate::context::IdentityContext;

#[derive(Clone)]
pub struct AuthState {
    pub verifier: Arc<VerifierConfig>,
}

/// Verify the frontend's signed identity headers.
///
/// Every failure produces the same 401 body; the specific reason is only
/// written to the server log.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let headers = req.headers();
    let signed = SignedHeaders {
        user_id: header_str(headers, HEADER_USER_ID),
        timestamp: header_str(headers, HEADER_TIMESTAMP),
        signature: header_str(headers, HEADER_SIGNATURE),
        plan_tier: header_str(headers, HEADER_PLAN_TIER),
    };

    let verified = match verify(&signed, &state.verifier) {
        Ok(v) => v,
        Err(failure) => {
            tracing::warn!(
                reason = failure.reason(),
                user_id = signed.user_id.unwrap_or(""),
                path = %req.uri().path(),
                "signed identity rejected"
            );
            return Err(errors::unauthorized());
        }
    };

    if verified.tier_defaulted() {
        tracing::warn!(
            user_id = %verified.user_id,
            tier = %verified.tier,
            "no plan tier asserted; defaulting to lowest tier"
        );
    }

    req.extensions_mut().insert(IdentityContext::from(verified));
    Ok(next.run(req).await)
}

/// Header value as text; non-UTF-8 and missing headers both read as absent.
fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
