use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use subtle::ConstantTimeEq;
use tracing::debug;

use crate::error::GateError;
use crate::router::AppState;

/// Header carrying the caller's credential. Header lookup is case-insensitive.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Check the `X-API-Key` header against the expected key.
///
/// An absent header, a non-UTF-8 value, a mismatch, and an unconfigured key
/// all reject the same way.
pub fn ensure_authorized(headers: &HeaderMap, expected: Option<&str>) -> Result<(), GateError> {
    let Some(expected) = expected else {
        return Err(GateError::Unauthorized);
    };

    if let Some(provided) = headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok())
        && bool::from(provided.as_bytes().ct_eq(expected.as_bytes()))
    {
        return Ok(());
    }

    Err(GateError::Unauthorized)
}

/// Gate applied in front of every route of a protected router.
/// Forwards the request untouched or answers 401 without calling `next`.
pub async fn require_api_key(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, GateError> {
    if let Err(rejection) = ensure_authorized(req.headers(), state.api_key()) {
        debug!(path = %req.uri().path(), "rejected request without a valid API key");
        return Err(rejection);
    }
    Ok(next.run(req).await)
}
