//! Fixed-status demo routes. Each handler ignores the request entirely and
//! always produces the same response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

pub const OK_MESSAGE: &str = "Everything is awesome!";
pub const BAD_REQUEST_MESSAGE: &str = "This was a bad request";
pub const NOT_FOUND_MESSAGE: &str = "We couldn't find what you were looking for";

/// GET /okCode
pub async fn ok_code() -> Response {
    (StatusCode::OK, OK_MESSAGE).into_response()
}

/// GET /continueCode
///
/// hyper refuses to write a 1xx as a final response on a real socket and
/// answers 500 instead; in-process callers see the 100.
pub async fn continue_code() -> Response {
    StatusCode::CONTINUE.into_response()
}

/// GET /movedPermanently
pub async fn moved_permanently() -> Response {
    StatusCode::MOVED_PERMANENTLY.into_response()
}

/// GET /badRequest
pub async fn bad_request() -> Response {
    (StatusCode::BAD_REQUEST, BAD_REQUEST_MESSAGE).into_response()
}

/// GET /forbidden
pub async fn forbidden() -> Response {
    StatusCode::FORBIDDEN.into_response()
}

/// GET /notFound
pub async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE).into_response()
}

/// GET /proxyRequired
pub async fn proxy_required() -> Response {
    StatusCode::PROXY_AUTHENTICATION_REQUIRED.into_response()
}

/// Fallback for paths no route matches.
pub async fn route_not_found() -> Response {
    StatusCode::NOT_FOUND.into_response()
}
