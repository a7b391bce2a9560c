use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum GateError {
    #[error("missing or invalid API key")]
    Unauthorized,

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("Database connection is not configured.")]
    DatabaseNotConfigured,

    #[error("failed to fetch users: {0}")]
    FetchUsers(#[source] SqlxError),

    #[error("failed to create user {username}: {source}")]
    CreateUser {
        username: String,
        #[source]
        source: SqlxError,
    },

    #[error("insert returned no id")]
    UserNotCreated,
}

impl GateError {
    pub fn validation(message: impl Into<String>) -> Self {
        GateError::Validation(message.into())
    }

    /// Caller-facing text; never the source error.
    fn public_detail(&self) -> &'static str {
        match self {
            GateError::DatabaseNotConfigured => "Database connection is not configured.",
            GateError::FetchUsers(_) => "An error occurred while fetching users.",
            GateError::CreateUser { .. } => "An error occurred while creating the user.",
            GateError::UserNotCreated => "Failed to create user.",
            GateError::Unauthorized | GateError::Validation(_) => {
                "An internal server error occurred."
            }
        }
    }
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        match self {
            GateError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                "Unauthorized",
            )
                .into_response(),
            GateError::Validation(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            other => ProblemDetails::internal(other.public_detail()).into_response(),
        }
    }
}

/// Problem body returned for every server-side failure.
#[derive(Debug, Serialize)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub title: &'static str,
    pub status: u16,
    pub detail: String,
}

impl ProblemDetails {
    pub fn internal(detail: impl Into<String>) -> Self {
        Self {
            kind: "https://tools.ietf.org/html/rfc9110#section-15.6.1",
            title: "An error occurred while processing your request.",
            status: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            detail: detail.into(),
        }
    }
}

impl IntoResponse for ProblemDetails {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut resp = (status, Json(self)).into_response();
        resp.headers_mut().insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/problem+json"),
        );
        resp
    }
}
