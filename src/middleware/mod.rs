pub mod auth;

pub use auth::{API_KEY_HEADER, ensure_authorized, require_api_key};
