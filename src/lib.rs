pub mod config;
pub mod error;
pub mod router;
pub mod middleware;
pub mod handlers;
pub mod db;

pub use config::{Config, ServiceKind};
pub use error::GateError;
pub use router::{AppState, app_for};
