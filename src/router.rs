use std::sync::Arc;

use axum::{Router, middleware, routing::get};
use tower_http::trace::TraceLayer;

use crate::config::{Config, ServiceKind};
use crate::db::UsersStorage;
use crate::handlers::status_codes::{
    bad_request, continue_code, forbidden, moved_permanently, not_found, ok_code, proxy_required,
    route_not_found,
};
use crate::handlers::users::{create_user, list_users};
use crate::middleware::require_api_key;

/// Read-only state shared by every request.
#[derive(Clone, Debug, Default)]
pub struct AppState {
    api_key: Option<Arc<str>>,
    database_url: Option<Arc<str>>,
}

impl AppState {
    pub fn new(api_key: Option<&str>, database_url: Option<&str>) -> Self {
        Self {
            api_key: api_key.map(Arc::from),
            database_url: database_url.map(Arc::from),
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(cfg.api_key.as_deref(), cfg.default_connection.as_deref())
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn users_storage(&self) -> Option<UsersStorage> {
        self.database_url.clone().map(UsersStorage::new)
    }
}

fn fixed_status_routes() -> Router<AppState> {
    Router::new()
        .route("/okCode", get(ok_code))
        .route("/continueCode", get(continue_code))
        .route("/movedPermanently", get(moved_permanently))
        .route("/badRequest", get(bad_request))
        .route("/forbidden", get(forbidden))
        .route("/notFound", get(not_found))
        .route("/proxyRequired", get(proxy_required))
}

/// The gate wraps the fallback as well, so unknown paths are also checked first.
fn gated(routes: Router<AppState>, state: AppState) -> Router {
    routes
        .fallback(route_not_found)
        .layer(middleware::from_fn_with_state(state.clone(), require_api_key))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Fixed status routes behind the API-key gate.
pub fn codes_router(state: AppState) -> Router {
    gated(fixed_status_routes(), state)
}

/// `/users` plus `/okCode`, behind the API-key gate.
pub fn users_router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/okCode", get(ok_code))
        .route("/users", get(list_users).post(create_user));
    gated(routes, state)
}

/// Fixed status routes with no gate.
pub fn swagger_router() -> Router {
    fixed_status_routes()
        .fallback(route_not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(AppState::default())
}

pub fn app_for(cfg: &Config) -> Router {
    let state = AppState::from_config(cfg);
    match cfg.service {
        ServiceKind::Codes => codes_router(state),
        ServiceKind::Users => users_router(state),
        ServiceKind::Swagger => swagger_router(),
    }
}
