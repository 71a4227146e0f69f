use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{get, patch, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::state::SharedState;

pub mod auth;
mod error;
mod extract;
pub mod items;
mod observability;
pub mod requests;
mod system;
mod types;
pub mod users;
mod validation;

pub use error::{ApiError, PERSISTENCE_FAILURE_MESSAGE};
pub use extract::{ApiJson, ApiPath};
pub use types::*;
pub use validation::MIN_PASSWORD_LEN;

use crate::services::{AuthService, ItemService, RequestService, UserService};
use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn auth_service(&self) -> &Arc<dyn AuthService> {
        &self.shared.auth_service
    }

    #[must_use]
    pub fn user_service(&self) -> &Arc<dyn UserService> {
        &self.shared.user_service
    }

    #[must_use]
    pub fn item_service(&self) -> &Arc<dyn ItemService> {
        &self.shared.item_service
    }

    #[must_use]
    pub fn request_service(&self) -> &Arc<dyn RequestService> {
        &self.shared.request_service
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config().server.cors_allowed_origins.clone();

    let public_routes = Router::new()
        .route("/login/", post(auth::login))
        .route("/register/", post(auth::register))
        .route("/health", get(system::health));

    let api_router = Router::new()
        .merge(public_routes)
        .merge(create_member_router(state.clone()))
        .merge(create_admin_router(state.clone()))
        .with_state(state);

    let cors_layer = if cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    // The request span must be current inside `authenticate`, which fills in
    // its `user_id`.
    api_router
        .layer(middleware::from_fn(observability::logging_middleware))
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

/// Routes any authenticated caller may use.
fn create_member_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/items/", get(items::list_items))
        .route("/items/{id}/", get(items::get_item))
        .route("/requests/", get(requests::list_requests))
        .route("/requests/", post(requests::create_request))
        .route("/requests/{id}/", get(requests::get_request))
        .route_layer(middleware::from_fn_with_state(state, auth::authenticate))
}

/// Routes that additionally require the admin role.
fn create_admin_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/users/", get(users::list_users).post(users::create_user))
        .route("/users/{id}", get(users::get_user).delete(users::delete_user))
        .route("/users/{id}/role", patch(users::update_role))
        .route("/items/", post(items::create_item))
        .route(
            "/items/{id}/",
            patch(items::update_item).delete(items::delete_item),
        )
        .route(
            "/requests/{id}/",
            patch(requests::update_request).delete(requests::delete_request),
        )
        .route("/metrics", get(observability::get_metrics))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_admin,
        ))
        .route_layer(middleware::from_fn_with_state(state, auth::authenticate))
}
