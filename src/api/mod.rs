use axum::{
    Router,
    extract::{Query, rejection::QueryRejection},
    http::HeaderValue,
    middleware,
    routing::{delete, get, post},
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::state::SharedState;

pub mod accounts;
pub mod cities;
mod diagnostics;
mod error;
mod extract;
mod observability;
pub mod parking_spots;
pub mod streets;
mod types;
mod validation;

pub use error::ApiError;
pub use extract::JsonBody;
pub use types::*;

use crate::services::AccountService;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

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
    pub fn account_service(&self) -> &Arc<dyn AccountService> {
        &self.shared.account_service
    }
}

pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
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

/// `?id=` for reference-data GET/DELETE.
#[derive(Debug, Deserialize)]
pub struct IdQuery {
    pub id: Option<i32>,
}

/// Id from the JSON body, falling back to the query string.
fn lookup_id(
    query: Result<Query<IdQuery>, QueryRejection>,
    body_id: Option<i32>,
) -> Result<Option<i32>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::validation(e.body_text()))?;
    body_id
        .or(query.id)
        .map(|id| validation::validate_id(id, "id"))
        .transpose()
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config().server.cors_allowed_origins.clone();

    let api_router: Router<Arc<AppState>> = Router::new()
        .route("/signup/", post(accounts::signup))
        .route("/login/", post(accounts::login))
        .route("/delete-user/", delete(accounts::delete_user))
        .route(
            "/edit-user/",
            get(accounts::get_user).put(accounts::edit_user),
        )
        .route(
            "/slovenska-mesta/",
            get(cities::get_cities)
                .post(cities::create_city)
                .put(cities::update_city)
                .delete(cities::delete_city),
        )
        .route(
            "/slovenske-ulice/",
            get(streets::get_streets)
                .post(streets::create_street)
                .put(streets::update_street)
                .delete(streets::delete_street),
        )
        .route(
            "/parkirna-mesta/",
            get(parking_spots::get_parking_spots)
                .post(parking_spots::create_parking_spot)
                .put(parking_spots::update_parking_spot)
                .delete(parking_spots::delete_parking_spot),
        )
        .route(
            "/test/",
            get(diagnostics::list_users).post(diagnostics::echo),
        );

    let cors_layer = if cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .route("/metrics", get(observability::get_metrics))
        .route_layer(middleware::from_fn(
            observability::request_metrics_middleware,
        ))
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(middleware::from_fn(observability::security_headers_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
