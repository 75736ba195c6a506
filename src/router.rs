use axum::{
    routing::{get, put},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

use crate::config::Config;
use crate::handlers::{self, AppState};
use crate::openapi;

/// Lead payloads are small forms; 1 MiB is plenty.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Lead endpoints plus, outside production, the API docs.
///
/// The server binary adds rate limiting on top of these routes.
pub fn api_routes(config: &Config) -> Router<Arc<AppState>> {
    let routes = Router::new()
        .route(
            "/leads",
            get(handlers::query_leads).post(handlers::create_lead),
        )
        .route(
            "/leads/:id",
            get(handlers::get_lead).delete(handlers::delete_lead),
        )
        .route("/leads/:id/accept", put(handlers::accept_lead))
        .route("/leads/:id/decline", put(handlers::decline_lead));

    if config.docs_enabled() {
        routes
            .route("/docs", get(openapi::serve_swagger_ui))
            .route("/api-docs/openapi.json", get(openapi::serve_openapi_spec))
    } else {
        routes
    }
}

/// Adds the health check and the shared middleware around `api`.
pub fn build_app(state: Arc<AppState>, api: Router<Arc<AppState>>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .merge(api)
        .layer(ServiceBuilder::new().layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES)))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        // The browser front-end is served from a different origin
        .layer(CorsLayer::permissive())
}

/// Full application without rate limiting.
pub fn build_router(state: Arc<AppState>) -> Router {
    let api = api_routes(&state.config);
    build_app(state, api)
}
