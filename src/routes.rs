use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth;
use crate::handlers;
use crate::AppState;

pub fn build_router(state: AppState) -> Router {
    let analyze_routes = Router::new()
        .route("/api/analyze", post(handlers::analyze::analyze))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::rate_limit::rate_limit_analyze,
        ));

    let public_routes = Router::new()
        .route("/api/health", get(handlers::health::health_check))
        .route("/readyz", get(handlers::health::readyz))
        .merge(analyze_routes);

    let protected_routes = Router::new()
        .route(
            "/api/journal",
            get(handlers::journal::list_entries).post(handlers::journal::upsert_entry),
        )
        .route("/api/journal/:date", get(handlers::journal::get_entry))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::middleware::require_auth,
        ));

    let cors = cors_layer(&state);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(state: &AppState) -> CorsLayer {
    let config = &state.config;
    let allowed_origins: Vec<HeaderValue> = std::iter::once(&config.frontend_url)
        .chain(config.cors_extra_origins.iter())
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(hv) => Some(hv),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
}
