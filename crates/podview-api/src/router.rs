//! Route definitions for the PodView HTTP API.
//!
//! Host routes are mounted under `/api`. Plugin routes never appear in the
//! axum router; they are served by the dispatch middleware from the live
//! route table.

use std::any::Any;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::{Method, StatusCode};
use axum::middleware as axum_middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use crate::error::ApiErrorResponse;
use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Fixed host paths that plugins may not publish routes on.
pub const RESERVED_PATHS: &[&str] = &["/api/plugins", "/api/events", "/api/health"];

/// Parameterised admin routes that plugin routes may not shadow. `*` is one
/// path segment.
pub fn reserved_patterns() -> Vec<(Method, &'static str)> {
    vec![
        (Method::GET, "/api/plugins/*"),
        (Method::POST, "/api/plugins/*/toggle"),
    ]
}

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let max_body = state.config.server.max_body_bytes;

    let api_routes = Router::new()
        .merge(admin_routes(state.clone()))
        .merge(health_routes());

    Router::new()
        .nest("/api", api_routes)
        .fallback(handlers::fallback::not_found)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::dispatch::plugin_routes,
        ))
        .layer(DefaultBodyLimit::max(max_body))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Plugin administration and event log, behind authentication.
fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/plugins", get(handlers::plugins::list_plugins))
        .route("/plugins/{name}", get(handlers::plugins::get_plugin))
        .route("/plugins/{name}/toggle", post(handlers::plugins::toggle_plugin))
        .route("/events", get(handlers::events::list_events))
        .route_layer(axum_middleware::from_fn_with_state(
            state,
            middleware::auth::require_auth,
        ))
}

/// Unauthenticated liveness probe.
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

/// Converts a handler panic into a 500 with the standard error body.
fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!(panic = %detail, "Request handler panicked");

    let body = ApiErrorResponse {
        error: "INTERNAL_ERROR".to_string(),
        message: "Internal server error".to_string(),
    };
    (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(body)).into_response()
}
