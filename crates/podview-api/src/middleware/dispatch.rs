//! Serves plugin routes from the live route table.
//!
//! Runs in front of the host's own routes so an exact plugin route wins
//! over a parameterised admin route. The host's fixed paths are reserved
//! in the table, so plugins cannot shadow them.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::debug;

use podview_core::error::AppError;

use crate::error::ApiError;
use crate::state::AppState;

/// Looks up `(method, path)` in the route table on every request and
/// invokes the plugin handler when one is published.
pub async fn plugin_routes(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let Some(route) = state.routes.lookup(request.method(), request.uri().path()) else {
        return next.run(request).await;
    };

    if route.auth_required && state.auth.authenticate(request.headers()).is_none() {
        debug!(plugin = %route.owner, path = %request.uri().path(), "Rejected unauthenticated plugin request");
        return ApiError::from(AppError::authentication("Authentication required")).into_response();
    }

    debug!(plugin = %route.owner, method = %request.method(), path = %request.uri().path(), "Dispatching to plugin");
    (route.handler)(request).await
}
