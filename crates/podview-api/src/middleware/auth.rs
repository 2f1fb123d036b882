//! Bearer-token authentication.

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::{debug, warn};

use podview_core::error::AppError;
use podview_core::traits::Authenticator;

use crate::error::ApiError;
use crate::state::AppState;

/// Principal reported when authentication is disabled.
pub const ANONYMOUS: &str = "anonymous";

/// Principal reported for a valid admin token.
pub const ADMIN: &str = "admin";

/// Authenticated caller, inserted as a request extension by
/// [`require_auth`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal(pub String);

/// Accepts `Authorization: Bearer <token>` matching a single configured
/// token. With no token configured every request is accepted.
#[derive(Clone)]
pub struct BearerTokenAuthenticator {
    token: Option<String>,
}

impl BearerTokenAuthenticator {
    /// Creates the authenticator. Blank tokens count as absent.
    pub fn new(token: Option<String>) -> Self {
        let token = token.filter(|t| !t.trim().is_empty());
        if token.is_none() {
            warn!("No admin token configured, API authentication is disabled");
        }
        Self { token }
    }

    /// Whether requests are checked at all.
    pub fn is_enabled(&self) -> bool {
        self.token.is_some()
    }
}

impl std::fmt::Debug for BearerTokenAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BearerTokenAuthenticator")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

impl Authenticator for BearerTokenAuthenticator {
    fn authenticate(&self, headers: &HeaderMap) -> Option<String> {
        let Some(expected) = &self.token else {
            return Some(ANONYMOUS.to_string());
        };

        let presented = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))?;

        constant_time_eq(presented.trim().as_bytes(), expected.as_bytes())
            .then(|| ADMIN.to_string())
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Rejects requests the configured [`Authenticator`] does not accept.
pub async fn require_auth(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    match state.auth.authenticate(request.headers()) {
        Some(principal) => {
            request.extensions_mut().insert(Principal(principal));
            next.run(request).await
        }
        None => {
            debug!(path = %request.uri().path(), "Rejected unauthenticated request");
            ApiError::from(AppError::authentication("Authentication required")).into_response()
        }
    }
}
