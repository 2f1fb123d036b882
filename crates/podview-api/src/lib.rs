//! # podview-api
//!
//! HTTP API layer for PodView built on Axum.
//!
//! Provides the plugin administration endpoints, the event log and health
//! endpoints, the dispatcher that serves live plugin routes, middleware
//! (bearer auth, request logging), DTOs, and error mapping.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use middleware::auth::BearerTokenAuthenticator;
pub use router::{RESERVED_PATHS, build_router, reserved_patterns};
pub use state::AppState;
