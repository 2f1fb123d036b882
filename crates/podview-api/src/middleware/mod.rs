//! HTTP middleware.

pub mod auth;
pub mod dispatch;
pub mod logging;
