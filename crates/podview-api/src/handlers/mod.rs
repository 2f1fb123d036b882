//! Request handlers.

pub mod events;
pub mod fallback;
pub mod health;
pub mod plugins;
