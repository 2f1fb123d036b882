//! Router-level integration tests for the PodView server.

mod auth_test;
mod dispatch_test;
mod events_test;
mod helpers;
mod plugins_test;
