//! HTTP surface: TMDB proxy, cache control, and entitlement checks.

pub mod routes;
pub mod server;

pub use server::{build_router, start_server, AppState};
