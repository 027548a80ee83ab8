//! chainsign HTTP server: routes, request validation, and configuration on top
//! of `chainsign-core`.

pub mod api;
pub mod config;

pub use api::{router, ApiError, AppState};
pub use config::ServerConfig;
