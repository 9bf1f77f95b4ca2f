//! Luma API crate - axum HTTP server and route handlers.
//!
//! Exposes intent recording and interaction lookup over JSON, plus
//! read-only views of stored intents and groups and a health check.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::{create_router, start_server};
pub use state::AppState;
