//! # relay-api
//!
//! HTTP surface of the tenant relay built on Axum.
//!
//! Provides the WebSocket handshake (authorized before the upgrade), the
//! REST broadcast service, tenant reload, health, request logging, CORS,
//! and the mapping from [`AppError`](relay_core::AppError) to HTTP responses.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

#[cfg(test)]
mod test_support;

pub use app::{build_app, build_state};
pub use error::ApiError;
pub use state::AppState;
