//! Route definitions for the relay HTTP API.

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the Axum router with all routes and middleware.
///
/// The WebSocket handshake is mounted at `server.ws_path`.
pub fn build_router(state: AppState) -> Router {
    let ws_path = state.config.server.ws_path.clone();
    let cors = middleware::cors::build_cors_layer(&state.config.server);

    let admin_routes = Router::new()
        .route("/broadcast", post(handlers::broadcast::broadcast))
        .route("/tenants/reload", post(handlers::tenants::reload));

    Router::new()
        .route(&ws_path, get(handlers::ws::ws_upgrade))
        .route("/health", get(handlers::health::health))
        .merge(admin_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}
