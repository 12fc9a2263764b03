//! Shared application state passed to all handlers.

use std::sync::Arc;
use std::time::Instant;

use relay_core::config::AppConfig;
use relay_realtime::Broker;

/// Application state shared across every Axum handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// The broker owning tenants, peers and rooms.
    pub broker: Broker,
    /// Process start, for uptime reporting.
    pub started_at: Instant,
}

impl AppState {
    /// Creates the state.
    pub fn new(config: AppConfig, broker: Broker) -> Self {
        Self {
            config: Arc::new(config),
            broker,
            started_at: Instant::now(),
        }
    }
}
