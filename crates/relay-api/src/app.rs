//! Application builder: wires tenants, providers and the broker into an Axum app.

use std::sync::Arc;

use axum::Router;
use tracing::info;

use relay_auth::{AuthorizationChain, SelectiveProvider};
use relay_core::config::AppConfig;
use relay_core::result::AppResult;
use relay_realtime::Broker;
use relay_tenant::TenantRegistry;
use relay_tenant::store::JsonFileTenantStore;

use crate::router::build_router;
use crate::state::AppState;

/// Loads the tenant document, registers the authorization providers and
/// creates the broker.
pub async fn build_state(config: AppConfig) -> AppResult<AppState> {
    info!(path = %config.tenants.path, "Loading tenants");
    let store = Arc::new(JsonFileTenantStore::new(&config.tenants.path));
    let tenants = Arc::new(TenantRegistry::load(store).await?);

    let selector = SelectiveProvider::from_config(&config.auth)?;
    info!(schemes = ?selector.schemes(), "Authorization providers registered");

    let chain = Arc::new(AuthorizationChain::new(tenants, selector));
    let broker = Broker::new(config.broker.clone(), chain);

    Ok(AppState::new(config, broker))
}

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    build_router(state)
}
