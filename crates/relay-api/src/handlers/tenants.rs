//! Tenant document administration.

use axum::Json;
use axum::extract::State;
use tracing::info;

use crate::dto::response::ReloadResponse;
use crate::error::ApiError;
use crate::extractors::AdminAccess;
use crate::state::AppState;

/// POST /tenants/reload
///
/// Re-reads the tenant document. Runtime tenant overrides are discarded.
pub async fn reload(
    State(state): State<AppState>,
    _admin: AdminAccess,
) -> Result<Json<ReloadResponse>, ApiError> {
    let tenants = state.broker.tenants().reload().await?;
    info!(tenants, "Tenant document reloaded");
    Ok(Json(ReloadResponse { tenants }))
}
