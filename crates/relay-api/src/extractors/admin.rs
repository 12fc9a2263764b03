//! Admin key extractor guarding the server-side endpoints.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use relay_core::error::AppError;

use crate::error::ApiError;
use crate::state::AppState;

/// Proof that the request carried the configured admin key.
///
/// When `server.admin_key` is unset every request passes.
#[derive(Debug, Clone, Copy)]
pub struct AdminAccess;

impl FromRequestParts<AppState> for AdminAccess {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.config.server.admin_key.as_deref() else {
            return Ok(Self);
        };

        let provided = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim);

        match provided {
            Some(key) if key == expected => Ok(Self),
            Some(_) => Err(AppError::authorization("Invalid admin key").into()),
            None => Err(AppError::authentication("Missing admin key").into()),
        }
    }
}
