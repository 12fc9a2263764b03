//! Server-side broadcast into existing rooms.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;

use relay_core::error::AppError;
use relay_realtime::message::ChannelSpec;

use crate::dto::request::BroadcastRequest;
use crate::dto::response::BroadcastResponse;
use crate::error::ApiError;
use crate::extractors::AdminAccess;
use crate::state::AppState;

/// POST /broadcast
///
/// A single channel whose room does not exist is a 404; with a list, the
/// missing rooms are skipped and `ack` drops to `0`.
pub async fn broadcast(
    State(state): State<AppState>,
    _admin: AdminAccess,
    body: Bytes,
) -> Result<Json<BroadcastResponse>, ApiError> {
    let request = BroadcastRequest::parse(&body)?;

    let tenant = match request.tenant.as_deref() {
        Some(id) => Some(
            state
                .broker
                .tenants()
                .get(id)
                .ok_or_else(|| AppError::not_found(format!("Unknown tenant {id}")))?,
        ),
        None => None,
    };

    let (channels, single) = match request.channel.clone() {
        Some(ChannelSpec::One(channel)) if !channel.trim().is_empty() => (vec![channel], true),
        Some(ChannelSpec::Many(channels)) if !channels.is_empty() => (channels, false),
        _ => {
            return Err(AppError::validation("Invalid Json Payload. Channel required").into());
        }
    };

    let event = request.event().to_string();
    let outcome = state
        .broker
        .broadcast(tenant.as_deref(), &event, &channels, request.data);

    if single && outcome.delivered.is_empty() {
        return Err(AppError::not_found(format!("No room found for {}", channels[0])).into());
    }

    Ok(Json(BroadcastResponse {
        timestamp: outcome.timestamp,
        ack: u8::from(outcome.missing.is_empty()),
        channel: outcome.delivered,
    }))
}
