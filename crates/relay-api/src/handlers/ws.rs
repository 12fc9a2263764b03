//! WebSocket handshake and connection loop.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::http::HeaderMap;
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use tracing::{error, warn};

use relay_auth::HandshakeContext;
use relay_realtime::message::OutboundMessage;
use relay_realtime::message::serializer::serialize_frame;
use relay_tenant::Tenant;

use crate::error::ApiError;
use crate::state::AppState;

/// GET {ws_path}?tenant=..&token=..
///
/// The handshake is authorized before the upgrade; a rejected handshake is
/// answered with a plain HTTP error and no peer is created.
pub async fn ws_upgrade(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Result<Response, ApiError> {
    let mut ctx = HandshakeContext::new(query, header_map(&headers));
    let tenant = state.broker.authorize(&mut ctx).await.map_err(|e| {
        if e.is_rejection() {
            warn!(tenant = ?ctx.tenant(), reason = %e.message, "Handshake rejected");
        } else {
            error!(tenant = ?ctx.tenant(), error = %e, "Handshake failed");
        }
        e
    })?;

    Ok(ws.on_upgrade(move |socket| handle_socket(state, tenant, ctx, socket)))
}

fn header_map(headers: &HeaderMap) -> HashMap<String, String> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect()
}

/// Drives an established connection until either side closes it.
async fn handle_socket(
    state: AppState,
    tenant: Arc<Tenant>,
    ctx: HandshakeContext,
    socket: WebSocket,
) {
    let (peer, mut outbound_rx) = match state.broker.connect(tenant, ctx) {
        Ok(connected) => connected,
        Err(e) => {
            error!(error = %e, "Failed to attach peer");
            return;
        }
    };
    let conn_id = peer.conn_id();
    let (mut ws_tx, mut ws_rx) = socket.split();

    let mut writer = tokio::spawn(async move {
        while let Some(outbound) = outbound_rx.recv().await {
            match outbound {
                OutboundMessage::Frame(frame) => {
                    let text = match serialize_frame(&frame) {
                        Ok(text) => text,
                        Err(e) => {
                            warn!(conn_id = %conn_id, error = %e, "Dropping unserializable frame");
                            continue;
                        }
                    };
                    if ws_tx.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                OutboundMessage::Close => {
                    let _ = ws_tx.send(Message::Close(None)).await;
                    break;
                }
            }
        }
    });

    loop {
        tokio::select! {
            _ = &mut writer => break,
            inbound = ws_rx.next() => match inbound {
                Some(Ok(Message::Text(text))) => {
                    state.broker.handle_text(&conn_id, text.as_str()).await;
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(conn_id = %conn_id, error = %e, "WebSocket error");
                    break;
                }
            },
        }
    }

    writer.abort();
    state.broker.disconnect(&conn_id);
}
