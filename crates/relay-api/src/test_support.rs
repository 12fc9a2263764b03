//! Fixtures shared by the handler tests.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc::Receiver;

use relay_auth::provider::SimpleProvider;
use relay_auth::{AuthorizationChain, HandshakeContext, SelectiveProvider};
use relay_core::config::{AppConfig, PeerRecord};
use relay_core::types::TenantDocument;
use relay_realtime::Broker;
use relay_realtime::message::{Frame, OutboundMessage};
use relay_tenant::TenantRegistry;
use relay_tenant::store::MemoryTenantStore;

use crate::state::AppState;

pub(crate) async fn state(admin_key: Option<&str>) -> AppState {
    let store = Arc::new(MemoryTenantStore::new(HashMap::from([(
        "acme".to_string(),
        TenantDocument {
            available: true,
            auths: vec!["simple".to_string()],
            namespaced_broadcast: true,
            ..Default::default()
        },
    )])));
    let tenants = Arc::new(TenantRegistry::load(store).await.unwrap());

    let mut selector = SelectiveProvider::new();
    selector.register(Arc::new(SimpleProvider::new([PeerRecord {
        id: "listener".to_string(),
        tenant: "acme".to_string(),
        peer_type: "consumer".to_string(),
        key: "k".to_string(),
        durable: true,
        mono_channel: false,
        channels: vec!["*".to_string()],
        notify_on_disconnect: None,
    }])));

    let mut config = AppConfig::default();
    config.server.admin_key = admin_key.map(str::to_string);
    let broker = Broker::new(
        config.broker.clone(),
        Arc::new(AuthorizationChain::new(tenants, selector)),
    );
    AppState::new(config, broker)
}

/// Connects a peer of tenant `acme` and joins it to `channel`.
pub(crate) async fn listen(state: &AppState, channel: &str) -> Receiver<OutboundMessage> {
    let mut ctx = HandshakeContext::from_query([("tenant", "acme"), ("token", "listener:k")]);
    let tenant = state.broker.authorize(&mut ctx).await.unwrap();
    let (peer, rx) = state.broker.connect(tenant, ctx).unwrap();
    peer.join(channel);
    rx
}

pub(crate) fn next_frame(rx: &mut Receiver<OutboundMessage>) -> Frame {
    match rx.try_recv() {
        Ok(OutboundMessage::Frame(frame)) => frame,
        other => panic!("expected a frame, got {other:?}"),
    }
}
