//! Shared test helpers for integration tests.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use relay_core::config::{AppConfig, PeerRecord};
use relay_realtime::Broker;

pub type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

static NEXT_DOCUMENT: AtomicUsize = AtomicUsize::new(0);

/// A relay served on an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub broker: Broker,
}

pub fn peer(id: &str, peer_type: &str, channels: &[&str]) -> PeerRecord {
    PeerRecord {
        id: id.to_string(),
        tenant: "acme".to_string(),
        peer_type: peer_type.to_string(),
        key: format!("{id}-key"),
        durable: true,
        mono_channel: false,
        channels: channels.iter().map(|c| c.to_string()).collect(),
        notify_on_disconnect: None,
    }
}

fn write_tenants() -> String {
    let path = std::env::temp_dir().join(format!(
        "relay-it-{}-{}.json",
        std::process::id(),
        NEXT_DOCUMENT.fetch_add(1, Ordering::Relaxed)
    ));
    let doc = json!({
        "acme": { "available": true, "auths": ["simple"], "namespacedBroadcast": true },
        "closed": { "available": false, "auths": ["simple"] }
    });
    std::fs::write(&path, doc.to_string()).unwrap();
    path.to_string_lossy().into_owned()
}

impl TestServer {
    pub async fn start(peers: Vec<PeerRecord>) -> Self {
        Self::start_with(peers, |_| {}).await
    }

    pub async fn start_with(peers: Vec<PeerRecord>, tweak: impl FnOnce(&mut AppConfig)) -> Self {
        let mut config = AppConfig::default();
        config.tenants.path = write_tenants();
        config.auth.simple.peers = peers;
        config.broker.terminate_delay_ms = 50;
        tweak(&mut config);

        let state = relay_api::build_state(config).await.unwrap();
        let broker = state.broker.clone();
        let app = relay_api::build_app(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, broker }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn try_connect(&self, tenant: &str, token: &str) -> Result<WsClient, WsError> {
        let url = format!("ws://{}/ws?tenant={tenant}&token={token}", self.addr);
        connect_async(url).await.map(|(ws, _)| ws)
    }

    pub async fn connect(&self, id: &str) -> WsClient {
        self.try_connect("acme", &format!("{id}:{id}-key"))
            .await
            .unwrap()
    }
}

pub async fn emit(ws: &mut WsClient, event: &str, data: Value, ack: Option<u64>) {
    let mut frame = json!({ "event": event, "data": data });
    if let Some(id) = ack {
        frame["ack"] = json!(id);
    }
    ws.send(Message::Text(frame.to_string().into())).await.unwrap();
}

/// Next text frame as JSON, failing after two seconds.
pub async fn recv(ws: &mut WsClient) -> Value {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(2), ws.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("socket closed")
            .unwrap();
        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

/// Asserts nothing arrives for a short while.
pub async fn assert_silent(ws: &mut WsClient) {
    let next = tokio::time::timeout(Duration::from_millis(150), ws.next()).await;
    assert!(next.is_err(), "unexpected frame: {next:?}");
}

/// Waits until the server closes the socket.
pub async fn wait_closed(ws: &mut WsClient) {
    let closed = tokio::time::timeout(Duration::from_secs(2), async {
        while let Some(msg) = ws.next().await {
            if matches!(msg, Ok(Message::Close(_)) | Err(_)) {
                break;
            }
        }
    })
    .await;
    assert!(closed.is_ok(), "socket still open");
}

/// Polls until `check` holds, failing after two seconds.
pub async fn eventually(mut check: impl FnMut() -> bool) {
    for _ in 0..100 {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("condition not met");
}
