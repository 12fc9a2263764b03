//! Integration tests for the WebSocket handshake and channel protocol.

use serde_json::json;
use tokio_tungstenite::tungstenite::Error as WsError;

use relay_realtime::Transport;

use crate::helpers::{
    TestServer, assert_silent, emit, eventually, peer, recv, wait_closed,
};

fn http_status(err: WsError) -> u16 {
    match err {
        WsError::Http(response) => response.status().as_u16(),
        other => panic!("expected an HTTP rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn test_handshake_rejections() {
    let server = TestServer::start(vec![peer("svc", "producer", &["orders"])]).await;

    let cases = [
        ("nobody", "svc:svc-key"),
        ("closed", "svc:svc-key"),
        ("acme", "svc:wrong"),
        ("acme", "ghost:ghost-key"),
    ];
    for (tenant, token) in cases {
        let err = server.try_connect(tenant, token).await.unwrap_err();
        assert_eq!(http_status(err), 401, "tenant={tenant} token={token}");
    }
    assert_eq!(server.broker.connection_count(), 0);
    assert_eq!(server.broker.metrics().handshakes_rejected, 4);
}

#[tokio::test]
async fn test_join_and_publish() {
    let server = TestServer::start(vec![
        peer("producer", "producer", &["orders:w"]),
        peer("consumer", "consumer", &["orders:r"]),
    ])
    .await;
    let mut consumer = server.connect("consumer").await;
    let mut producer = server.connect("producer").await;

    emit(&mut consumer, "join", json!({"channel": "orders"}), None).await;
    eventually(|| server.broker.hub().room_exists("acme/orders")).await;

    emit(
        &mut producer,
        "publish",
        json!({"channel": "orders", "data": {"id": 7}}),
        Some(1),
    )
    .await;

    let delivered = recv(&mut consumer).await;
    assert_eq!(delivered["event"], "message");
    assert_eq!(delivered["data"], json!({"id": 7}));

    let ack = recv(&mut producer).await;
    assert_eq!(ack["event"], "ack");
    assert_eq!(ack["ack"], 1);
    assert_eq!(ack["data"]["status"], "success");
    assert_silent(&mut producer).await;
}

#[tokio::test]
async fn test_unauthorized_publish_is_scoped() {
    let server = TestServer::start(vec![peer("producer", "producer", &["orders"])]).await;
    let mut producer = server.connect("producer").await;

    emit(
        &mut producer,
        "publish",
        json!({"channel": "payroll", "data": 1}),
        Some(2),
    )
    .await;
    let error = recv(&mut producer).await;
    assert_eq!(error["event"], "error");
    assert_eq!(error["data"]["status"], "error");
    assert_eq!(error["data"]["reason"], "Unauthorized action");

    // the connection stays usable
    emit(&mut producer, "publish", json!({"channel": "orders"}), None).await;
    let error = recv(&mut producer).await;
    assert_eq!(error["data"]["reason"], "No data to broadcast");
}

#[tokio::test]
async fn test_generic_publish_with_transaction() {
    let server = TestServer::start(vec![
        peer("producer", "producer", &["orders"]),
        peer("consumer", "consumer", &["orders"]),
    ])
    .await;
    let mut consumer = server.connect("consumer").await;
    let mut producer = server.connect("producer").await;

    emit(&mut consumer, "join", json!({"channel": "orders"}), None).await;
    eventually(|| server.broker.hub().room_exists("acme/orders")).await;

    emit(
        &mut producer,
        "send",
        json!({"event": "order.created", "channel": ["orders", "payroll"], "data": 1, "transaction": "tx-9"}),
        Some(3),
    )
    .await;

    let delivered = recv(&mut consumer).await;
    assert_eq!(delivered["event"], "order.created");
    assert_eq!(delivered["data"], 1);

    let error = recv(&mut producer).await;
    assert_eq!(error["data"]["reason"], "Cant publish to payroll");
    assert_eq!(error["data"]["transaction"], "tx-9");

    let ack = recv(&mut producer).await;
    assert_eq!(ack["data"]["event"], "send");
    assert_eq!(ack["data"]["transaction"], "tx-9");
}

#[tokio::test]
async fn test_non_durable_peer_disconnected_after_publish() {
    let mut ephemeral = peer("oneshot", "producer", &["orders"]);
    ephemeral.durable = false;
    let server = TestServer::start(vec![ephemeral]).await;
    let mut client = server.connect("oneshot").await;

    emit(
        &mut client,
        "publish",
        json!({"channel": "orders", "data": "bye"}),
        Some(1),
    )
    .await;
    let ack = recv(&mut client).await;
    assert_eq!(ack["event"], "ack");

    wait_closed(&mut client).await;
    eventually(|| server.broker.connection_count() == 0).await;
}

#[tokio::test]
async fn test_notify_on_disconnect() {
    let mut leaving = peer("worker", "producer", &["jobs"]);
    leaving.notify_on_disconnect = Some("presence".to_string());
    let server = TestServer::start(vec![leaving, peer("watcher", "consumer", &["presence"])]).await;

    let mut watcher = server.connect("watcher").await;
    emit(&mut watcher, "join", json!({"channel": "presence"}), None).await;
    eventually(|| server.broker.hub().room_exists("acme/presence")).await;

    let worker = server.connect("worker").await;
    eventually(|| server.broker.connection_count() == 2).await;
    drop(worker);

    let notice = recv(&mut watcher).await;
    assert_eq!(notice["event"], "disconnected");
    assert_eq!(notice["data"], json!({"peer": "worker", "type": "producer"}));
}

#[tokio::test]
async fn test_event_filters() {
    let server = TestServer::start_with(vec![peer("svc", "producer", &["orders"])], |config| {
        config.broker.events.insert(
            "publish".to_string(),
            relay_core::config::EventAccessConfig {
                accessible_by: vec!["node".to_string()],
            },
        );
    })
    .await;
    let mut client = server.connect("svc").await;

    emit(&mut client, "publish", json!({"channel": "orders", "data": 1}), None).await;
    let error = recv(&mut client).await;
    assert_eq!(error["data"]["reason"], "Unauthorized peer action");

    emit(&mut client, "nope", json!({}), None).await;
    let error = recv(&mut client).await;
    assert_eq!(error["data"]["reason"], "Unsupported event");
}
