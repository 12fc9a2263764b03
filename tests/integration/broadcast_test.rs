//! Integration tests for the REST broadcast service.

use serde_json::{Value, json};

use relay_realtime::Transport;

use crate::helpers::{TestServer, emit, eventually, peer, recv};

#[tokio::test]
async fn test_broadcast_reaches_room() {
    let server = TestServer::start(vec![peer("consumer", "consumer", &["orders"])]).await;
    let mut consumer = server.connect("consumer").await;
    emit(&mut consumer, "join", json!({"channel": "orders"}), None).await;
    eventually(|| server.broker.hub().room_exists("acme/orders")).await;

    let response = reqwest::Client::new()
        .post(server.url("/broadcast"))
        .json(&json!({"tenant": "acme", "event": "alert", "channel": "orders", "data": "hi"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["ack"], 1);
    assert_eq!(body["channel"], json!(["orders"]));

    let frame = recv(&mut consumer).await;
    assert_eq!(frame["event"], "alert");
    assert_eq!(frame["data"], "hi");
}

#[tokio::test]
async fn test_broadcast_requires_admin_key() {
    let server = TestServer::start_with(vec![], |config| {
        config.server.admin_key = Some("s3cr3t".to_string());
    })
    .await;
    let client = reqwest::Client::new();
    let body = json!({"channel": "orders", "data": 1});

    let response = client
        .post(server.url("/broadcast"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 401);

    let response = client
        .post(server.url("/broadcast"))
        .bearer_auth("s3cr3t")
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn test_health_and_reload() {
    let server = TestServer::start(vec![]).await;
    let client = reqwest::Client::new();

    let health: Value = client
        .get(server.url("/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "ok");
    assert_eq!(health["tenants"], 2);

    let reload: Value = client
        .post(server.url("/tenants/reload"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(reload["tenants"], 2);
}
