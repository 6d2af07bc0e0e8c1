mod common;

use std::net::SocketAddr;
use std::time::Duration;

use axum::http::header::AUTHORIZATION;
use futures_util::StreamExt;
use tokio::time;
use tokio_tungstenite::tungstenite;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;

use order_api::gateway::connection::Connection;
use order_api::models::user::Role;

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

/// Helper: start an actual TCP server for WebSocket testing.
async fn start_ws_server() -> (SocketAddr, common::TestContext) {
    let (app, ctx) = common::test_app();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, ctx)
}

async fn connect(addr: SocketAddr, query: &str) -> WsStream {
    let url = format!("ws://{addr}/ws{query}");
    let (ws_stream, _) = tokio_tungstenite::connect_async(&url)
        .await
        .expect("ws connect");
    ws_stream
}

/// Connect with a token and wait until the registry has seen the connection.
async fn connect_registered(
    addr: SocketAddr,
    ctx: &common::TestContext,
    user_id: &str,
    token: &str,
) -> WsStream {
    let before = ctx.state.registry.lookup(user_id).map(|c| c.id());
    let ws = connect(addr, &format!("?token={token}")).await;

    time::timeout(Duration::from_secs(5), async {
        loop {
            let current = ctx.state.registry.lookup(user_id).map(|c| c.id());
            if current.is_some() && current != before {
                break;
            }
            time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("connection never registered");

    ws
}

async fn next_message(ws: &mut WsStream) -> tungstenite::Message {
    time::timeout(Duration::from_secs(5), ws.next())
        .await
        .expect("timeout")
        .expect("stream ended")
        .expect("read error")
}

async fn next_event(ws: &mut WsStream) -> serde_json::Value {
    let msg = next_message(ws).await;
    let text = msg.into_text().expect("not text");
    serde_json::from_str(&text).expect("parse event")
}

async fn expect_close(ws: &mut WsStream, code: u16) {
    match next_message(ws).await {
        tungstenite::Message::Close(Some(frame)) => {
            assert_eq!(frame.code, CloseCode::from(code));
        }
        other => panic!("Expected Close frame, got: {other:?}"),
    }
}

async fn wait_until(mut check: impl FnMut() -> bool) {
    time::timeout(Duration::from_secs(5), async {
        while !check() {
            time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition never became true");
}

// ---------------------------------------------------------------------------
// Handshake
// ---------------------------------------------------------------------------

#[tokio::test]
async fn gateway_rejects_missing_token() {
    let (addr, ctx) = start_ws_server().await;

    let mut ws = connect(addr, "").await;
    expect_close(&mut ws, 4003).await;

    assert!(ctx.state.registry.is_empty());
}

#[tokio::test]
async fn gateway_rejects_invalid_token() {
    let (addr, ctx) = start_ws_server().await;

    let mut ws = connect(addr, "?token=not-a-jwt").await;
    expect_close(&mut ws, 4004).await;

    assert!(ctx.state.registry.is_empty());
}

#[tokio::test]
async fn gateway_rejects_expired_token() {
    let (addr, ctx) = start_ws_server().await;
    let (user_id, _) = common::create_customer(&ctx.state, "late@example.com").await;

    let token = common::expired_token(&user_id);
    let mut ws = connect(addr, &format!("?token={token}")).await;
    expect_close(&mut ws, 4004).await;

    assert!(ctx.state.registry.lookup(&user_id).is_none());
}

#[tokio::test]
async fn gateway_rejects_token_signed_with_other_secret() {
    let (addr, ctx) = start_ws_server().await;

    let now = chrono::Utc::now().timestamp();
    let token = common::sign_claims(
        &serde_json::json!({ "userId": "usr_forged", "role": "admin", "iat": now, "exp": now + 600 }),
        "some-other-secret",
    );
    let mut ws = connect(addr, &format!("?token={token}")).await;
    expect_close(&mut ws, 4004).await;

    assert_eq!(ctx.state.registry.admin_count(), 0);
}

#[tokio::test]
async fn gateway_registers_and_unregisters_on_client_close() {
    let (addr, ctx) = start_ws_server().await;
    let (admin_id, token) = common::create_admin(&ctx.state).await;

    let mut ws = connect_registered(addr, &ctx, &admin_id, &token).await;
    assert_eq!(ctx.state.registry.admin_count(), 1);

    ws.close(None).await.expect("client close");

    let registry = ctx.state.registry.clone();
    wait_until(|| registry.is_empty() && registry.admin_count() == 0).await;
}

// ---------------------------------------------------------------------------
// Event delivery
// ---------------------------------------------------------------------------

#[tokio::test]
async fn admin_receives_new_order() {
    let (addr, ctx) = start_ws_server().await;
    let (admin_id, admin_token) = common::create_admin(&ctx.state).await;
    let (_, customer_token) = common::create_customer(&ctx.state, "hungry@example.com").await;
    let item = common::seed_menu_item(&ctx.state, "Tacos Poulet", 7.5, "tacos").await;

    let mut admin_ws = connect_registered(addr, &ctx, &admin_id, &admin_token).await;

    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/api/orders"))
        .header(AUTHORIZATION, common::bearer(&customer_token))
        .json(&serde_json::json!({
            "items": [{ "itemId": item.id, "quantity": 2 }],
            "totalAmount": 15.0,
            "customerName": "Sam",
            "orderType": "takeaway"
        }))
        .send()
        .await
        .expect("place order");
    assert_eq!(resp.status(), reqwest::StatusCode::CREATED);
    let order: serde_json::Value = resp.json().await.unwrap();

    let event = next_event(&mut admin_ws).await;
    assert_eq!(event["type"], "NEW_ORDER");
    assert_eq!(event["order"]["id"], order["id"]);
    assert_eq!(event["order"]["items"][0]["itemName"], "Tacos Poulet");
}

#[tokio::test]
async fn customer_receives_own_status_update_only() {
    let (addr, ctx) = start_ws_server().await;
    let (_, admin_token) = common::create_admin(&ctx.state).await;
    let (owner_id, owner_token) = common::create_customer(&ctx.state, "owner@example.com").await;
    let (other_id, other_token) = common::create_customer(&ctx.state, "other@example.com").await;
    let item = common::seed_menu_item(&ctx.state, "Frites", 2.5, "sides").await;

    let client = reqwest::Client::new();
    let order: serde_json::Value = client
        .post(format!("http://{addr}/api/orders"))
        .header(AUTHORIZATION, common::bearer(&owner_token))
        .json(&serde_json::json!({
            "items": [{ "itemId": item.id, "quantity": 1 }],
            "totalAmount": 2.5,
            "customerName": "Owner",
            "orderType": "eat_in"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let mut owner_ws = connect_registered(addr, &ctx, &owner_id, &owner_token).await;
    let mut other_ws = connect_registered(addr, &ctx, &other_id, &other_token).await;

    let order_id = order["id"].as_str().unwrap();
    let resp = client
        .put(format!("http://{addr}/api/orders/{order_id}"))
        .header(AUTHORIZATION, common::bearer(&admin_token))
        .json(&serde_json::json!({ "status": "preparing" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);

    let event = next_event(&mut owner_ws).await;
    assert_eq!(event["type"], "ORDER_STATUS_UPDATE");
    assert_eq!(event["order"]["id"], order_id);
    assert_eq!(event["order"]["status"], "preparing");

    let nothing = time::timeout(Duration::from_millis(200), other_ws.next()).await;
    assert!(nothing.is_err(), "other customer must not receive the update");
}

#[tokio::test]
async fn menu_update_reaches_every_connection() {
    let (addr, ctx) = start_ws_server().await;
    let (admin_id, admin_token) = common::create_admin(&ctx.state).await;
    let (customer_id, customer_token) = common::create_customer(&ctx.state, "c@example.com").await;

    let mut admin_ws = connect_registered(addr, &ctx, &admin_id, &admin_token).await;
    let mut customer_ws = connect_registered(addr, &ctx, &customer_id, &customer_token).await;

    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/api/menu/categories"))
        .header(AUTHORIZATION, common::bearer(&admin_token))
        .json(&serde_json::json!({ "name": "Desserts", "type": "desserts" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::CREATED);

    for ws in [&mut admin_ws, &mut customer_ws] {
        let event = next_event(ws).await;
        assert_eq!(event, serde_json::json!({ "type": "MENU_UPDATE" }));
    }
}

// ---------------------------------------------------------------------------
// Replacement
// ---------------------------------------------------------------------------

#[tokio::test]
async fn second_connection_replaces_first() {
    let (addr, ctx) = start_ws_server().await;
    let (admin_id, token) = common::create_admin(&ctx.state).await;

    let mut first = connect_registered(addr, &ctx, &admin_id, &token).await;
    let mut second = connect_registered(addr, &ctx, &admin_id, &token).await;

    expect_close(&mut first, 4008).await;

    // The superseded connection's teardown must not evict the new one.
    let registry = ctx.state.registry.clone();
    wait_until(|| registry.admin_count() == 1).await;
    assert_eq!(registry.len(), 1);

    let sent = ctx
        .state
        .events
        .to_user(&admin_id, &order_api::gateway::events::Event::menu_update());
    assert_eq!(sent, 1);
    let event = next_event(&mut second).await;
    assert_eq!(event["type"], "MENU_UPDATE");
}

#[tokio::test]
async fn close_all_sends_going_away() {
    let (addr, ctx) = start_ws_server().await;
    let (user_id, token) = common::create_user(&ctx.state, "u@example.com", Role::User).await;

    let mut ws = connect_registered(addr, &ctx, &user_id, &token).await;
    assert_eq!(ctx.state.registry.close_all("Server shutting down"), 1);

    expect_close(&mut ws, 1001).await;

    let registry = ctx.state.registry.clone();
    wait_until(|| registry.is_empty()).await;
}
