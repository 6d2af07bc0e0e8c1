mod common;

use axum::http::header::AUTHORIZATION;
use axum::http::StatusCode;
use axum_test::TestServer;

use order_api::db::documents;
use order_api::db::store::Collection;
use order_api::models::settings::{RestaurantSettings, SETTINGS_ID};

#[tokio::test]
async fn first_read_creates_default_settings() {
    let (app, ctx) = common::test_app();
    let server = TestServer::new(app).unwrap();

    let resp = server.get("/api/settings").await;
    resp.assert_status_ok();
    let body: serde_json::Value = resp.json();
    assert_eq!(body["id"], "main_settings");
    assert_eq!(body["hours"]["1"]["isOpen"], true);
    assert_eq!(body["hours"]["5"]["closeTime"], "23:00");
    assert_eq!(body["hours"]["7"]["isOpen"], false);

    let stored: Option<RestaurantSettings> =
        documents::find(ctx.state.store.as_ref(), Collection::Settings, SETTINGS_ID)
            .await
            .unwrap();
    assert_eq!(stored, Some(RestaurantSettings::default()));
}

#[tokio::test]
async fn admin_replaces_hours() {
    let (app, ctx) = common::test_app();
    let server = TestServer::new(app).unwrap();
    let (_, token) = common::create_admin(&ctx.state).await;

    let resp = server
        .post("/api/settings")
        .add_header(AUTHORIZATION, common::bearer(&token))
        .json(&serde_json::json!({
            "hours": {
                "1": { "isOpen": false, "openTime": "11:00", "closeTime": "22:00" },
                "6": { "openTime": "10:30", "closeTime": "23:30" }
            }
        }))
        .await;

    resp.assert_status_ok();
    let saved: serde_json::Value = resp.json();
    assert_eq!(saved["hours"]["1"]["isOpen"], false);
    assert_eq!(saved["hours"]["6"]["isOpen"], true);
    assert_eq!(saved["hours"]["6"]["openTime"], "10:30");

    let fetched: serde_json::Value = server.get("/api/settings").await.json();
    assert_eq!(fetched, saved);
    assert!(fetched["hours"].get("7").is_none());
}

#[tokio::test]
async fn invalid_hours_are_rejected() {
    let (app, ctx) = common::test_app();
    let server = TestServer::new(app).unwrap();
    let (_, token) = common::create_admin(&ctx.state).await;

    let resp = server
        .post("/api/settings")
        .add_header(AUTHORIZATION, common::bearer(&token))
        .json(&serde_json::json!({
            "hours": {
                "2": { "openTime": "25:00", "closeTime": "22:00" },
                "9": { "openTime": "11:00", "closeTime": "22:00" }
            }
        }))
        .await;

    resp.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = resp.json();
    let fields: Vec<&str> = body["error"]["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["hours.2.openTime", "hours.9"]);

    server
        .post("/api/settings")
        .add_header(AUTHORIZATION, common::bearer(&token))
        .json(&serde_json::json!({}))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn customers_cannot_save_settings() {
    let (app, ctx) = common::test_app();
    let server = TestServer::new(app).unwrap();
    let (_, token) = common::create_customer(&ctx.state, "c@example.com").await;

    server
        .post("/api/settings")
        .add_header(AUTHORIZATION, common::bearer(&token))
        .json(&serde_json::json!({ "hours": {} }))
        .await
        .assert_status(StatusCode::FORBIDDEN);
}
