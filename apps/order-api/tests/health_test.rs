mod common;

use axum_test::TestServer;
use utoipa::OpenApi;

#[tokio::test]
async fn banner_and_health() {
    let (app, _ctx) = common::test_app();
    let server = TestServer::new(app).unwrap();

    let resp = server.get("/").await;
    resp.assert_status_ok();
    resp.assert_text("Fast Food Backend API is running!");

    let resp = server.get("/health").await;
    resp.assert_status_ok();
    resp.assert_json(&serde_json::json!({ "status": "ok" }));
}

#[test]
fn openapi_document_lists_every_route_group() {
    let doc = order_api::routes::ApiDoc::openapi();
    let paths: Vec<&String> = doc.paths.paths.keys().collect();

    for expected in [
        "/health",
        "/api/auth/login",
        "/api/menu/categories/{id}/background-image",
        "/api/menu/options/types",
        "/api/orders/my-orders",
        "/api/settings",
        "/api/stripe/create-payment-intent",
        "/api/image-proxy",
    ] {
        assert!(
            paths.iter().any(|p| p.as_str() == expected),
            "missing {expected} in {paths:?}"
        );
    }
}
