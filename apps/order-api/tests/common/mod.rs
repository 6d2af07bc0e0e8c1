#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use parking_lot::Mutex;

use order_api::config::Config;
use order_api::db::documents;
use order_api::db::store::{Collection, DocumentStore, MemoryStore};
use order_api::error::ApiError;
use order_api::models::menu_item::MenuItem;
use order_api::models::user::{self, Role};
use order_api::providers::images::ImageStore;
use order_api::providers::payments::PaymentProvider;
use order_api::AppState;

pub const TEST_JWT_SECRET: &str = "test-secret-do-not-use-in-production";

// ---------------------------------------------------------------------------
// Provider doubles
// ---------------------------------------------------------------------------

/// Records payment intent requests; fails every call when `fail` is set.
#[derive(Default)]
pub struct FakePayments {
    pub fail: bool,
    pub calls: Mutex<Vec<(u64, String)>>,
}

#[async_trait]
impl PaymentProvider for FakePayments {
    async fn create_payment_intent(&self, amount: u64, currency: &str) -> Result<String, ApiError> {
        self.calls.lock().push((amount, currency.to_string()));
        if self.fail {
            return Err(ApiError::bad_gateway("Your card was declined"));
        }
        Ok(format!("pi_test_{amount}_secret_{currency}"))
    }
}

/// Records uploads and hands back deterministic URLs.
#[derive(Default)]
pub struct FakeImages {
    pub uploads: Mutex<Vec<(String, String, usize)>>,
}

#[async_trait]
impl ImageStore for FakeImages {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        content_type: &str,
        folder: &str,
    ) -> Result<String, ApiError> {
        let mut uploads = self.uploads.lock();
        uploads.push((folder.to_string(), content_type.to_string(), bytes.len()));
        Ok(format!("https://images.test/{folder}/{}.png", uploads.len()))
    }
}

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

pub struct TestContext {
    pub state: AppState,
    pub payments: Arc<FakePayments>,
    pub images: Arc<FakeImages>,
}

pub fn test_config() -> Config {
    Config::for_tests(TEST_JWT_SECRET)
}

/// Build a test app with an in-memory store and recording providers.
pub fn test_app() -> (Router, TestContext) {
    test_app_with(test_config(), FakePayments::default())
}

pub fn test_app_with(config: Config, payments: FakePayments) -> (Router, TestContext) {
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
    let payments = Arc::new(payments);
    let images = Arc::new(FakeImages::default());

    let state = AppState::with_providers(
        config,
        store,
        payments.clone(),
        images.clone(),
        reqwest::Client::new(),
    );
    let app = order_api::routes::router().with_state(state.clone());

    (
        app,
        TestContext {
            state,
            payments,
            images,
        },
    )
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Create an account directly in the store and return `(user_id, token)`.
pub async fn create_user(state: &AppState, email: &str, role: Role) -> (String, String) {
    let user = user::create(
        state.store.as_ref(),
        email,
        "password123",
        Some("Test User".to_string()),
        role,
    )
    .await
    .expect("create test user");
    let token = state
        .tokens
        .issue(&user.id, user.role, user.name.as_deref())
        .expect("issue test token");
    (user.id, token)
}

pub async fn create_admin(state: &AppState) -> (String, String) {
    create_user(state, "admin@example.com", Role::Admin).await
}

pub async fn create_customer(state: &AppState, email: &str) -> (String, String) {
    create_user(state, email, Role::User).await
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

/// Insert a menu item straight into the store.
pub async fn seed_menu_item(state: &AppState, name: &str, price: f64, category: &str) -> MenuItem {
    let item = MenuItem {
        id: fastfood_common::id::prefixed_ulid(fastfood_common::id::prefix::MENU_ITEM),
        name: name.to_string(),
        description: Some(format!("{name} description")),
        price,
        image_url: None,
        category: category.to_string(),
        option_types: vec![],
        removable_ingredients: vec!["Oignons".to_string()],
    };
    documents::insert(state.store.as_ref(), Collection::MenuItems, &item.id, &item)
        .await
        .expect("seed menu item");
    item
}

/// Mint a token with arbitrary claims, signed with the test secret.
pub fn sign_claims(claims: &serde_json::Value, secret: &str) -> String {
    jsonwebtoken::encode(
        &jsonwebtoken::Header::new(jsonwebtoken::Algorithm::HS256),
        claims,
        &jsonwebtoken::EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("sign test claims")
}

pub fn expired_token(user_id: &str) -> String {
    let now = chrono::Utc::now().timestamp();
    sign_claims(
        &serde_json::json!({
            "userId": user_id,
            "role": "user",
            "iat": now - 7200,
            "exp": now - 3600,
        }),
        TEST_JWT_SECRET,
    )
}
