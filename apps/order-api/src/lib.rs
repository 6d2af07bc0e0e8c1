pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod gateway;
pub mod models;
pub mod providers;
pub mod routes;
pub mod seed;

use std::sync::Arc;

use auth::tokens::TokenService;
use config::Config;
use db::store::DocumentStore;
use gateway::registry::ConnectionRegistry;
use gateway::router::EventRouter;
use providers::images::{CloudinaryClient, ImageStore};
use providers::payments::{PaymentProvider, StripeClient};

/// Shared application state available to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub tokens: TokenService,
    pub registry: Arc<ConnectionRegistry>,
    pub events: EventRouter,
    pub payments: Arc<dyn PaymentProvider>,
    pub images: Arc<dyn ImageStore>,
    /// Outbound HTTP client (image proxy).
    pub http: reqwest::Client,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wire the state from configuration, using the Stripe and Cloudinary
    /// clients for payments and images.
    pub fn new(config: Config, store: Arc<dyn DocumentStore>) -> Self {
        let http = reqwest::Client::new();
        let payments = Arc::new(StripeClient::new(
            &config.stripe_api_base,
            config.stripe_secret_key.clone(),
            http.clone(),
        ));
        let images = Arc::new(CloudinaryClient::new(config.cloudinary.clone(), http.clone()));
        Self::with_providers(config, store, payments, images, http)
    }

    pub fn with_providers(
        config: Config,
        store: Arc<dyn DocumentStore>,
        payments: Arc<dyn PaymentProvider>,
        images: Arc<dyn ImageStore>,
        http: reqwest::Client,
    ) -> Self {
        let registry = Arc::new(ConnectionRegistry::new());
        Self {
            store,
            tokens: TokenService::new(&config.jwt_secret, config.token_ttl_secs),
            events: EventRouter::new(registry.clone()),
            registry,
            payments,
            images,
            http,
            config: Arc::new(config),
        }
    }
}
