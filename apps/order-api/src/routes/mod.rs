pub mod auth;
pub mod categories;
pub mod health;
pub mod items;
pub mod options;
pub mod orders;
pub mod payments;
pub mod settings;
pub mod uploads;

use axum::Router;
use serde::Serialize;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(crate::gateway::server::router())
        .nest("/api/auth", auth::router())
        .nest(
            "/api/menu",
            categories::router()
                .merge(options::router())
                .merge(items::router()),
        )
        .nest("/api/orders", orders::router())
        .nest("/api/settings", settings::router())
        .nest("/api/stripe", payments::router())
        .merge(uploads::router())
}

/// Plain acknowledgement body.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::health,
        // Auth
        auth::register,
        auth::create_admin,
        auth::login,
        auth::update_fcm_token,
        // Menu
        categories::list_categories,
        categories::create_category,
        categories::update_category,
        categories::delete_category,
        categories::update_background_image,
        items::list_items,
        items::get_item,
        items::create_item,
        items::update_item,
        items::delete_item,
        options::list_option_types,
        options::list_options,
        options::list_options_by_type,
        options::create_option,
        options::update_option,
        options::delete_option,
        // Orders
        orders::create_order,
        orders::my_orders,
        orders::list_orders,
        orders::update_status,
        // Settings
        settings::get_settings,
        settings::save_settings,
        // Payments
        payments::create_payment_intent,
        // Uploads
        uploads::upload_image,
        uploads::image_proxy,
    ),
    components(
        schemas(
            // Error types
            crate::error::ApiErrorBody,
            crate::error::ApiErrorDetail,
            crate::error::FieldError,
            // Models
            crate::models::user::Role,
            crate::models::user::UserResponse,
            crate::models::category::MenuCategory,
            crate::models::menu_item::MenuItem,
            crate::models::option::MenuOption,
            crate::models::order::Order,
            crate::models::order::OrderItem,
            crate::models::order::OrderStatus,
            crate::models::order::OrderType,
            crate::models::order::Address,
            crate::models::settings::RestaurantSettings,
            crate::models::settings::DailyHours,
            // Route request/response types
            MessageResponse,
            health::HealthResponse,
            auth::RegisterRequest,
            auth::RegisterResponse,
            auth::CredentialsRequest,
            auth::LoginResponse,
            auth::FcmTokenRequest,
            categories::CreateCategoryRequest,
            categories::UpdateCategoryRequest,
            items::CreateItemRequest,
            items::UpdateItemRequest,
            options::CreateOptionRequest,
            options::UpdateOptionRequest,
            orders::CreateOrderRequest,
            orders::OrderItemRequest,
            orders::UpdateStatusRequest,
            settings::SaveSettingsRequest,
            payments::PaymentIntentRequest,
            payments::PaymentIntentResponse,
            uploads::UploadResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check"),
        (name = "Auth", description = "Accounts and access tokens"),
        (name = "Menu", description = "Categories, items and options"),
        (name = "Orders", description = "Order placement and status"),
        (name = "Settings", description = "Restaurant opening hours"),
        (name = "Payments", description = "Card payment intents"),
        (name = "Uploads", description = "Image upload and proxy"),
    )
)]
pub struct ApiDoc;
