//! Order placement and kitchen workflow endpoints.
//!
//! New orders are pushed to every admin connection; status changes are pushed
//! to the customer who placed the order.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use utoipa::ToSchema;

use fastfood_common::id::{prefix, prefixed_ulid};

use crate::auth::middleware::{AdminUser, AuthUser};
use crate::db::documents;
use crate::db::store::{Collection, DocumentStore};
use crate::error::{ApiError, ApiErrorBody, FieldError};
use crate::gateway::events::Event;
use crate::models::menu_item::MenuItem;
use crate::models::order::{Address, Order, OrderItem, OrderStatus, OrderType};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route("/my-orders", get(my_orders))
        .route("/{id}", put(update_status))
}

fn field_error(field: impl Into<String>, message: impl Into<String>) -> FieldError {
    FieldError {
        field: field.into(),
        message: message.into(),
    }
}

fn parse_order_type(value: &str) -> Option<OrderType> {
    match value {
        "takeaway" => Some(OrderType::Takeaway),
        "eat_in" => Some(OrderType::EatIn),
        "delivery" => Some(OrderType::Delivery),
        _ => None,
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

// ---------------------------------------------------------------------------
// POST /api/orders
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    #[serde(default)]
    pub item_id: String,
    pub quantity: Option<i64>,
    #[serde(default)]
    pub item_options: Vec<String>,
    #[serde(default)]
    pub excluded_ingredients: Vec<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub items: Vec<OrderItemRequest>,
    pub total_amount: Option<f64>,
    #[serde(default)]
    pub customer_name: String,
    pub order_type: Option<String>,
    pub arrival_time: Option<String>,
    pub address: Option<Address>,
}

/// Validate the request shape, collecting every problem at once.
fn validate_order(body: &CreateOrderRequest) -> Result<OrderType, ApiError> {
    let mut errors = Vec::new();

    if body.items.is_empty() {
        errors.push(field_error("items", "Items are required"));
    }
    for (i, item) in body.items.iter().enumerate() {
        if item.item_id.trim().is_empty() {
            errors.push(field_error(format!("items[{i}].itemId"), "Item ID is required"));
        }
        if !matches!(item.quantity, Some(q) if q >= 1) {
            errors.push(field_error(format!("items[{i}].quantity"), "Quantity must be at least 1"));
        }
    }
    if !body.total_amount.is_some_and(f64::is_finite) {
        errors.push(field_error("totalAmount", "Total price is required"));
    }
    if body.customer_name.trim().is_empty() {
        errors.push(field_error("customerName", "Customer name is required"));
    }

    let order_type = body.order_type.as_deref().and_then(parse_order_type);
    if order_type.is_none() {
        errors.push(field_error(
            "orderType",
            "Order type must be one of takeaway, eat_in, delivery",
        ));
    }

    if order_type == Some(OrderType::Delivery) {
        let address = body.address.clone().unwrap_or_default();
        let required = [
            ("address.street", &address.street, "Street is required for delivery"),
            ("address.city", &address.city, "City is required for delivery"),
            ("address.postalCode", &address.postal_code, "Postal code is required for delivery"),
            ("address.phone", &address.phone, "Phone number is required for delivery"),
        ];
        for (field, value, message) in required {
            if is_blank(value) {
                errors.push(field_error(field, message));
            }
        }
    }

    match order_type {
        Some(order_type) if errors.is_empty() => Ok(order_type),
        _ => Err(ApiError::validation(errors)),
    }
}

/// Copy catalog details into the order so later menu edits don't rewrite history.
async fn snapshot_items(
    store: &dyn DocumentStore,
    items: Vec<OrderItemRequest>,
) -> Result<Vec<OrderItem>, ApiError> {
    let mut snapshot = Vec::with_capacity(items.len());
    let mut missing = Vec::new();

    for (i, requested) in items.into_iter().enumerate() {
        let item_id = requested.item_id.trim().to_string();
        let Some(menu_item) = documents::find::<MenuItem>(store, Collection::MenuItems, &item_id).await? else {
            missing.push(field_error(
                format!("items[{i}].itemId"),
                format!("Menu item with id {item_id} not found"),
            ));
            continue;
        };

        snapshot.push(OrderItem {
            item_id: menu_item.id,
            item_name: menu_item.name,
            item_description: menu_item.description,
            item_price: menu_item.price,
            item_image_url: menu_item.image_url,
            item_category: menu_item.category,
            item_options: requested.item_options,
            excluded_ingredients: requested.excluded_ingredients,
            quantity: requested.quantity.unwrap_or(1).clamp(1, i64::from(u32::MAX)) as u32,
        });
    }

    if !missing.is_empty() {
        return Err(ApiError::validation(missing));
    }
    Ok(snapshot)
}

#[utoipa::path(
    post,
    path = "/api/orders",
    tag = "Orders",
    security(("bearer" = [])),
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order placed", body = Order),
        (status = 400, description = "Validation error", body = ApiErrorBody),
        (status = 401, description = "Unauthorized", body = ApiErrorBody),
    ),
)]
pub async fn create_order(
    AuthUser { user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
    let order_type = validate_order(&body)?;
    let store = state.store.as_ref();

    let items = snapshot_items(store, body.items).await?;
    let address = match order_type {
        OrderType::Delivery => body.address,
        _ => None,
    };

    let order = Order {
        id: prefixed_ulid(prefix::ORDER),
        user_id: Some(user_id),
        customer_name: body.customer_name.trim().to_string(),
        order_type,
        address,
        arrival_time: body.arrival_time.filter(|t| !t.trim().is_empty()),
        items,
        total_amount: body.total_amount.unwrap_or_default(),
        order_date: Utc::now(),
        status: OrderStatus::Pending,
    };
    documents::insert(store, Collection::Orders, &order.id, &order).await?;

    let notified = state.events.to_admins(&Event::new_order(&order));
    tracing::info!(
        order_id = %order.id,
        order_type = ?order.order_type,
        items = order.items.len(),
        notified,
        "order placed"
    );

    Ok((StatusCode::CREATED, Json(order)))
}

// ---------------------------------------------------------------------------
// GET /api/orders/my-orders
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/api/orders/my-orders",
    tag = "Orders",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Caller's orders, newest first", body = Vec<Order>),
        (status = 401, description = "Unauthorized", body = ApiErrorBody),
    ),
)]
pub async fn my_orders(
    AuthUser { user_id, .. }: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Order>>, ApiError> {
    let orders: Vec<Order> = documents::find_all(state.store.as_ref(), Collection::Orders).await?;

    let mut mine: Vec<Order> = orders
        .into_iter()
        .filter(|o| o.user_id.as_deref() == Some(user_id.as_str()))
        .collect();
    mine.sort_by(|a, b| b.order_date.cmp(&a.order_date).then_with(|| b.id.cmp(&a.id)));

    Ok(Json(mine))
}

// ---------------------------------------------------------------------------
// GET /api/orders
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/api/orders",
    tag = "Orders",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "All orders in placement order", body = Vec<Order>),
        (status = 403, description = "Admin access required", body = ApiErrorBody),
    ),
)]
pub async fn list_orders(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Order>>, ApiError> {
    let mut orders: Vec<Order> =
        documents::find_all(state.store.as_ref(), Collection::Orders).await?;
    orders.sort_by(|a, b| a.order_date.cmp(&b.order_date).then_with(|| a.id.cmp(&b.id)));
    Ok(Json(orders))
}

// ---------------------------------------------------------------------------
// PUT /api/orders/:id
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    pub status: Option<String>,
}

#[utoipa::path(
    put,
    path = "/api/orders/{id}",
    tag = "Orders",
    security(("bearer" = [])),
    params(
        ("id" = String, Path, description = "Order ID"),
    ),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = Order),
        (status = 400, description = "Missing or unknown status", body = ApiErrorBody),
        (status = 403, description = "Admin access required", body = ApiErrorBody),
        (status = 404, description = "Order not found", body = ApiErrorBody),
    ),
)]
pub async fn update_status(
    AdminUser { user_id }: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<Order>, ApiError> {
    let raw = body
        .status
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ApiError::field("status", "Status is required"))?;
    let status: OrderStatus = raw.parse().map_err(|_| {
        let allowed: Vec<&str> = OrderStatus::ALL.iter().map(|s| s.as_str()).collect();
        ApiError::field("status", format!("Status must be one of {}", allowed.join(", ")))
    })?;

    let store = state.store.as_ref();
    let mut order: Order = documents::find(store, Collection::Orders, &id)
        .await?
        .ok_or_else(|| ApiError::not_found("Order not found"))?;

    order.status = status;
    if !documents::save(store, Collection::Orders, &order.id, &order).await? {
        return Err(ApiError::not_found("Order not found"));
    }

    tracing::info!(order_id = %order.id, %status, admin_id = %user_id, "order status updated");

    if let Some(owner) = order.user_id.as_deref() {
        state.events.to_user(owner, &Event::order_status_update(&order));
    }

    Ok(Json(order))
}
