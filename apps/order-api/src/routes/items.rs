//! Menu item endpoints under `/api/menu`.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use utoipa::ToSchema;

use fastfood_common::id::{prefix, prefixed_ulid};

use crate::auth::middleware::AdminUser;
use crate::db::documents;
use crate::db::store::Collection;
use crate::error::{ApiError, ApiErrorBody, FieldError};
use crate::gateway::events::Event;
use crate::models::menu_item::MenuItem;
use crate::AppState;

use super::MessageResponse;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_items).post(create_item))
        .route("/{id}", get(get_item).put(update_item).delete(delete_item))
}

fn validate_price(price: f64) -> Result<(), ApiError> {
    if !price.is_finite() || price < 0.0 {
        return Err(ApiError::field("price", "Price must be a non-negative number"));
    }
    Ok(())
}

fn clean_list(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

// ---------------------------------------------------------------------------
// GET /api/menu
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ListItemsQuery {
    pub category: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/menu",
    tag = "Menu",
    params(
        ("category" = Option<String>, Query, description = "Only items in this category (case-insensitive)"),
    ),
    responses(
        (status = 200, description = "Menu items", body = Vec<MenuItem>),
    ),
)]
pub async fn list_items(
    State(state): State<AppState>,
    Query(query): Query<ListItemsQuery>,
) -> Result<Json<Vec<MenuItem>>, ApiError> {
    let items: Vec<MenuItem> = documents::find_all(state.store.as_ref(), Collection::MenuItems).await?;

    let items = match query.category.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        Some(category) => items.into_iter().filter(|i| i.in_category(category)).collect(),
        None => items,
    };

    Ok(Json(items))
}

// ---------------------------------------------------------------------------
// GET /api/menu/:id
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/api/menu/{id}",
    tag = "Menu",
    params(
        ("id" = String, Path, description = "Menu item ID"),
    ),
    responses(
        (status = 200, description = "Menu item", body = MenuItem),
        (status = 404, description = "Menu item not found", body = ApiErrorBody),
    ),
)]
pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MenuItem>, ApiError> {
    let item = documents::find(state.store.as_ref(), Collection::MenuItems, &id)
        .await?
        .ok_or_else(|| ApiError::not_found("Menu item not found"))?;
    Ok(Json(item))
}

// ---------------------------------------------------------------------------
// POST /api/menu
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemRequest {
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub option_types: Vec<String>,
    #[serde(default)]
    pub removable_ingredients: Vec<String>,
}

#[utoipa::path(
    post,
    path = "/api/menu",
    tag = "Menu",
    security(("bearer" = [])),
    request_body = CreateItemRequest,
    responses(
        (status = 201, description = "Menu item created", body = MenuItem),
        (status = 400, description = "Validation error", body = ApiErrorBody),
        (status = 403, description = "Admin access required", body = ApiErrorBody),
    ),
)]
pub async fn create_item(
    AdminUser { user_id }: AdminUser,
    State(state): State<AppState>,
    Json(body): Json<CreateItemRequest>,
) -> Result<(StatusCode, Json<MenuItem>), ApiError> {
    let name = body.name.trim().to_string();
    let category = body.category.trim().to_string();

    let mut errors = Vec::new();
    if name.is_empty() {
        errors.push(FieldError {
            field: "name".to_string(),
            message: "Name is required".to_string(),
        });
    }
    if category.is_empty() {
        errors.push(FieldError {
            field: "category".to_string(),
            message: "Category is required".to_string(),
        });
    }
    match body.price {
        Some(price) if price.is_finite() && price >= 0.0 => {}
        _ => errors.push(FieldError {
            field: "price".to_string(),
            message: "Price must be a non-negative number".to_string(),
        }),
    }
    if !errors.is_empty() {
        return Err(ApiError::validation(errors));
    }

    let item = MenuItem {
        id: prefixed_ulid(prefix::MENU_ITEM),
        name,
        description: body.description,
        price: body.price.unwrap_or_default(),
        image_url: body.image_url,
        category,
        option_types: clean_list(body.option_types),
        removable_ingredients: clean_list(body.removable_ingredients),
    };
    documents::insert(state.store.as_ref(), Collection::MenuItems, &item.id, &item).await?;

    tracing::info!(item_id = %item.id, %user_id, "menu item created");
    state.events.to_all(&Event::menu_update());

    Ok((StatusCode::CREATED, Json(item)))
}

// ---------------------------------------------------------------------------
// PUT /api/menu/:id
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub option_types: Option<Vec<String>>,
    pub removable_ingredients: Option<Vec<String>>,
}

#[utoipa::path(
    put,
    path = "/api/menu/{id}",
    tag = "Menu",
    security(("bearer" = [])),
    params(
        ("id" = String, Path, description = "Menu item ID"),
    ),
    request_body = UpdateItemRequest,
    responses(
        (status = 200, description = "Menu item updated", body = MenuItem),
        (status = 400, description = "Validation error", body = ApiErrorBody),
        (status = 404, description = "Menu item not found", body = ApiErrorBody),
    ),
)]
pub async fn update_item(
    AdminUser { user_id }: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateItemRequest>,
) -> Result<Json<MenuItem>, ApiError> {
    let store = state.store.as_ref();
    let mut item: MenuItem = documents::find(store, Collection::MenuItems, &id)
        .await?
        .ok_or_else(|| ApiError::not_found("Menu item not found"))?;

    if let Some(name) = body.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(ApiError::field("name", "Name cannot be empty"));
        }
        item.name = name;
    }
    if let Some(category) = body.category {
        let category = category.trim().to_string();
        if category.is_empty() {
            return Err(ApiError::field("category", "Category cannot be empty"));
        }
        item.category = category;
    }
    if let Some(price) = body.price {
        validate_price(price)?;
        item.price = price;
    }
    if let Some(description) = body.description {
        item.description = Some(description);
    }
    if let Some(url) = body.image_url {
        item.image_url = Some(url);
    }
    if let Some(option_types) = body.option_types {
        item.option_types = clean_list(option_types);
    }
    if let Some(removable) = body.removable_ingredients {
        item.removable_ingredients = clean_list(removable);
    }

    if !documents::save(store, Collection::MenuItems, &item.id, &item).await? {
        return Err(ApiError::not_found("Menu item not found"));
    }

    tracing::info!(item_id = %item.id, %user_id, "menu item updated");
    state.events.to_all(&Event::menu_update());

    Ok(Json(item))
}

// ---------------------------------------------------------------------------
// DELETE /api/menu/:id
// ---------------------------------------------------------------------------

#[utoipa::path(
    delete,
    path = "/api/menu/{id}",
    tag = "Menu",
    security(("bearer" = [])),
    params(
        ("id" = String, Path, description = "Menu item ID"),
    ),
    responses(
        (status = 200, description = "Menu item deleted", body = MessageResponse),
        (status = 404, description = "Menu item not found", body = ApiErrorBody),
    ),
)]
pub async fn delete_item(
    AdminUser { user_id }: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let removed: Option<MenuItem> =
        documents::remove(state.store.as_ref(), Collection::MenuItems, &id).await?;
    if removed.is_none() {
        return Err(ApiError::not_found("Menu item not found"));
    }

    tracing::info!(item_id = %id, %user_id, "menu item deleted");
    state.events.to_all(&Event::menu_update());

    Ok(Json(MessageResponse::new("Menu item deleted")))
}
