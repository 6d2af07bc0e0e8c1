//! Menu category endpoints under `/api/menu/categories`.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Deserialize;
use utoipa::ToSchema;

use fastfood_common::id::{prefix, prefixed_ulid};

use crate::auth::middleware::AdminUser;
use crate::db::documents::{self, unique};
use crate::db::store::{Collection, DocumentStore};
use crate::error::{ApiError, ApiErrorBody, FieldError};
use crate::gateway::events::Event;
use crate::models::category::MenuCategory;
use crate::providers::images::CATEGORY_IMAGE_FOLDER;
use crate::AppState;

use super::uploads::{read_image_field, upload_body_limit};
use super::MessageResponse;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/{id}",
            put(update_category).delete(delete_category),
        )
        .route(
            "/categories/{id}/background-image",
            put(update_background_image).layer(upload_body_limit()),
        )
}

async fn load(store: &dyn DocumentStore, id: &str) -> Result<MenuCategory, ApiError> {
    documents::find(store, Collection::MenuCategories, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Category not found"))
}

/// Reserve a `type` slug for `category_id`, failing if another category holds it.
async fn claim_type(
    store: &dyn DocumentStore,
    category_type: &str,
    category_id: &str,
) -> Result<(), ApiError> {
    if !documents::claim_unique(store, unique::CATEGORY_TYPE, category_type, category_id).await? {
        return Err(ApiError::bad_request("This category type already exists"));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// GET /api/menu/categories
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/api/menu/categories",
    tag = "Menu",
    responses(
        (status = 200, description = "All categories", body = Vec<MenuCategory>),
    ),
)]
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<MenuCategory>>, ApiError> {
    let categories = documents::find_all(state.store.as_ref(), Collection::MenuCategories).await?;
    Ok(Json(categories))
}

// ---------------------------------------------------------------------------
// POST /api/menu/categories
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub category_type: String,
    pub background_image_url: Option<String>,
    pub font_color: Option<String>,
    pub background_color: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/menu/categories",
    tag = "Menu",
    security(("bearer" = [])),
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = MenuCategory),
        (status = 400, description = "Validation error or duplicate type", body = ApiErrorBody),
        (status = 403, description = "Admin access required", body = ApiErrorBody),
    ),
)]
pub async fn create_category(
    AdminUser { user_id }: AdminUser,
    State(state): State<AppState>,
    Json(body): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<MenuCategory>), ApiError> {
    let name = body.name.trim().to_string();
    let category_type = body.category_type.trim().to_string();

    let mut errors = Vec::new();
    if name.is_empty() {
        errors.push(FieldError {
            field: "name".to_string(),
            message: "Category name is required".to_string(),
        });
    }
    if category_type.is_empty() {
        errors.push(FieldError {
            field: "type".to_string(),
            message: "Category type is required".to_string(),
        });
    }
    if !errors.is_empty() {
        return Err(ApiError::validation(errors));
    }

    let store = state.store.as_ref();
    let id = prefixed_ulid(prefix::CATEGORY);
    claim_type(store, &category_type, &id).await?;

    let category = MenuCategory {
        id,
        name,
        category_type,
        background_image_url: body.background_image_url,
        font_color: body.font_color,
        background_color: body.background_color,
    };
    if let Err(err) =
        documents::insert(store, Collection::MenuCategories, &category.id, &category).await
    {
        documents::release_unique(store, unique::CATEGORY_TYPE, &category.category_type).await?;
        return Err(err);
    }

    tracing::info!(category_id = %category.id, %user_id, "category created");
    state.events.to_all(&Event::menu_update());

    Ok((StatusCode::CREATED, Json(category)))
}

// ---------------------------------------------------------------------------
// PUT /api/menu/categories/:id
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub category_type: Option<String>,
    pub background_image_url: Option<String>,
    pub font_color: Option<String>,
    pub background_color: Option<String>,
}

#[utoipa::path(
    put,
    path = "/api/menu/categories/{id}",
    tag = "Menu",
    security(("bearer" = [])),
    params(
        ("id" = String, Path, description = "Category ID"),
    ),
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Category updated", body = MenuCategory),
        (status = 400, description = "Validation error or duplicate type", body = ApiErrorBody),
        (status = 404, description = "Category not found", body = ApiErrorBody),
    ),
)]
pub async fn update_category(
    AdminUser { user_id }: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateCategoryRequest>,
) -> Result<Json<MenuCategory>, ApiError> {
    let store = state.store.as_ref();
    let mut category = load(store, &id).await?;

    if let Some(name) = body.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(ApiError::field("name", "Category name cannot be empty"));
        }
        category.name = name;
    }
    let mut renamed_from = None;
    if let Some(category_type) = body.category_type {
        let category_type = category_type.trim().to_string();
        if category_type.is_empty() {
            return Err(ApiError::field("type", "Category type cannot be empty"));
        }
        if category_type != category.category_type {
            claim_type(store, &category_type, &category.id).await?;
            renamed_from = Some(std::mem::replace(&mut category.category_type, category_type));
        }
    }
    if let Some(url) = body.background_image_url {
        category.background_image_url = Some(url);
    }
    if let Some(color) = body.font_color {
        category.font_color = Some(color);
    }
    if let Some(color) = body.background_color {
        category.background_color = Some(color);
    }

    if !documents::save(store, Collection::MenuCategories, &category.id, &category).await? {
        if renamed_from.is_some() {
            documents::release_unique(store, unique::CATEGORY_TYPE, &category.category_type).await?;
        }
        return Err(ApiError::not_found("Category not found"));
    }
    if let Some(old_type) = renamed_from {
        documents::release_unique(store, unique::CATEGORY_TYPE, &old_type).await?;
    }

    tracing::info!(category_id = %category.id, %user_id, "category updated");
    state.events.to_all(&Event::menu_update());

    Ok(Json(category))
}

// ---------------------------------------------------------------------------
// DELETE /api/menu/categories/:id
// ---------------------------------------------------------------------------

#[utoipa::path(
    delete,
    path = "/api/menu/categories/{id}",
    tag = "Menu",
    security(("bearer" = [])),
    params(
        ("id" = String, Path, description = "Category ID"),
    ),
    responses(
        (status = 200, description = "Category deleted", body = MessageResponse),
        (status = 404, description = "Category not found", body = ApiErrorBody),
    ),
)]
pub async fn delete_category(
    AdminUser { user_id }: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let store = state.store.as_ref();
    let removed: MenuCategory = documents::remove(store, Collection::MenuCategories, &id)
        .await?
        .ok_or_else(|| ApiError::not_found("Category not found"))?;
    documents::release_unique(store, unique::CATEGORY_TYPE, &removed.category_type).await?;

    tracing::info!(category_id = %id, %user_id, "category deleted");
    state.events.to_all(&Event::menu_update());

    Ok(Json(MessageResponse::new("Category deleted")))
}

// ---------------------------------------------------------------------------
// PUT /api/menu/categories/:id/background-image
// ---------------------------------------------------------------------------

#[utoipa::path(
    put,
    path = "/api/menu/categories/{id}/background-image",
    tag = "Menu",
    security(("bearer" = [])),
    params(
        ("id" = String, Path, description = "Category ID"),
    ),
    responses(
        (status = 200, description = "Background image replaced", body = MenuCategory),
        (status = 400, description = "No image file provided", body = ApiErrorBody),
        (status = 404, description = "Category not found", body = ApiErrorBody),
        (status = 502, description = "Image store failure", body = ApiErrorBody),
    ),
)]
pub async fn update_background_image(
    AdminUser { user_id }: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<MenuCategory>, ApiError> {
    let store = state.store.as_ref();
    let mut category = load(store, &id).await?;

    let image = read_image_field(multipart).await?;
    let url = state
        .images
        .upload(image.bytes, &image.content_type, CATEGORY_IMAGE_FOLDER)
        .await?;

    category.background_image_url = Some(url);
    if !documents::save(store, Collection::MenuCategories, &category.id, &category).await? {
        return Err(ApiError::not_found("Category not found"));
    }

    tracing::info!(category_id = %category.id, %user_id, "category background image updated");
    state.events.to_all(&Event::menu_update());

    Ok(Json(category))
}
