//! Menu option endpoints under `/api/menu/options`.

use std::collections::BTreeSet;

use axum::extract::{Path, State};
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
use crate::models::option::MenuOption;
use crate::AppState;

use super::MessageResponse;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/options", get(list_options).post(create_option))
        .route("/options/types", get(list_option_types))
        // GET reads the segment as an option type, PUT/DELETE as an option ID.
        .route(
            "/options/{key}",
            get(list_options_by_type)
                .put(update_option)
                .delete(delete_option),
        )
}

fn validate_price(price: Option<f64>) -> Result<(), ApiError> {
    match price {
        Some(p) if !p.is_finite() || p < 0.0 => {
            Err(ApiError::field("price", "Price must be a non-negative number"))
        }
        _ => Ok(()),
    }
}

#[utoipa::path(
    get,
    path = "/api/menu/options/types",
    tag = "Menu",
    responses(
        (status = 200, description = "Distinct option types, sorted", body = Vec<String>),
    ),
)]
pub async fn list_option_types(
    State(state): State<AppState>,
) -> Result<Json<Vec<String>>, ApiError> {
    let options: Vec<MenuOption> = documents::find_all(state.store.as_ref(), Collection::Options).await?;
    let types: BTreeSet<String> = options.into_iter().map(|o| o.option_type).collect();
    Ok(Json(types.into_iter().collect()))
}

#[utoipa::path(
    get,
    path = "/api/menu/options",
    tag = "Menu",
    responses(
        (status = 200, description = "All options", body = Vec<MenuOption>),
    ),
)]
pub async fn list_options(
    State(state): State<AppState>,
) -> Result<Json<Vec<MenuOption>>, ApiError> {
    let options = documents::find_all(state.store.as_ref(), Collection::Options).await?;
    Ok(Json(options))
}

#[utoipa::path(
    get,
    path = "/api/menu/options/{type}",
    tag = "Menu",
    params(
        ("type" = String, Path, description = "Option type, e.g. sauceOptions"),
    ),
    responses(
        (status = 200, description = "Options of the given type", body = Vec<MenuOption>),
    ),
)]
pub async fn list_options_by_type(
    State(state): State<AppState>,
    Path(option_type): Path<String>,
) -> Result<Json<Vec<MenuOption>>, ApiError> {
    let options: Vec<MenuOption> = documents::find_all(state.store.as_ref(), Collection::Options).await?;
    let options = options
        .into_iter()
        .filter(|o| o.option_type == option_type)
        .collect();
    Ok(Json(options))
}

// ---------------------------------------------------------------------------
// POST /api/menu/options
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOptionRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub option_type: String,
    pub image_url: Option<String>,
    pub price: Option<f64>,
}

#[utoipa::path(
    post,
    path = "/api/menu/options",
    tag = "Menu",
    security(("bearer" = [])),
    request_body = CreateOptionRequest,
    responses(
        (status = 201, description = "Option created", body = MenuOption),
        (status = 400, description = "Validation error", body = ApiErrorBody),
        (status = 403, description = "Admin access required", body = ApiErrorBody),
    ),
)]
pub async fn create_option(
    AdminUser { user_id }: AdminUser,
    State(state): State<AppState>,
    Json(body): Json<CreateOptionRequest>,
) -> Result<(StatusCode, Json<MenuOption>), ApiError> {
    let name = body.name.trim().to_string();
    let option_type = body.option_type.trim().to_string();

    let mut errors = Vec::new();
    if name.is_empty() {
        errors.push(FieldError {
            field: "name".to_string(),
            message: "Name is required".to_string(),
        });
    }
    if option_type.is_empty() {
        errors.push(FieldError {
            field: "type".to_string(),
            message: "Type is required".to_string(),
        });
    }
    if !errors.is_empty() {
        return Err(ApiError::validation(errors));
    }
    validate_price(body.price)?;

    let option = MenuOption {
        id: prefixed_ulid(prefix::OPTION),
        name,
        option_type,
        image_url: body.image_url,
        price: body.price,
    };
    documents::insert(state.store.as_ref(), Collection::Options, &option.id, &option).await?;

    tracing::info!(option_id = %option.id, %user_id, "option created");
    state.events.to_all(&Event::menu_update());

    Ok((StatusCode::CREATED, Json(option)))
}

// ---------------------------------------------------------------------------
// PUT /api/menu/options/:id
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOptionRequest {
    pub name: Option<String>,
    pub image_url: Option<String>,
    pub price: Option<f64>,
}

#[utoipa::path(
    put,
    path = "/api/menu/options/{id}",
    tag = "Menu",
    security(("bearer" = [])),
    params(
        ("id" = String, Path, description = "Option ID"),
    ),
    request_body = UpdateOptionRequest,
    responses(
        (status = 200, description = "Option updated", body = MenuOption),
        (status = 404, description = "Option not found", body = ApiErrorBody),
    ),
)]
pub async fn update_option(
    AdminUser { user_id }: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateOptionRequest>,
) -> Result<Json<MenuOption>, ApiError> {
    let store = state.store.as_ref();
    let mut option: MenuOption = documents::find(store, Collection::Options, &id)
        .await?
        .ok_or_else(|| ApiError::not_found("Option not found"))?;

    if let Some(name) = body.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(ApiError::field("name", "Name cannot be empty"));
        }
        option.name = name;
    }
    if let Some(url) = body.image_url {
        option.image_url = Some(url);
    }
    if body.price.is_some() {
        validate_price(body.price)?;
        option.price = body.price;
    }

    if !documents::save(store, Collection::Options, &option.id, &option).await? {
        return Err(ApiError::not_found("Option not found"));
    }

    tracing::info!(option_id = %option.id, %user_id, "option updated");
    state.events.to_all(&Event::menu_update());

    Ok(Json(option))
}

// ---------------------------------------------------------------------------
// DELETE /api/menu/options/:id
// ---------------------------------------------------------------------------

#[utoipa::path(
    delete,
    path = "/api/menu/options/{id}",
    tag = "Menu",
    security(("bearer" = [])),
    params(
        ("id" = String, Path, description = "Option ID"),
    ),
    responses(
        (status = 200, description = "Option deleted", body = MessageResponse),
        (status = 404, description = "Option not found", body = ApiErrorBody),
    ),
)]
pub async fn delete_option(
    AdminUser { user_id }: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let removed: Option<MenuOption> =
        documents::remove(state.store.as_ref(), Collection::Options, &id).await?;
    if removed.is_none() {
        return Err(ApiError::not_found("Option not found"));
    }

    tracing::info!(option_id = %id, %user_id, "option deleted");
    state.events.to_all(&Event::menu_update());

    Ok(Json(MessageResponse::new("Option deleted")))
}
