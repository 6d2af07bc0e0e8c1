//! Restaurant settings (opening hours).

use std::collections::BTreeMap;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::auth::middleware::AdminUser;
use crate::db::documents;
use crate::db::store::Collection;
use crate::error::{ApiError, ApiErrorBody};
use crate::gateway::events::Event;
use crate::models::settings::{validate_hours, DailyHours, RestaurantSettings, SETTINGS_ID};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_settings).post(save_settings))
}

#[utoipa::path(
    get,
    path = "/api/settings",
    tag = "Settings",
    responses(
        (status = 200, description = "Current settings (defaults are created on first read)", body = RestaurantSettings),
    ),
)]
pub async fn get_settings(
    State(state): State<AppState>,
) -> Result<Json<RestaurantSettings>, ApiError> {
    let store = state.store.as_ref();
    if let Some(settings) = documents::find(store, Collection::Settings, SETTINGS_ID).await? {
        return Ok(Json(settings));
    }

    let settings = RestaurantSettings::default();
    documents::upsert(store, Collection::Settings, SETTINGS_ID, &settings).await?;
    tracing::info!("default restaurant settings created");

    Ok(Json(settings))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SaveSettingsRequest {
    pub hours: Option<BTreeMap<String, DailyHours>>,
}

#[utoipa::path(
    post,
    path = "/api/settings",
    tag = "Settings",
    security(("bearer" = [])),
    request_body = SaveSettingsRequest,
    responses(
        (status = 200, description = "Settings saved", body = RestaurantSettings),
        (status = 400, description = "Invalid hours", body = ApiErrorBody),
        (status = 403, description = "Admin access required", body = ApiErrorBody),
    ),
)]
pub async fn save_settings(
    AdminUser { user_id }: AdminUser,
    State(state): State<AppState>,
    Json(body): Json<SaveSettingsRequest>,
) -> Result<Json<RestaurantSettings>, ApiError> {
    let hours = body
        .hours
        .ok_or_else(|| ApiError::field("hours", "Opening hours are required"))?;

    let errors = validate_hours(&hours);
    if !errors.is_empty() {
        return Err(ApiError::validation(errors));
    }

    let settings = RestaurantSettings {
        id: SETTINGS_ID.to_string(),
        hours,
    };
    documents::upsert(state.store.as_ref(), Collection::Settings, SETTINGS_ID, &settings).await?;

    let notified = state.events.to_all(&Event::settings_updated(&settings));
    tracing::info!(%user_id, notified, "restaurant settings saved");

    Ok(Json(settings))
}
