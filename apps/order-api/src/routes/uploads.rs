//! Image upload and remote image proxy.

use axum::extract::{DefaultBodyLimit, Multipart, Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::middleware::AdminUser;
use crate::error::{ApiError, ApiErrorBody};
use crate::providers::images::MENU_IMAGE_FOLDER;
use crate::AppState;

/// Largest accepted upload, in bytes.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/upload/image", post(upload_image).layer(upload_body_limit()))
        .route("/api/image-proxy", get(image_proxy))
}

/// Body limit for multipart image routes: the image plus form overhead.
pub fn upload_body_limit() -> DefaultBodyLimit {
    DefaultBodyLimit::max(MAX_IMAGE_BYTES + 64 * 1024)
}

/// An image file read from a multipart body.
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Read the `image` field from a multipart form.
pub async fn read_image_field(mut multipart: Multipart) -> Result<ImageUpload, ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::debug!(?e, "malformed multipart body");
        ApiError::bad_request("Malformed multipart body")
    })? {
        if field.name() != Some("image") {
            continue;
        }

        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        if !content_type.starts_with("image/") {
            return Err(ApiError::field("image", "Only image files are allowed"));
        }

        let bytes = field.bytes().await.map_err(|e| {
            tracing::debug!(?e, "failed to read multipart field");
            ApiError::bad_request("Failed to read uploaded file")
        })?;
        if bytes.is_empty() {
            return Err(ApiError::field("image", "No image file provided"));
        }
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(ApiError::field("image", "Image exceeds the 10 MB limit"));
        }

        return Ok(ImageUpload {
            bytes: bytes.to_vec(),
            content_type,
        });
    }

    Err(ApiError::field("image", "No image file provided"))
}

// ---------------------------------------------------------------------------
// POST /api/upload/image
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub image_url: String,
}

#[utoipa::path(
    post,
    path = "/api/upload/image",
    tag = "Uploads",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Image stored", body = UploadResponse),
        (status = 400, description = "No image file provided", body = ApiErrorBody),
        (status = 403, description = "Admin access required", body = ApiErrorBody),
        (status = 502, description = "Image store failure", body = ApiErrorBody),
    ),
)]
pub async fn upload_image(
    AdminUser { user_id }: AdminUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let image = read_image_field(multipart).await?;
    let size = image.bytes.len();

    let image_url = state
        .images
        .upload(image.bytes, &image.content_type, MENU_IMAGE_FOLDER)
        .await?;

    tracing::info!(%user_id, size, "menu image uploaded");

    Ok(Json(UploadResponse { image_url }))
}

// ---------------------------------------------------------------------------
// GET /api/image-proxy
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ProxyQuery {
    pub url: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/image-proxy",
    tag = "Uploads",
    params(
        ("url" = String, Query, description = "Absolute http(s) URL of the image"),
    ),
    responses(
        (status = 200, description = "Image bytes with the upstream content type"),
        (status = 400, description = "Missing or invalid url", body = ApiErrorBody),
        (status = 502, description = "Upstream fetch failed", body = ApiErrorBody),
    ),
)]
pub async fn image_proxy(
    State(state): State<AppState>,
    Query(query): Query<ProxyQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let raw = query
        .url
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Image URL is required"))?;

    let url = reqwest::Url::parse(raw.trim())
        .ok()
        .filter(|u| matches!(u.scheme(), "http" | "https"))
        .ok_or_else(|| ApiError::bad_request("Image URL must be an absolute http(s) URL"))?;

    let resp = state.http.get(url.clone()).send().await?;
    if !resp.status().is_success() {
        tracing::warn!(%url, status = %resp.status(), "image proxy upstream error");
        return Err(ApiError::bad_gateway("Failed to fetch image"));
    }

    let content_type = resp
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();
    let bytes = resp.bytes().await?;

    Ok(([(CONTENT_TYPE, content_type)], bytes))
}
