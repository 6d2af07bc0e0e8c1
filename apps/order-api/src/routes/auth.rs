//! Account registration, login and push-token endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{patch, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::middleware::AuthUser;
use crate::auth::password;
use crate::db::documents;
use crate::db::store::Collection;
use crate::error::{ApiError, ApiErrorBody, FieldError};
use crate::models::user::{self, Role, User, UserResponse};
use crate::AppState;

use super::MessageResponse;

const MIN_PASSWORD_LEN: usize = 6;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/create-admin", post(create_admin))
        .route("/login", post(login))
        .route("/fcm-token", patch(update_fcm_token))
}

fn validate_credentials(email: &str, password: &str) -> Result<(), ApiError> {
    let mut errors = Vec::new();
    if !email.contains('@') || email.trim().len() < 3 {
        errors.push(FieldError {
            field: "email".to_string(),
            message: "Please include a valid email".to_string(),
        });
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        errors.push(FieldError {
            field: "password".to_string(),
            message: "Password must be 6 or more characters".to_string(),
        });
    }
    if !errors.is_empty() {
        return Err(ApiError::validation(errors));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// POST /api/auth/register
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterResponse {
    pub message: String,
    pub user: UserResponse,
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = RegisterResponse),
        (status = 400, description = "Validation error or duplicate email", body = ApiErrorBody),
    ),
)]
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    validate_credentials(&body.email, &body.password)?;

    let name = body
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());
    let user = user::create(state.store.as_ref(), &body.email, &body.password, name, Role::User).await?;

    tracing::info!(user_id = %user.id, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User created successfully".to_string(),
            user: user.into(),
        }),
    ))
}

// ---------------------------------------------------------------------------
// POST /api/auth/create-admin
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, ToSchema)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

#[utoipa::path(
    post,
    path = "/api/auth/create-admin",
    tag = "Auth",
    request_body = CredentialsRequest,
    responses(
        (status = 201, description = "Admin account created", body = RegisterResponse),
        (status = 400, description = "Validation error or duplicate email", body = ApiErrorBody),
        (status = 403, description = "Admin creation disabled", body = ApiErrorBody),
    ),
)]
pub async fn create_admin(
    State(state): State<AppState>,
    Json(body): Json<CredentialsRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    if !state.config.allow_admin_creation {
        return Err(ApiError::forbidden("Admin creation is not allowed"));
    }
    validate_credentials(&body.email, &body.password)?;

    let user = user::create(state.store.as_ref(), &body.email, &body.password, None, Role::Admin).await?;

    tracing::warn!(user_id = %user.id, "admin account created via API");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "Admin user created successfully".to_string(),
            user: user.into(),
        }),
    ))
}

// ---------------------------------------------------------------------------
// POST /api/auth/login
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Access token issued", body = LoginResponse),
        (status = 400, description = "Invalid credentials", body = ApiErrorBody),
        (status = 404, description = "User not found", body = ApiErrorBody),
    ),
)]
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<CredentialsRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    if body.email.trim().is_empty() || body.password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }

    let user = user::find_by_email(state.store.as_ref(), &body.email)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    password::verify_password(&body.password, &user.password_hash)?;

    let token = state.tokens.issue(&user.id, user.role, user.name.as_deref())?;

    tracing::info!(user_id = %user.id, role = ?user.role, "login succeeded");

    Ok(Json(LoginResponse { token }))
}

// ---------------------------------------------------------------------------
// PATCH /api/auth/fcm-token
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FcmTokenRequest {
    pub fcm_token: String,
}

#[utoipa::path(
    patch,
    path = "/api/auth/fcm-token",
    tag = "Auth",
    security(("bearer" = [])),
    request_body = FcmTokenRequest,
    responses(
        (status = 200, description = "Push token stored", body = MessageResponse),
        (status = 400, description = "Missing token", body = ApiErrorBody),
        (status = 401, description = "Unauthorized", body = ApiErrorBody),
        (status = 404, description = "User not found", body = ApiErrorBody),
    ),
)]
pub async fn update_fcm_token(
    AuthUser { user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<FcmTokenRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let fcm_token = body.fcm_token.trim();
    if fcm_token.is_empty() {
        return Err(ApiError::field("fcmToken", "FCM token is required"));
    }

    let store = state.store.as_ref();
    let mut user: User = documents::find(store, Collection::Users, &user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    user.fcm_token = Some(fcm_token.to_string());
    if !documents::save(store, Collection::Users, &user.id, &user).await? {
        return Err(ApiError::not_found("User not found"));
    }

    tracing::debug!(%user_id, "fcm token updated");

    Ok(Json(MessageResponse::new("FCM token updated successfully")))
}
