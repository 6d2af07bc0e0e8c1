//! Bearer token extractors for plain HTTP requests.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::models::user::Role;
use crate::AppState;

/// Authenticated user extracted from the `Authorization: Bearer <token>` header.
///
/// Uses the same `TokenService::verify` as the gateway handshake, so a token
/// accepted here is accepted on `/ws` and vice versa.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
    pub role: Role,
}

/// Authenticated user that must also hold the admin role.
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub user_id: String,
}

/// Rejection returned when the bearer token is missing, invalid, or lacks the
/// required role.
pub struct AuthError {
    status: StatusCode,
    code: &'static str,
    message: &'static str,
}

impl AuthError {
    fn unauthorized(message: &'static str) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            code: "UNAUTHORIZED",
            message,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": {
                "code": self.code,
                "message": self.message
            }
        });
        (self.status, Json(body)).into_response()
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(AuthError::unauthorized("Missing Authorization header"))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::unauthorized("Invalid Authorization header format"))?;

        let identity = state
            .tokens
            .verify(token)
            .map_err(|e| AuthError::unauthorized(e.message()))?;

        Ok(AuthUser {
            user_id: identity.subject_id,
            role: identity.role,
        })
    }
}

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != Role::Admin {
            return Err(AuthError {
                status: StatusCode::FORBIDDEN,
                code: "FORBIDDEN",
                message: "Admin access required",
            });
        }
        Ok(AdminUser {
            user_id: user.user_id,
        })
    }
}
