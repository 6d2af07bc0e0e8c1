//! Signed access tokens shared by HTTP authentication and the gateway handshake.

use std::fmt;

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::models::user::Role;

/// Default access token TTL in seconds (1 hour).
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// The authenticated subject behind a request or gateway connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub subject_id: String,
    pub role: Role,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

// ---------------------------------------------------------------------------
// Claims
// ---------------------------------------------------------------------------

/// Claims embedded in the access token JWT.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessClaims {
    pub user_id: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

// ---------------------------------------------------------------------------
// Verification failure
// ---------------------------------------------------------------------------

/// Why a credential was refused. Every variant is terminal for the request or
/// connection attempt that carried it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidCredential {
    Missing,
    Malformed,
    BadSignature,
    Expired,
}

impl InvalidCredential {
    pub fn message(self) -> &'static str {
        match self {
            Self::Missing => "No token provided",
            Self::Malformed => "Malformed token",
            Self::BadSignature => "Invalid token signature",
            Self::Expired => "Token expired",
        }
    }
}

impl fmt::Display for InvalidCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for InvalidCredential {}

impl From<InvalidCredential> for ApiError {
    fn from(err: InvalidCredential) -> Self {
        ApiError::unauthorized(format!("Authentication failed: {err}"))
    }
}

// ---------------------------------------------------------------------------
// Token service
// ---------------------------------------------------------------------------

/// HS256 signer/verifier built from the process-wide `JWT_SECRET`.
///
/// Verification is pure CPU work, so it is safe to call from async handlers.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl_secs: i64,
}

impl TokenService {
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl_secs,
        }
    }

    /// Mint a signed access token for a user.
    pub fn issue(
        &self,
        user_id: &str,
        role: Role,
        user_name: Option<&str>,
    ) -> Result<String, ApiError> {
        let now = Utc::now();
        let claims = AccessClaims {
            user_id: user_id.to_string(),
            role,
            user_name: user_name.map(str::to_string),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.ttl_secs)).timestamp(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(
            |e| {
                tracing::error!(?e, "failed to sign access token");
                ApiError::internal("Token signing failed")
            },
        )
    }

    /// Validate a bearer credential and return the identity it carries.
    pub fn verify(&self, credential: &str) -> Result<Identity, InvalidCredential> {
        let credential = credential.trim();
        if credential.is_empty() {
            return Err(InvalidCredential::Missing);
        }

        let data = jsonwebtoken::decode::<AccessClaims>(credential, &self.decoding, &self.validation)
            .map_err(|e| {
                tracing::debug!(?e, "access token rejected");
                match e.kind() {
                    ErrorKind::ExpiredSignature => InvalidCredential::Expired,
                    ErrorKind::InvalidSignature => InvalidCredential::BadSignature,
                    _ => InvalidCredential::Malformed,
                }
            })?;

        if data.claims.user_id.is_empty() {
            return Err(InvalidCredential::Malformed);
        }

        Ok(Identity {
            subject_id: data.claims.user_id,
            role: data.claims.role,
        })
    }
}
