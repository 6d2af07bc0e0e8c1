use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use fastfood_common::id::{prefix, prefixed_ulid};

use crate::auth::password;
use crate::db::documents::{self, unique};
use crate::db::store::{Collection, DocumentStore};
use crate::error::ApiError;

/// Access level carried by every user record and access token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

/// A stored account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub fcm_token: Option<String>,
}

/// Public view of a user (never includes the password hash).
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub role: Role,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
        }
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Find a user by email (case-insensitive).
pub async fn find_by_email(
    store: &dyn DocumentStore,
    email: &str,
) -> Result<Option<User>, ApiError> {
    let email = normalize_email(email);
    let users: Vec<User> = documents::find_all(store, Collection::Users).await?;
    Ok(users.into_iter().find(|u| u.email == email))
}

/// Create an account with an Argon2id-hashed password.
///
/// Fails with `400 User already exists` if the email is taken. The email is
/// reserved before hashing, so concurrent sign-ups for one address cannot
/// both succeed.
pub async fn create(
    store: &dyn DocumentStore,
    email: &str,
    password: &str,
    name: Option<String>,
    role: Role,
) -> Result<User, ApiError> {
    let email = normalize_email(email);
    let id = prefixed_ulid(prefix::USER);

    if !documents::claim_unique(store, unique::USER_EMAIL, &email, &id).await? {
        return Err(ApiError::bad_request("User already exists"));
    }

    match insert_user(store, id, email.clone(), password, name, role).await {
        Ok(user) => Ok(user),
        Err(err) => {
            documents::release_unique(store, unique::USER_EMAIL, &email).await?;
            Err(err)
        }
    }
}

async fn insert_user(
    store: &dyn DocumentStore,
    id: String,
    email: String,
    password: &str,
    name: Option<String>,
    role: Role,
) -> Result<User, ApiError> {
    let user = User {
        id,
        email,
        password_hash: password::hash_password(password)?,
        name,
        role,
        fcm_token: None,
    };
    documents::insert(store, Collection::Users, &user.id, &user).await?;
    Ok(user)
}
