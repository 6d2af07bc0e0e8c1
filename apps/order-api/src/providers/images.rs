//! Image hosting via Cloudinary signed uploads.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Deserialize;
use sha1::{Digest, Sha1};

use crate::error::ApiError;

/// Folder for menu item and option images.
pub const MENU_IMAGE_FOLDER: &str = "fast-food-app";

/// Folder for category background images.
pub const CATEGORY_IMAGE_FOLDER: &str = "fast-food-app-categories";

/// Stores uploaded images and returns a public HTTPS URL.
#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn upload(&self, bytes: Vec<u8>, content_type: &str, folder: &str)
        -> Result<String, ApiError>;
}

#[derive(Debug, Clone)]
pub struct CloudinaryCredentials {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

#[derive(Clone)]
pub struct CloudinaryClient {
    credentials: Option<CloudinaryCredentials>,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

impl CloudinaryClient {
    pub fn new(credentials: Option<CloudinaryCredentials>, http: reqwest::Client) -> Self {
        Self { credentials, http }
    }
}

/// Signature over the alphabetically sorted upload parameters followed by the
/// API secret.
pub fn sign_upload(folder: &str, timestamp: i64, api_secret: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(format!("folder={folder}&timestamp={timestamp}{api_secret}"));
    format!("{:x}", hasher.finalize())
}

#[async_trait]
impl ImageStore for CloudinaryClient {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        content_type: &str,
        folder: &str,
    ) -> Result<String, ApiError> {
        let Some(creds) = &self.credentials else {
            return Err(ApiError::service_unavailable("Image uploads are not configured"));
        };

        let timestamp = chrono::Utc::now().timestamp();
        let signature = sign_upload(folder, timestamp, &creds.api_secret);
        let data_uri = format!("data:{content_type};base64,{}", STANDARD.encode(&bytes));
        let timestamp = timestamp.to_string();

        let url = format!(
            "https://api.cloudinary.com/v1_1/{}/image/upload",
            creds.cloud_name
        );
        let form = [
            ("file", data_uri.as_str()),
            ("api_key", creds.api_key.as_str()),
            ("timestamp", timestamp.as_str()),
            ("folder", folder),
            ("signature", signature.as_str()),
        ];

        let resp = self.http.post(&url).form(&form).send().await?;
        if !resp.status().is_success() {
            tracing::error!(status = %resp.status(), %folder, "image upload failed");
            return Err(ApiError::bad_gateway("Image upload failed"));
        }

        let body: UploadResponse = resp.json().await?;
        tracing::info!(%folder, url = %body.secure_url, "image uploaded");
        Ok(body.secure_url)
    }
}
