use crate::auth::tokens::DEFAULT_TOKEN_TTL_SECS;
use crate::providers::images::CloudinaryCredentials;

/// Order API configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// HS256 secret for access tokens.
    pub jwt_secret: String,
    /// Port the HTTP server binds to.
    pub port: u16,
    /// Access token lifetime in seconds.
    pub token_ttl_secs: i64,
    /// Enables `POST /api/auth/create-admin`.
    pub allow_admin_creation: bool,
    pub stripe_secret_key: Option<String>,
    /// Stripe API origin (overridable for tests and proxies).
    pub stripe_api_base: String,
    /// Cloudinary account; uploads are refused when unset.
    pub cloudinary: Option<CloudinaryCredentials>,
    /// Populate an empty store with demo catalog data at startup.
    pub seed_demo_data: bool,
    pub seed_admin_email: String,
    pub seed_admin_password: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Panics with a descriptive message if a required variable is missing.
    pub fn from_env() -> Self {
        let cloudinary = match (
            optional_var("CLOUDINARY_CLOUD_NAME"),
            optional_var("CLOUDINARY_API_KEY"),
            optional_var("CLOUDINARY_API_SECRET"),
        ) {
            (Some(cloud_name), Some(api_key), Some(api_secret)) => Some(CloudinaryCredentials {
                cloud_name,
                api_key,
                api_secret,
            }),
            _ => None,
        };

        Self {
            jwt_secret: required_var("JWT_SECRET"),
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5002),
            token_ttl_secs: std::env::var("TOKEN_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|ttl| *ttl > 0)
                .unwrap_or(DEFAULT_TOKEN_TTL_SECS),
            allow_admin_creation: flag_var("ALLOW_ADMIN_CREATION"),
            stripe_secret_key: optional_var("STRIPE_SECRET_KEY"),
            stripe_api_base: optional_var("STRIPE_API_BASE")
                .unwrap_or_else(|| "https://api.stripe.com".to_string()),
            cloudinary,
            seed_demo_data: flag_var("SEED_DEMO_DATA"),
            seed_admin_email: optional_var("SEED_ADMIN_EMAIL")
                .unwrap_or_else(|| "admin@example.com".to_string()),
            seed_admin_password: optional_var("SEED_ADMIN_PASSWORD")
                .unwrap_or_else(|| "password123".to_string()),
        }
    }

    /// Configuration for tests: fixed secret, no external services.
    pub fn for_tests(jwt_secret: &str) -> Self {
        Self {
            jwt_secret: jwt_secret.to_string(),
            port: 0,
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
            allow_admin_creation: false,
            stripe_secret_key: None,
            stripe_api_base: "https://api.stripe.com".to_string(),
            cloudinary: None,
            seed_demo_data: false,
            seed_admin_email: "admin@example.com".to_string(),
            seed_admin_password: "password123".to_string(),
        }
    }
}

fn required_var(name: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| panic!("{name} env var is required"))
}

fn optional_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.trim().is_empty())
}

fn flag_var(name: &str) -> bool {
    optional_var(name).is_some_and(|v| parse_flag(&v))
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}
