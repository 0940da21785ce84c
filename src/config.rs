use anyhow::{Context, Result};

use crate::endpoints::{DEFAULT_NO_RETRY_FRAGMENTS, DEFAULT_PUBLIC_FRAGMENTS};

/// Default path of the session verification endpoint
pub const DEFAULT_SESSION_CHECK_PATH: &str = "/api/account/check-authentication";

/// Default path of the token issuance endpoint
pub const DEFAULT_TOKEN_PATH: &str = "/api/account/authorization-token";

/// Default login surface the navigation sink points users at
pub const DEFAULT_LOGIN_ROUTE: &str = "/login";

/// Pipeline configuration
///
/// Built programmatically via `Default` plus struct update syntax, or from
/// the environment with [`AuthConfig::from_env`].
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// Identity provider origin, e.g. "https://console.example.com"
    pub base_url: String,

    /// Path of the session verification endpoint
    pub session_check_path: String,

    /// Path of the token issuance endpoint
    pub token_issuance_path: String,

    /// Route the navigation sink sends users to when the session ends
    pub login_route: String,

    /// URL fragments exempt from credential attachment and preflight.
    /// Maintained separately from `no_retry_endpoints`; a new identity
    /// route must be added to both lists.
    pub public_endpoints: Vec<String>,

    /// URL fragments exempt from the 401/403 recovery path.
    /// Maintained separately from `public_endpoints`; a new identity
    /// route must be added to both lists.
    pub no_retry_endpoints: Vec<String>,

    // HTTP client tuning
    pub http_connect_timeout: u64,
    pub http_request_timeout: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            session_check_path: DEFAULT_SESSION_CHECK_PATH.to_string(),
            token_issuance_path: DEFAULT_TOKEN_PATH.to_string(),
            login_route: DEFAULT_LOGIN_ROUTE.to_string(),
            public_endpoints: DEFAULT_PUBLIC_FRAGMENTS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            no_retry_endpoints: DEFAULT_NO_RETRY_FRAGMENTS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            http_connect_timeout: 30,
            http_request_timeout: 300,
        }
    }
}

impl AuthConfig {
    /// Load configuration from the environment with priority: ENV > defaults
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let base_url = std::env::var("AUTH_BASE_URL")
            .context("AUTH_BASE_URL is required (identity provider origin)")?;

        let config = AuthConfig {
            base_url,

            session_check_path: std::env::var("AUTH_SESSION_CHECK_PATH")
                .unwrap_or_else(|_| DEFAULT_SESSION_CHECK_PATH.to_string()),

            token_issuance_path: std::env::var("AUTH_TOKEN_PATH")
                .unwrap_or_else(|_| DEFAULT_TOKEN_PATH.to_string()),

            login_route: std::env::var("AUTH_LOGIN_ROUTE")
                .unwrap_or_else(|_| DEFAULT_LOGIN_ROUTE.to_string()),

            http_connect_timeout: std::env::var("HTTP_CONNECT_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),

            http_request_timeout: std::env::var("HTTP_REQUEST_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(300),

            ..AuthConfig::default()
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration consistency
    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            anyhow::bail!("base_url must not be empty");
        }
        if self.base_url.ends_with('/') {
            anyhow::bail!("base_url must not end with a slash: {}", self.base_url);
        }
        if !self.session_check_path.starts_with('/') {
            anyhow::bail!(
                "session_check_path must start with a slash: {}",
                self.session_check_path
            );
        }
        if !self.token_issuance_path.starts_with('/') {
            anyhow::bail!(
                "token_issuance_path must start with a slash: {}",
                self.token_issuance_path
            );
        }
        Ok(())
    }

    /// Absolute URL of the session verification endpoint
    pub fn session_check_url(&self) -> String {
        format!("{}{}", self.base_url, self.session_check_path)
    }

    /// Absolute URL of the token issuance endpoint
    pub fn token_issuance_url(&self) -> String {
        format!("{}{}", self.base_url, self.token_issuance_path)
    }
}
