//! # Stripe Configuration
//!
//! Configuration management for the Stripe integration.
//! All secrets are loaded from environment variables.

use crate::webhook::DEFAULT_TOLERANCE_SECS;
use bridge_core::BridgeError;
use std::env;

const DEFAULT_API_BASE_URL: &str = "https://api.stripe.com";
const DEFAULT_API_VERSION: &str = "2024-12-18.acacia";

/// Stripe API configuration
#[derive(Debug, Clone)]
pub struct StripeConfig {
    /// Secret API key (sk_test_..., sk_live_... or a restricted rk_ key)
    pub secret_key: String,

    /// Webhook signing secret (whsec_...)
    pub webhook_secret: String,

    /// API base URL (for testing/mocking)
    pub api_base_url: String,

    /// API version
    pub api_version: String,

    /// Accepted age of a signed webhook delivery, in seconds
    pub webhook_tolerance_secs: i64,
}

impl StripeConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `STRIPE_SECRET_KEY`
    /// - `STRIPE_WEBHOOK_SECRET`
    ///
    /// Optional:
    /// - `STRIPE_API_BASE` (defaults to `https://api.stripe.com`)
    pub fn from_env() -> Result<Self, BridgeError> {
        dotenvy::dotenv().ok(); // Load .env file if present
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, BridgeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret_key = lookup("STRIPE_SECRET_KEY").ok_or_else(|| {
            BridgeError::Configuration("STRIPE_SECRET_KEY not set".to_string())
        })?;

        let webhook_secret = lookup("STRIPE_WEBHOOK_SECRET").ok_or_else(|| {
            BridgeError::Configuration("STRIPE_WEBHOOK_SECRET not set".to_string())
        })?;

        // Validate key formats
        if !["sk_test_", "sk_live_", "rk_test_", "rk_live_"]
            .iter()
            .any(|prefix| secret_key.starts_with(prefix))
        {
            return Err(BridgeError::Configuration(
                "STRIPE_SECRET_KEY must start with sk_test_, sk_live_, rk_test_ or rk_live_"
                    .to_string(),
            ));
        }

        if !webhook_secret.starts_with("whsec_") {
            return Err(BridgeError::Configuration(
                "STRIPE_WEBHOOK_SECRET must start with whsec_".to_string(),
            ));
        }

        let mut config = Self::new(secret_key, webhook_secret);
        if let Some(base) = lookup("STRIPE_API_BASE") {
            config = config.with_api_base_url(base);
        }

        Ok(config)
    }

    /// Create config with explicit values (for testing)
    pub fn new(secret_key: impl Into<String>, webhook_secret: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            webhook_secret: webhook_secret.into(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            webhook_tolerance_secs: DEFAULT_TOLERANCE_SECS,
        }
    }

    /// Check if using test keys
    pub fn is_test_mode(&self) -> bool {
        self.secret_key.starts_with("sk_test_") || self.secret_key.starts_with("rk_test_")
    }

    /// Get authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.secret_key)
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Builder: set webhook timestamp tolerance
    pub fn with_webhook_tolerance(mut self, secs: i64) -> Self {
        self.webhook_tolerance_secs = secs;
        self
    }
}
