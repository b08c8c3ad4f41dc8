//! # Platform Configuration

use bridge_core::BridgeError;
use reqwest::Url;
use std::env;

/// User platform API configuration
#[derive(Debug, Clone)]
pub struct PlatformConfig {
    /// API base, e.g. `https://app.base44.com/api/apps/<app id>`
    pub api_base: Url,

    /// Bearer credential for the platform API
    pub api_key: String,
}

impl PlatformConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `BASE44_API_BASE`
    /// - `BASE44_API_KEY`
    pub fn from_env() -> Result<Self, BridgeError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, BridgeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base = lookup("BASE44_API_BASE")
            .ok_or_else(|| BridgeError::Configuration("BASE44_API_BASE not set".to_string()))?;

        let api_key = lookup("BASE44_API_KEY")
            .filter(|key| !key.is_empty())
            .ok_or_else(|| BridgeError::Configuration("BASE44_API_KEY not set".to_string()))?;

        Self::new(&api_base, api_key)
    }

    /// Create config with explicit values
    pub fn new(api_base: &str, api_key: impl Into<String>) -> Result<Self, BridgeError> {
        let api_base = Url::parse(api_base).map_err(|e| {
            BridgeError::Configuration(format!("BASE44_API_BASE is not a valid URL: {}", e))
        })?;

        if !matches!(api_base.scheme(), "http" | "https") {
            return Err(BridgeError::Configuration(format!(
                "BASE44_API_BASE must be an http(s) URL, got scheme {}",
                api_base.scheme()
            )));
        }

        Ok(Self {
            api_base,
            api_key: api_key.into(),
        })
    }
}
