//! # Application State
//!
//! Shared state for the Axum application.
//! Holds configuration, the payment strategy, the user platform client and
//! the tracker for background role upgrades.

use bridge_core::{BoxedPaymentStrategy, BoxedRolePlatform, BridgeError, CheckoutUrls};
use bridge_platform::PlatformClient;
use bridge_stripe::StripeCheckoutStrategy;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::task::TaskTracker;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Frontend redirect targets for hosted checkout
    pub checkout_urls: CheckoutUrls,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Result<Self, BridgeError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, BridgeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let success_url = lookup("FRONTEND_SUCCESS_URL").ok_or_else(|| {
            BridgeError::Configuration("FRONTEND_SUCCESS_URL not set".to_string())
        })?;
        let cancel_url = lookup("FRONTEND_CANCEL_URL").ok_or_else(|| {
            BridgeError::Configuration("FRONTEND_CANCEL_URL not set".to_string())
        })?;

        let port = match lookup("PORT") {
            Some(port) => port.parse().map_err(|_| {
                BridgeError::Configuration(format!("PORT is not a valid port: {}", port))
            })?,
            None => 3000,
        };

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            environment: lookup("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            checkout_urls: CheckoutUrls::new(success_url, cancel_url),
        })
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> Result<SocketAddr, BridgeError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| BridgeError::Configuration(format!("Invalid socket address: {}", e)))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Application config, built once at startup
    pub config: Arc<AppConfig>,
    /// Payment provider
    pub payments: BoxedPaymentStrategy,
    /// User platform receiving role upgrades
    pub platform: BoxedRolePlatform,
    /// Background role upgrades still in flight
    pub tasks: TaskTracker,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        payments: BoxedPaymentStrategy,
        platform: BoxedRolePlatform,
    ) -> Self {
        Self {
            config: Arc::new(config),
            payments,
            platform,
            tasks: TaskTracker::new(),
        }
    }

    /// Create state with Stripe and the Base44 client, all from environment
    pub fn from_env() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;

        let stripe = StripeCheckoutStrategy::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to initialize Stripe: {}", e))?;
        let platform = PlatformClient::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to initialize platform client: {}", e))?;

        Ok(Self::new(config, Arc::new(stripe), Arc::new(platform)))
    }
}
