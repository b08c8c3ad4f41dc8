//! # Role Update Client

use crate::config::PlatformConfig;
use async_trait::async_trait;
use bridge_core::{BridgeError, BridgeResult, RolePlatform, RoleUpgrade};
use reqwest::{Client, Url};
use tracing::{error, info, instrument};

const PLATFORM: &str = "base44";

/// HTTP client for the user platform's role endpoint
pub struct PlatformClient {
    config: PlatformConfig,
    client: Client,
}

impl PlatformClient {
    pub fn new(config: PlatformConfig) -> BridgeResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| {
                BridgeError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> BridgeResult<Self> {
        Self::new(PlatformConfig::from_env()?)
    }

    /// `<base>/users/<id>/role`, with the id encoded as a single path segment
    pub fn role_url(&self, external_user_id: &str) -> BridgeResult<Url> {
        let mut url = self.config.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| {
                BridgeError::Configuration("BASE44_API_BASE cannot take a path".to_string())
            })?
            .pop_if_empty()
            .extend(["users", external_user_id, "role"]);
        Ok(url)
    }
}

#[async_trait]
impl RolePlatform for PlatformClient {
    #[instrument(skip(self), fields(external_user_id = %upgrade.external_user_id))]
    async fn upgrade_role(&self, upgrade: &RoleUpgrade) -> BridgeResult<()> {
        let url = self.role_url(&upgrade.external_user_id)?;

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.config.api_key)
            .json(&upgrade.payload())
            .send()
            .await
            .map_err(|e| BridgeError::upstream(PLATFORM, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Platform API error: status={}, body={}", status, body);
            return Err(BridgeError::upstream(
                PLATFORM,
                format!("HTTP {}: {}", status, body),
            ));
        }

        info!(role = ?upgrade.role, "Upgraded user role");
        Ok(())
    }

    fn platform_name(&self) -> &'static str {
        PLATFORM
    }
}
