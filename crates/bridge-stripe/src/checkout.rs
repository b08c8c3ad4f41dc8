//! # Stripe Checkout Sessions
//!
//! Subscription checkout through Stripe's hosted Checkout page, plus webhook
//! verification for the events it produces.

use crate::config::StripeConfig;
use crate::webhook;
use async_trait::async_trait;
use bridge_core::{
    BridgeError, BridgeResult, CheckoutRequest, CheckoutSession, CheckoutUrls, PaymentStrategy,
    WebhookEvent,
};
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, info, instrument};

const PROVIDER: &str = "stripe";

/// Checkout mode for every session this service opens
const CHECKOUT_MODE: &str = "subscription";

/// Stripe Checkout Session strategy
///
/// Uses Stripe's hosted checkout page for secure payments.
pub struct StripeCheckoutStrategy {
    config: StripeConfig,
    client: Client,
}

impl StripeCheckoutStrategy {
    /// Create a new Stripe checkout strategy
    pub fn new(config: StripeConfig) -> BridgeResult<Self> {
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
        let config = StripeConfig::from_env()?;
        Self::new(config)
    }

    pub fn config(&self) -> &StripeConfig {
        &self.config
    }

    /// Form parameters for `POST /v1/checkout/sessions`
    fn build_form_params(
        request: &CheckoutRequest,
        urls: &CheckoutUrls,
    ) -> Vec<(String, String)> {
        let mut form_params: Vec<(String, String)> = vec![
            ("mode".to_string(), CHECKOUT_MODE.to_string()),
            ("line_items[0][price]".to_string(), request.price_id.clone()),
            ("line_items[0][quantity]".to_string(), "1".to_string()),
            (
                "client_reference_id".to_string(),
                request.external_user_id.clone(),
            ),
            ("success_url".to_string(), urls.success_url()),
            ("cancel_url".to_string(), urls.cancel_url().to_string()),
        ];

        // Add customer email if provided
        if let Some(ref email) = request.customer_email {
            form_params.push(("customer_email".to_string(), email.clone()));
        }

        form_params
    }
}

#[async_trait]
impl PaymentStrategy for StripeCheckoutStrategy {
    #[instrument(skip(self, request, urls), fields(external_user_id = %request.external_user_id))]
    async fn create_checkout(
        &self,
        request: &CheckoutRequest,
        urls: &CheckoutUrls,
    ) -> BridgeResult<CheckoutSession> {
        let form_params = Self::build_form_params(request, urls);

        debug!(price_id = %request.price_id, "Creating Stripe checkout session");

        let url = format!("{}/v1/checkout/sessions", self.config.api_base_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.config.auth_header())
            .header("Stripe-Version", &self.config.api_version)
            .form(&form_params)
            .send()
            .await
            .map_err(|e| BridgeError::upstream(PROVIDER, e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BridgeError::upstream(PROVIDER, e.to_string()))?;

        if !status.is_success() {
            error!("Stripe API error: status={}, body={}", status, body);

            // Parse Stripe error
            if let Ok(error_response) = serde_json::from_str::<StripeErrorResponse>(&body) {
                return Err(BridgeError::upstream(
                    PROVIDER,
                    error_response.error.describe(),
                ));
            }

            return Err(BridgeError::upstream(
                PROVIDER,
                format!("HTTP {}: {}", status, body),
            ));
        }

        let session_response: StripeCheckoutSessionResponse = serde_json::from_str(&body)
            .map_err(|e| {
                BridgeError::upstream(PROVIDER, format!("Failed to parse Stripe response: {}", e))
            })?;

        let checkout_url = session_response.url.ok_or_else(|| {
            BridgeError::upstream(
                PROVIDER,
                format!("Checkout session {} has no redirect url", session_response.id),
            )
        })?;

        info!(
            "Created Stripe checkout session: id={}, url={}",
            session_response.id, checkout_url
        );

        let mut session = CheckoutSession::new(session_response.id, PROVIDER, checkout_url);
        if let Some(reference) = session_response.client_reference_id {
            session = session.with_client_reference_id(reference);
        }

        Ok(session)
    }

    #[instrument(skip(self, payload, signature), fields(bytes = payload.len()))]
    async fn verify_webhook(&self, payload: &[u8], signature: &str) -> BridgeResult<WebhookEvent> {
        webhook::construct_event(
            payload,
            signature,
            &self.config.webhook_secret,
            self.config.webhook_tolerance_secs,
            Utc::now().timestamp(),
        )
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

// =============================================================================
// Stripe API Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct StripeCheckoutSessionResponse {
    id: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    client_reference_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeError,
}

#[derive(Debug, Deserialize)]
struct StripeError {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    param: Option<String>,
}

impl StripeError {
    fn describe(&self) -> String {
        let message = self.message.as_deref().unwrap_or("unknown error");
        match (&self.code, &self.param) {
            (Some(code), Some(param)) => format!("{} (code={}, param={})", message, code, param),
            (Some(code), None) => format!("{} (code={})", message, code),
            _ => message.to_string(),
        }
    }
}
