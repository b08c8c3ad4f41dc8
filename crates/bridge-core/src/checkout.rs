//! # Checkout Types
//!
//! Transient request and session types for the checkout flow.
//! Nothing here is persisted: a request lives for one HTTP call and the
//! session is handed straight back to the caller.

use crate::error::{BridgeError, BridgeResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Message returned when a required checkout field is absent
pub const MISSING_FIELDS_MESSAGE: &str = "missing priceId or externalUserId";

/// Placeholder the provider replaces with the real session id on redirect
pub const SESSION_ID_PLACEHOLDER: &str = "{CHECKOUT_SESSION_ID}";

/// A validated request to start a subscription checkout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    /// Provider price identifier (price_...)
    pub price_id: String,

    /// User id on the external platform, threaded through as the
    /// correlation token
    pub external_user_id: String,

    /// Customer email (optional, for prefill)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
}

impl CheckoutRequest {
    /// Validate raw fields into a request.
    ///
    /// Empty strings count as missing. An empty email is dropped.
    pub fn new(
        price_id: Option<String>,
        external_user_id: Option<String>,
        customer_email: Option<String>,
    ) -> BridgeResult<Self> {
        let price_id = non_empty(price_id);
        let external_user_id = non_empty(external_user_id);

        match (price_id, external_user_id) {
            (Some(price_id), Some(external_user_id)) => Ok(Self {
                price_id,
                external_user_id,
                customer_email: non_empty(customer_email),
            }),
            _ => Err(BridgeError::Validation(MISSING_FIELDS_MESSAGE.to_string())),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Redirect targets handed to the provider's hosted checkout page
#[derive(Debug, Clone)]
pub struct CheckoutUrls {
    /// Page the customer lands on after paying
    pub success_base: String,
    /// Page the customer lands on after backing out
    pub cancel_url: String,
}

impl CheckoutUrls {
    pub fn new(success_base: impl Into<String>, cancel_url: impl Into<String>) -> Self {
        Self {
            success_base: success_base.into(),
            cancel_url: cancel_url.into(),
        }
    }

    /// Success URL with the session id placeholder appended
    pub fn success_url(&self) -> String {
        let separator = if self.success_base.contains('?') { '&' } else { '?' };
        format!(
            "{}{}session_id={}",
            self.success_base, separator, SESSION_ID_PLACEHOLDER
        )
    }

    pub fn cancel_url(&self) -> &str {
        &self.cancel_url
    }
}

/// A checkout session created by a payment provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Provider's session ID
    pub session_id: String,

    /// Provider name (e.g., "stripe")
    pub provider: String,

    /// URL to redirect customer to for payment
    pub checkout_url: String,

    /// Correlation token echoed back by the provider
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_reference_id: Option<String>,

    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl CheckoutSession {
    pub fn new(
        session_id: impl Into<String>,
        provider: impl Into<String>,
        checkout_url: impl Into<String>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            provider: provider.into(),
            checkout_url: checkout_url.into(),
            client_reference_id: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_client_reference_id(mut self, id: impl Into<String>) -> Self {
        self.client_reference_id = Some(id.into());
        self
    }
}
