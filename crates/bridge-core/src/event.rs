//! # Webhook Event Types
//!
//! Verified provider events and the role upgrade they may trigger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Provider event type signalling a paid checkout
pub const CHECKOUT_SESSION_COMPLETED: &str = "checkout.session.completed";

/// Webhook event types we act on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookEventType {
    /// Checkout session completed (customer paid)
    CheckoutSessionCompleted,
    /// Anything else, kept verbatim for logging
    Other(String),
}

impl WebhookEventType {
    pub fn from_provider(event_type: &str) -> Self {
        match event_type {
            CHECKOUT_SESSION_COMPLETED => WebhookEventType::CheckoutSessionCompleted,
            other => WebhookEventType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            WebhookEventType::CheckoutSessionCompleted => CHECKOUT_SESSION_COMPLETED,
            WebhookEventType::Other(other) => other,
        }
    }
}

/// A verified webhook event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
    /// Event ID from provider
    pub event_id: String,

    /// Event type
    pub event_type: WebhookEventType,

    /// Provider name
    pub provider: String,

    /// The event's `data.object`
    pub object: serde_json::Map<String, serde_json::Value>,

    /// When the provider created the event
    pub created: DateTime<Utc>,
}

impl WebhookEvent {
    /// Correlation token set at session creation, if present and non-empty
    pub fn client_reference_id(&self) -> Option<&str> {
        self.object
            .get("client_reference_id")
            .and_then(|v| v.as_str())
            .filter(|id| !id.is_empty())
    }

    /// The role upgrade this event calls for.
    ///
    /// Only a completed checkout carrying a correlation token yields one.
    pub fn role_upgrade(&self) -> Option<RoleUpgrade> {
        match self.event_type {
            WebhookEventType::CheckoutSessionCompleted => {
                self.client_reference_id().map(RoleUpgrade::premium)
            }
            WebhookEventType::Other(_) => None,
        }
    }
}

/// Roles granted on the user platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Premium,
}

/// Request to change a user's role on the external platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleUpgrade {
    pub external_user_id: String,
    pub role: Role,
}

impl RoleUpgrade {
    pub fn premium(external_user_id: impl Into<String>) -> Self {
        Self {
            external_user_id: external_user_id.into(),
            role: Role::Premium,
        }
    }

    /// JSON body for the role-update endpoint
    pub fn payload(&self) -> RoleUpdatePayload {
        RoleUpdatePayload { role: self.role }
    }
}

/// Wire body of a role-update call: `{"role":"premium"}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleUpdatePayload {
    pub role: Role,
}
