//! # Provider and Platform Traits
//!
//! The two external systems the bridge talks to sit behind traits so the
//! HTTP layer can be driven against fakes.
//!
//! ```text
//!   POST /create-checkout-session        POST /webhook
//!              │                               │
//!              ▼                               ▼
//!   PaymentStrategy::create_checkout   PaymentStrategy::verify_webhook
//!                                              │
//!                                              ▼ (background task)
//!                                    RolePlatform::upgrade_role
//! ```

use crate::checkout::{CheckoutRequest, CheckoutSession, CheckoutUrls};
use crate::error::BridgeResult;
use crate::event::{RoleUpgrade, WebhookEvent};
use async_trait::async_trait;
use std::sync::Arc;

/// A payment provider offering hosted checkout and signed webhooks.
#[async_trait]
pub trait PaymentStrategy: Send + Sync {
    /// Create a subscription checkout session and return the redirect URL.
    ///
    /// # Arguments
    /// * `request` - Validated checkout request
    /// * `urls` - Success and cancel redirect targets
    async fn create_checkout(
        &self,
        request: &CheckoutRequest,
        urls: &CheckoutUrls,
    ) -> BridgeResult<CheckoutSession>;

    /// Verify a webhook signature and parse the event.
    ///
    /// # Arguments
    /// * `payload` - Raw webhook body bytes, exactly as received
    /// * `signature` - Signature header from the request
    async fn verify_webhook(&self, payload: &[u8], signature: &str)
        -> BridgeResult<WebhookEvent>;

    /// Provider name (for logging).
    fn provider_name(&self) -> &'static str;
}

/// An external user-management platform whose roles we update.
#[async_trait]
pub trait RolePlatform: Send + Sync {
    /// Apply a role change for one user.
    async fn upgrade_role(&self, upgrade: &RoleUpgrade) -> BridgeResult<()>;

    /// Platform name (for logging).
    fn platform_name(&self) -> &'static str;
}

/// Type alias for a shared payment strategy (dynamic dispatch)
pub type BoxedPaymentStrategy = Arc<dyn PaymentStrategy>;

/// Type alias for a shared role platform (dynamic dispatch)
pub type BoxedRolePlatform = Arc<dyn RolePlatform>;
