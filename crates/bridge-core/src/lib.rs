//! # bridge-core
//!
//! Core types and traits for the role bridge: a thin service that opens
//! hosted checkout sessions and, once the provider confirms payment through a
//! signed webhook, upgrades the paying user's role on an external platform.
//!
//! This crate provides:
//! - `CheckoutRequest`, `CheckoutUrls` and `CheckoutSession` for the checkout flow
//! - `WebhookEvent` and `RoleUpgrade` for the webhook flow
//! - `PaymentStrategy` and `RolePlatform` traits for the two external systems
//! - `BridgeError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use bridge_core::{CheckoutRequest, CheckoutUrls, PaymentStrategy};
//!
//! let request = CheckoutRequest::new(Some(price_id), Some(user_id), None)?;
//! let urls = CheckoutUrls::new("https://app.example.com/success", "https://app.example.com/cancel");
//!
//! let session = strategy.create_checkout(&request, &urls).await?;
//! // Redirect user to session.checkout_url
//!
//! // Later, in the webhook endpoint:
//! let event = strategy.verify_webhook(&body, signature).await?;
//! if let Some(upgrade) = event.role_upgrade() {
//!     platform.upgrade_role(&upgrade).await?;
//! }
//! ```

pub mod checkout;
pub mod error;
pub mod event;
pub mod strategy;

// Re-exports for convenience
pub use checkout::{CheckoutRequest, CheckoutSession, CheckoutUrls, MISSING_FIELDS_MESSAGE};
pub use error::{BridgeError, BridgeResult};
pub use event::{
    Role, RoleUpdatePayload, RoleUpgrade, WebhookEvent, WebhookEventType,
    CHECKOUT_SESSION_COMPLETED,
};
pub use strategy::{BoxedPaymentStrategy, BoxedRolePlatform, PaymentStrategy, RolePlatform};
