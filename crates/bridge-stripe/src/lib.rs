//! # bridge-stripe
//!
//! Stripe payment strategy for the role bridge.
//!
//! - **StripeCheckoutStrategy** opens subscription-mode Checkout Sessions and
//!   verifies signed webhook deliveries.
//! - **webhook** holds the signature scheme itself, usable without a client.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use bridge_stripe::StripeCheckoutStrategy;
//! use bridge_core::{CheckoutRequest, CheckoutUrls, PaymentStrategy};
//!
//! let strategy = StripeCheckoutStrategy::from_env()?;
//!
//! let session = strategy.create_checkout(&request, &urls).await?;
//! // Redirect user to session.checkout_url
//! ```
//!
//! ## Webhook Handling
//!
//! ```rust,ignore
//! // body: the raw, unparsed request bytes
//! let event = strategy.verify_webhook(&body, signature).await?;
//! if let Some(upgrade) = event.role_upgrade() {
//!     // grant access
//! }
//! ```

pub mod checkout;
pub mod config;
pub mod webhook;

// Re-exports
pub use checkout::StripeCheckoutStrategy;
pub use config::StripeConfig;
pub use webhook::{construct_event, generate_test_header, verify_signature, SIGNATURE_HEADER};
