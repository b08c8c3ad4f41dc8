//! # Stripe Webhook Verification
//!
//! Stripe signs every webhook delivery with the endpoint's signing secret.
//! The `Stripe-Signature` header looks like:
//!
//! ```text
//! t=1492774577,v1=5257a869e7ecebeda32affa62cdca3fa51cad7e77a0e56ff536d0ce8e108d8bd,v0=...
//! ```
//!
//! The expected `v1` value is `hex(HMAC-SHA256(secret, "{t}.{raw body}"))`.
//! The MAC is taken over the body bytes exactly as they arrived, so callers
//! must hand over the unparsed request body.

use bridge_core::{BridgeError, BridgeResult, WebhookEvent, WebhookEventType};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use tracing::debug;

type HmacSha256 = Hmac<Sha256>;

/// Name of the header carrying the signature
pub const SIGNATURE_HEADER: &str = "stripe-signature";

/// Maximum age of a signed delivery, in seconds
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

/// Parsed `Stripe-Signature` header
#[derive(Debug)]
pub struct SignatureHeader {
    pub timestamp: i64,
    /// The `t` value exactly as sent; the MAC is computed over this text
    pub signed_timestamp: String,
    /// Decoded `v1` signatures. Entries that are not valid hex are dropped.
    pub signatures: Vec<Vec<u8>>,
}

/// Parse a `Stripe-Signature` header value.
pub fn parse_signature_header(header: &str) -> BridgeResult<SignatureHeader> {
    let mut timestamp: Option<(i64, &str)> = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            continue;
        };
        match key {
            "t" => timestamp = value.parse().ok().map(|t| (t, value)),
            "v1" => {
                if let Ok(sig) = hex::decode(value) {
                    signatures.push(sig);
                }
            }
            _ => {}
        }
    }

    let (timestamp, signed_timestamp) = timestamp.ok_or_else(|| {
        BridgeError::Signature("Missing timestamp in signature header".to_string())
    })?;

    if signatures.is_empty() {
        return Err(BridgeError::Signature(
            "No v1 signature found in signature header".to_string(),
        ));
    }

    Ok(SignatureHeader {
        timestamp,
        signed_timestamp: signed_timestamp.to_string(),
        signatures,
    })
}

fn signer(secret: &str, timestamp: &str, payload: &[u8]) -> BridgeResult<HmacSha256> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(secret.as_bytes())
        .map_err(|e| BridgeError::Configuration(format!("Invalid webhook secret: {}", e)))?;
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac)
}

/// Hex-encoded `v1` signature for `payload` signed at `timestamp`.
pub fn compute_signature(secret: &str, timestamp: i64, payload: &[u8]) -> BridgeResult<String> {
    let mac = signer(secret, &timestamp.to_string(), payload)?;
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Verify `payload` against a `Stripe-Signature` header.
///
/// `now` is the current unix time; deliveries signed more than
/// `tolerance_secs` ago are rejected even when the MAC matches.
pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    tolerance_secs: i64,
    now: i64,
) -> BridgeResult<()> {
    let parsed = parse_signature_header(header)?;
    let mac = signer(secret, &parsed.signed_timestamp, payload)?;

    // verify_slice compares in constant time
    let matched = parsed
        .signatures
        .iter()
        .any(|sig| mac.clone().verify_slice(sig).is_ok());

    if !matched {
        return Err(BridgeError::Signature(
            "No signatures found matching the expected signature for payload. \
             Are you passing the raw request body you received from Stripe?"
                .to_string(),
        ));
    }

    if now.saturating_sub(parsed.timestamp) > tolerance_secs {
        return Err(BridgeError::Signature(
            "Timestamp outside the tolerance zone".to_string(),
        ));
    }

    Ok(())
}

/// Verify a delivery and parse it into a [`WebhookEvent`].
pub fn construct_event(
    payload: &[u8],
    header: &str,
    secret: &str,
    tolerance_secs: i64,
    now: i64,
) -> BridgeResult<WebhookEvent> {
    verify_signature(payload, header, secret, tolerance_secs, now)?;

    let event: StripeWebhookEvent = serde_json::from_slice(payload)
        .map_err(|e| BridgeError::Signature(format!("Invalid webhook payload: {}", e)))?;

    debug!(event_id = %event.id, event_type = %event.event_type, "Verified Stripe webhook");

    Ok(WebhookEvent {
        event_type: WebhookEventType::from_provider(&event.event_type),
        event_id: event.id,
        provider: "stripe".to_string(),
        object: event.data.object,
        created: DateTime::from_timestamp(event.created, 0).unwrap_or_else(Utc::now),
    })
}

/// Build a valid `Stripe-Signature` header for `payload`.
///
/// Used by tests and local tooling to produce deliveries the verifier accepts.
pub fn generate_test_header(
    payload: &[u8],
    secret: &str,
    timestamp: i64,
) -> BridgeResult<String> {
    let signature = compute_signature(secret, timestamp, payload)?;
    Ok(format!("t={},v1={}", timestamp, signature))
}

// =============================================================================
// Stripe Event Envelope
// =============================================================================

#[derive(Debug, Deserialize)]
struct StripeWebhookEvent {
    #[serde(default)]
    id: String,
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    created: i64,
    data: StripeEventData,
}

#[derive(Debug, Deserialize)]
struct StripeEventData {
    object: serde_json::Map<String, serde_json::Value>,
}
