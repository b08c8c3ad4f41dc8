//! # Request Handlers
//!
//! Axum request handlers for checkout creation and the Stripe webhook.

use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, State},
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bridge_core::{BridgeError, CheckoutRequest, RoleUpgrade, WebhookEventType};
use bridge_stripe::SIGNATURE_HEADER;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, info_span, instrument, warn, Instrument};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Create checkout request
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutRequest {
    /// Provider price id
    #[serde(default)]
    pub price_id: Option<String>,
    /// User id on the external platform (`base44UserId` from older clients)
    #[serde(default, alias = "base44UserId")]
    pub external_user_id: Option<String>,
    /// Customer email (optional)
    #[serde(default)]
    pub customer_email: Option<String>,
}

/// Create checkout response
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateCheckoutResponse {
    /// Checkout URL (redirect user here)
    pub url: String,
}

/// Webhook acknowledgment
#[derive(Debug, Serialize, Deserialize)]
pub struct WebhookAck {
    pub received: bool,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Validation errors keep their message; anything else is opaque to the caller
fn checkout_error_response(err: BridgeError) -> (StatusCode, Json<ErrorResponse>) {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = match err {
        BridgeError::Validation(message) => ErrorResponse::new(message),
        _ => ErrorResponse::new("internal_error"),
    };
    (status, Json(body))
}

fn is_json_content_type(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json"
        || (essence.starts_with("application/") && essence.ends_with("+json"))
}

/// Decode the checkout body.
///
/// A missing body, or one not declared as JSON, reads as an empty request so
/// it fails field validation. Only a declared JSON body that does not parse
/// is rejected by the extractor.
fn parse_checkout_body(
    headers: &HeaderMap,
    body: &Bytes,
) -> Result<CreateCheckoutRequest, JsonRejection> {
    if !is_json_content_type(headers) || body.iter().all(u8::is_ascii_whitespace) {
        return Ok(CreateCheckoutRequest::default());
    }
    Json::<CreateCheckoutRequest>::from_bytes(body).map(|Json(request)| request)
}

fn webhook_error_response(err: BridgeError) -> (StatusCode, String) {
    warn!(error = %err, "Webhook signature error");
    (StatusCode::BAD_REQUEST, format!("Webhook error: {}", err))
}

// =============================================================================
// Handlers
// =============================================================================

/// Liveness text at `/`
pub async fn index() -> &'static str {
    "Role bridge backend is running"
}

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "role-bridge",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Create a subscription checkout session
#[instrument(skip(state, headers, body))]
pub async fn create_checkout_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<CreateCheckoutResponse>, Response> {
    let request = parse_checkout_body(&headers, &body).map_err(|rejection| {
        warn!(error = %rejection.body_text(), "Malformed checkout body");
        rejection.into_response()
    })?;

    let request = CheckoutRequest::new(
        request.price_id,
        request.external_user_id,
        request.customer_email,
    )
    .map_err(|e| {
        warn!(error = %e, "Rejected checkout request");
        checkout_error_response(e).into_response()
    })?;

    let session = state
        .payments
        .create_checkout(&request, &state.config.checkout_urls)
        .await
        .map_err(|e| {
            error!(
                external_user_id = %request.external_user_id,
                price_id = %request.price_id,
                error = %e,
                "Error creating checkout session"
            );
            checkout_error_response(e).into_response()
        })?;

    info!(
        session_id = %session.session_id,
        external_user_id = %request.external_user_id,
        "Created checkout session"
    );

    Ok(Json(CreateCheckoutResponse {
        url: session.checkout_url,
    }))
}

/// Handle Stripe webhook
///
/// The body is taken as raw bytes: the signature covers the exact payload.
#[instrument(skip(state, headers, body), fields(bytes = body.len()))]
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>, (StatusCode, String)> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| {
            webhook_error_response(BridgeError::Signature(format!(
                "No {} header value was provided",
                SIGNATURE_HEADER
            )))
        })?;

    let event = state
        .payments
        .verify_webhook(&body, signature)
        .await
        .map_err(webhook_error_response)?;

    info!(
        event_id = %event.event_id,
        event_type = %event.event_type.as_str(),
        "Received webhook"
    );

    match event.role_upgrade() {
        Some(upgrade) => spawn_role_upgrade(&state, upgrade, event.event_id.clone()),
        None if event.event_type == WebhookEventType::CheckoutSessionCompleted => {
            warn!(
                event_id = %event.event_id,
                "Completed checkout carries no client_reference_id; skipping role upgrade"
            );
        }
        None => debug!(event_type = %event.event_type.as_str(), "No action for event"),
    }

    Ok(Json(WebhookAck { received: true }))
}

/// Fire-and-forget role upgrade, tracked so shutdown can drain it
fn spawn_role_upgrade(state: &AppState, upgrade: RoleUpgrade, event_id: String) {
    let platform = state.platform.clone();
    let span = info_span!(
        "role_upgrade",
        event_id = %event_id,
        external_user_id = %upgrade.external_user_id,
        platform = platform.platform_name()
    );

    state.tasks.spawn(
        async move {
            match platform.upgrade_role(&upgrade).await {
                Ok(()) => info!("Role upgrade delivered"),
                Err(e) => error!(error = %e, "Role upgrade failed"),
            }
        }
        .instrument(span),
    );
}
