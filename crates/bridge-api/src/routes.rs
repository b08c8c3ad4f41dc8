//! # Routes
//!
//! Axum router configuration for the bridge.

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - GET  /                          - Liveness text
/// - GET  /health                    - Health check (JSON)
/// - POST /create-checkout-session   - Create Stripe checkout session
/// - POST /webhook                   - Stripe webhook handler (raw body)
pub fn create_router(state: AppState) -> Router {
    // The checkout endpoint is called from the browser frontend
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let checkout_routes = Router::new()
        .route(
            "/create-checkout-session",
            post(handlers::create_checkout_session),
        )
        .layer(cors);

    // Webhook route: no CORS, body stays untouched bytes
    let webhook_routes = Router::new().route("/webhook", post(handlers::stripe_webhook));

    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .merge(checkout_routes)
        .merge(webhook_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::{CreateCheckoutResponse, ErrorResponse, WebhookAck};
    use crate::state::AppConfig;
    use axum::body::Bytes;
    use axum::http::{HeaderName, HeaderValue, StatusCode};
    use axum_test::{TestResponse, TestServer};
    use bridge_platform::{PlatformClient, PlatformConfig};
    use bridge_stripe::{generate_test_header, StripeCheckoutStrategy, StripeConfig};
    use serde_json::json;
    use std::sync::Arc;
    use wiremock::matchers::{body_json, body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const WEBHOOK_SECRET: &str = "whsec_test_secret";

    struct Harness {
        server: TestServer,
        state: AppState,
        stripe: MockServer,
        platform: MockServer,
    }

    impl Harness {
        async fn new() -> Self {
            let stripe = MockServer::start().await;
            let platform = MockServer::start().await;

            let config = AppConfig::from_lookup(|key| match key {
                "FRONTEND_SUCCESS_URL" => Some("https://app.example.com/success".to_string()),
                "FRONTEND_CANCEL_URL" => Some("https://app.example.com/cancel".to_string()),
                _ => None,
            })
            .unwrap();

            let payments = StripeCheckoutStrategy::new(
                StripeConfig::new("sk_test_abc123", WEBHOOK_SECRET).with_api_base_url(stripe.uri()),
            )
            .unwrap();
            let role_platform =
                PlatformClient::new(PlatformConfig::new(&platform.uri(), "key_123").unwrap())
                    .unwrap();

            let state = AppState::new(config, Arc::new(payments), Arc::new(role_platform));
            let server = TestServer::new(create_router(state.clone())).unwrap();

            Self {
                server,
                state,
                stripe,
                platform,
            }
        }

        async fn post_webhook(
            &self,
            payload: &'static [u8],
            signature: Option<String>,
        ) -> TestResponse {
            let mut request = self
                .server
                .post("/webhook")
                .content_type("application/json")
                .bytes(Bytes::from_static(payload));
            if let Some(signature) = signature {
                request = request.add_header(
                    HeaderName::from_static("stripe-signature"),
                    HeaderValue::from_str(&signature).unwrap(),
                );
            }
            request.await
        }

        /// Wait for every background role upgrade to finish
        async fn drain(&self) {
            self.state.tasks.close();
            self.state.tasks.wait().await;
        }
    }

    fn sign(payload: &[u8]) -> String {
        generate_test_header(payload, WEBHOOK_SECRET, chrono::Utc::now().timestamp()).unwrap()
    }

    const COMPLETED_EVENT: &[u8] = br#"{
  "id": "evt_completed",
  "object": "event",
  "type": "checkout.session.completed",
  "created": 1700000000,
  "data": {
    "object": {
      "id": "cs_test_1",
      "object": "checkout.session",
      "client_reference_id": "user_123",
      "mode": "subscription",
      "payment_status": "paid"
    }
  }
}"#;

    const OTHER_EVENT: &[u8] = br#"{
  "id": "evt_other",
  "object": "event",
  "type": "customer.subscription.updated",
  "created": 1700000000,
  "data": { "object": { "id": "sub_1", "client_reference_id": "user_123" } }
}"#;

    const COMPLETED_WITHOUT_REFERENCE: &[u8] = br#"{
  "id": "evt_anon",
  "type": "checkout.session.completed",
  "created": 1700000000,
  "data": { "object": { "id": "cs_test_2", "client_reference_id": null } }
}"#;

    async fn expect_no_role_calls(platform: &MockServer) {
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(platform)
            .await;
    }

    #[tokio::test]
    async fn test_index() {
        let harness = Harness::new().await;
        let response = harness.server.get("/").await;

        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(response.text(), "Role bridge backend is running");
    }

    #[tokio::test]
    async fn test_health() {
        let harness = Harness::new().await;
        let body: serde_json::Value = harness.server.get("/health").await.json();
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_checkout_forwards_user_id() {
        let harness = Harness::new().await;

        Mock::given(method("POST"))
            .and(path("/v1/checkout/sessions"))
            .and(body_string_contains("client_reference_id=user_123"))
            .and(body_string_contains("customer_email=a%40example.com"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "cs_test_1",
                "url": "https://checkout.stripe.com/c/pay/cs_test_1",
                "client_reference_id": "user_123"
            })))
            .expect(1)
            .mount(&harness.stripe)
            .await;

        let response = harness
            .server
            .post("/create-checkout-session")
            .json(&json!({
                "priceId": "price_123",
                "externalUserId": "user_123",
                "customerEmail": "a@example.com"
            }))
            .await;

        assert_eq!(response.status_code(), StatusCode::OK);
        let body: CreateCheckoutResponse = response.json();
        assert_eq!(body.url, "https://checkout.stripe.com/c/pay/cs_test_1");

        harness.stripe.verify().await;
    }

    #[tokio::test]
    async fn test_checkout_missing_fields_never_calls_stripe() {
        let harness = Harness::new().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&harness.stripe)
            .await;

        let bodies = [
            json!({ "externalUserId": "user_123" }),
            json!({ "priceId": "price_123" }),
            json!({ "priceId": "", "externalUserId": "user_123" }),
            json!({}),
        ];

        for body in bodies {
            let response = harness
                .server
                .post("/create-checkout-session")
                .json(&body)
                .await;

            assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
            let error: ErrorResponse = response.json();
            assert_eq!(error.error, "missing priceId or externalUserId");
        }

        harness.stripe.verify().await;
    }

    #[tokio::test]
    async fn test_checkout_without_body_is_validation_error() {
        let harness = Harness::new().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&harness.stripe)
            .await;

        let bare = harness.server.post("/create-checkout-session").await;
        let declared_empty = harness
            .server
            .post("/create-checkout-session")
            .content_type("application/json")
            .await;

        for response in [bare, declared_empty] {
            assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
            let error: ErrorResponse = response.json();
            assert_eq!(error.error, "missing priceId or externalUserId");
        }

        harness.stripe.verify().await;
    }

    #[tokio::test]
    async fn test_checkout_malformed_json_rejected_by_extractor() {
        let harness = Harness::new().await;

        let response = harness
            .server
            .post("/create-checkout-session")
            .content_type("application/json")
            .bytes(Bytes::from_static(b"{\"priceId\":"))
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert!(response.text().starts_with("Failed to parse the request body as JSON"));
    }

    #[tokio::test]
    async fn test_checkout_provider_failure_is_internal_error() {
        let harness = Harness::new().await;

        Mock::given(method("POST"))
            .and(path("/v1/checkout/sessions"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": { "message": "No such price: 'price_bad'" }
            })))
            .mount(&harness.stripe)
            .await;

        let response = harness
            .server
            .post("/create-checkout-session")
            .json(&json!({ "priceId": "price_bad", "externalUserId": "user_123" }))
            .await;

        assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        let error: ErrorResponse = response.json();
        assert_eq!(error.error, "internal_error");
    }

    #[tokio::test]
    async fn test_completed_checkout_upgrades_role_once() {
        let harness = Harness::new().await;

        Mock::given(method("POST"))
            .and(path("/users/user_123/role"))
            .and(header("authorization", "Bearer key_123"))
            .and(body_json(json!({ "role": "premium" })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&harness.platform)
            .await;

        let response = harness
            .post_webhook(COMPLETED_EVENT, Some(sign(COMPLETED_EVENT)))
            .await;

        assert_eq!(response.status_code(), StatusCode::OK);
        let ack: WebhookAck = response.json();
        assert!(ack.received);

        harness.drain().await;
        harness.platform.verify().await;
    }

    #[tokio::test]
    async fn test_platform_failure_still_acknowledged() {
        let harness = Harness::new().await;

        Mock::given(method("POST"))
            .and(path("/users/user_123/role"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&harness.platform)
            .await;

        let response = harness
            .post_webhook(COMPLETED_EVENT, Some(sign(COMPLETED_EVENT)))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(response.json::<serde_json::Value>(), json!({ "received": true }));

        harness.drain().await;
        harness.platform.verify().await;
    }

    #[tokio::test]
    async fn test_other_event_makes_no_calls() {
        let harness = Harness::new().await;
        expect_no_role_calls(&harness.platform).await;

        let response = harness
            .post_webhook(OTHER_EVENT, Some(sign(OTHER_EVENT)))
            .await;

        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(response.json::<serde_json::Value>(), json!({ "received": true }));

        harness.drain().await;
        harness.platform.verify().await;
    }

    #[tokio::test]
    async fn test_completed_without_reference_makes_no_calls() {
        let harness = Harness::new().await;
        expect_no_role_calls(&harness.platform).await;

        let response = harness
            .post_webhook(
                COMPLETED_WITHOUT_REFERENCE,
                Some(sign(COMPLETED_WITHOUT_REFERENCE)),
            )
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);

        harness.drain().await;
        harness.platform.verify().await;
    }

    #[tokio::test]
    async fn test_missing_signature_rejected() {
        let harness = Harness::new().await;
        expect_no_role_calls(&harness.platform).await;

        let response = harness.post_webhook(COMPLETED_EVENT, None).await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert!(response.text().starts_with("Webhook error: "));

        harness.drain().await;
        harness.platform.verify().await;
    }

    #[tokio::test]
    async fn test_invalid_signature_rejected() {
        let harness = Harness::new().await;
        expect_no_role_calls(&harness.platform).await;

        let forged = generate_test_header(
            COMPLETED_EVENT,
            "whsec_attacker",
            chrono::Utc::now().timestamp(),
        )
        .unwrap();
        let garbage = "t=notanumber,v1=zz".to_string();

        for signature in [forged, garbage] {
            let response = harness
                .post_webhook(COMPLETED_EVENT, Some(signature))
                .await;

            assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
            assert!(response.text().starts_with("Webhook error: "));
        }

        harness.drain().await;
        harness.platform.verify().await;
    }

    #[tokio::test]
    async fn test_signature_over_reserialized_body_rejected() {
        let harness = Harness::new().await;
        expect_no_role_calls(&harness.platform).await;

        // Sign the compact re-serialization, deliver the original bytes
        let parsed: serde_json::Value = serde_json::from_slice(COMPLETED_EVENT).unwrap();
        let reserialized = serde_json::to_vec(&parsed).unwrap();
        let signature = sign(&reserialized);

        let response = harness
            .post_webhook(COMPLETED_EVENT, Some(signature))
            .await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

        harness.drain().await;
        harness.platform.verify().await;
    }
}
