//! Integration tests for the Stripe HTTP surface, against a mock server.

use order_core::{
    CheckoutUrls, Order, OrderError, OrderItem, PaymentGateway, PricedOrder,
};
use order_stripe::{StripeConfig, StripeGateway};
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gateway_for(server: &MockServer) -> StripeGateway {
    let config =
        StripeConfig::new("sk_test_abc123", "whsec_test").with_api_base_url(server.uri());
    StripeGateway::new(config)
}

fn sample_order() -> (Order, PricedOrder) {
    let order = Order::new_online(
        "user-1",
        vec![OrderItem::new("prod-100", 2), OrderItem::new("prod-50", 1)],
        "addr-1",
        255,
    );
    let priced = PricedOrder {
        amount: 255,
        lines: vec![
            order_core::CheckoutLine {
                product_id: "prod-100".into(),
                name: "Hundred".into(),
                unit_price: 100,
                quantity: 2,
            },
            order_core::CheckoutLine {
                product_id: "prod-50".into(),
                name: "Fifty".into(),
                unit_price: 50,
                quantity: 1,
            },
        ],
    };
    (order, priced)
}

#[tokio::test]
async fn test_create_checkout_returns_redirect_url() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/checkout/sessions"))
        .and(header("Authorization", "Bearer sk_test_abc123"))
        // Unit prices go out in the provider's minor units
        .and(body_string_contains("unit_amount%5D=10000"))
        // The 5-unit tax surcharge rides as its own line so the session
        // totals the stored amount (255)
        .and(body_string_contains("unit_amount%5D=500&"))
        .and(body_string_contains("name%5D=Tax"))
        .and(body_string_contains("metadata%5BorderId%5D"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "cs_test_123",
            "url": "https://checkout.stripe.com/pay/cs_test_123"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = gateway_for(&server);
    let (order, priced) = sample_order();
    let urls = CheckoutUrls::from_origin("https://shop.example.com");

    let session = gateway
        .create_checkout(&order, &priced.lines, &urls)
        .await
        .unwrap();

    assert_eq!(session.session_id, "cs_test_123");
    assert_eq!(session.order_id, order.id);
    assert_eq!(
        session.checkout_url,
        "https://checkout.stripe.com/pay/cs_test_123"
    );
}

#[tokio::test]
async fn test_create_checkout_surfaces_provider_rejection() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/checkout/sessions"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"message": "Invalid line item"}
        })))
        .mount(&server)
        .await;

    let gateway = gateway_for(&server);
    let (order, priced) = sample_order();
    let urls = CheckoutUrls::from_origin("https://shop.example.com");

    let err = gateway
        .create_checkout(&order, &priced.lines, &urls)
        .await
        .unwrap_err();

    match err {
        OrderError::CheckoutSessionFailed(message) => {
            assert_eq!(message, "Invalid line item");
        }
        other => panic!("expected CheckoutSessionFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_create_checkout_rejects_empty_lines() {
    let server = MockServer::start().await;
    let gateway = gateway_for(&server);
    let (order, _) = sample_order();
    let urls = CheckoutUrls::from_origin("https://shop.example.com");

    let err = gateway.create_checkout(&order, &[], &urls).await.unwrap_err();
    assert!(matches!(err, OrderError::InvalidRequest(_)));
}

#[tokio::test]
async fn test_session_lookup_by_payment_intent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/checkout/sessions"))
        .and(query_param("payment_intent", "pi_123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "data": [
                {"id": "cs_1", "metadata": {"orderId": "ord-42", "userId": "user-7"}}
            ]
        })))
        .mount(&server)
        .await;

    let gateway = gateway_for(&server);
    let metadata = gateway
        .session_metadata_for_intent("pi_123")
        .await
        .unwrap()
        .expect("session should resolve");

    assert_eq!(metadata.order_id.as_deref(), Some("ord-42"));
    assert_eq!(metadata.user_id.as_deref(), Some("user-7"));
}

#[tokio::test]
async fn test_session_lookup_with_no_sessions_is_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/checkout/sessions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "data": []
        })))
        .mount(&server)
        .await;

    let gateway = gateway_for(&server);
    let metadata = gateway.session_metadata_for_intent("pi_none").await.unwrap();

    assert!(metadata.is_none());
}

#[tokio::test]
async fn test_session_lookup_provider_error_is_retryable() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/checkout/sessions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("stripe is down"))
        .mount(&server)
        .await;

    let gateway = gateway_for(&server);
    let err = gateway
        .session_metadata_for_intent("pi_123")
        .await
        .unwrap_err();

    assert!(err.is_retryable());
}
