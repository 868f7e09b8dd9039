//! End-to-end endpoint tests over the full router, with in-memory stores.
//!
//! Checkout-session tests use a gateway double; webhook tests use the real
//! Stripe gateway with a known signing secret so the full
//! verify-then-reconcile path is exercised.

use async_trait::async_trait;
use axum_test::TestServer;
use chrono::{Duration, Utc};
use order_api::handlers::{CheckoutRedirectResponse, OrdersResponse, StatusResponse};
use order_api::{create_router, AppConfig, AppState};
use order_core::{
    Address, AddressStore, CatalogProductStore, CheckoutLine, CheckoutSession, CheckoutUrls,
    MemoryAddressStore, MemoryOrderStore, MemoryUserStore, Order, OrderError, OrderItem,
    OrderResult, OrderStore, PaymentGateway, PaymentType, Product, ProductCatalog,
    SessionMetadata, User, UserStore, WebhookEvent,
};
use order_stripe::{compute_signature, StripeConfig, StripeGateway};
use serde_json::{json, Value};
use std::sync::Arc;

const WEBHOOK_SECRET: &str = "whsec_endpoint_tests";

/// Gateway double that hands out canned checkout URLs
struct FakeGateway {
    fail_checkout: bool,
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_checkout(
        &self,
        order: &Order,
        _lines: &[CheckoutLine],
        _urls: &CheckoutUrls,
    ) -> OrderResult<CheckoutSession> {
        if self.fail_checkout {
            return Err(OrderError::CheckoutSessionFailed("provider outage".into()));
        }
        Ok(CheckoutSession {
            session_id: format!("cs_fake_{}", order.id),
            order_id: order.id.clone(),
            checkout_url: format!("https://checkout.test/pay/{}", order.id),
            created_at: Utc::now(),
        })
    }

    async fn verify_webhook(&self, _payload: &[u8], _signature: &str) -> OrderResult<WebhookEvent> {
        Err(OrderError::Internal("not used with the fake gateway".into()))
    }

    async fn session_metadata_for_intent(
        &self,
        _payment_intent_id: &str,
    ) -> OrderResult<Option<SessionMetadata>> {
        Ok(None)
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}

struct TestApp {
    server: TestServer,
    orders: Arc<MemoryOrderStore>,
    users: Arc<MemoryUserStore>,
}

fn test_config() -> AppConfig {
    AppConfig {
        host: "127.0.0.1".into(),
        port: 0,
        base_url: "http://storefront.test".into(),
        environment: "test".into(),
    }
}

fn catalog() -> ProductCatalog {
    let mut catalog = ProductCatalog::new();
    catalog.add(Product::new("prod-100", "Hundred", 100));
    catalog.add(Product::new("prod-50", "Fifty", 50));
    catalog
}

async fn build_app(gateway: Arc<dyn PaymentGateway>) -> TestApp {
    let orders = Arc::new(MemoryOrderStore::new());
    let users = Arc::new(MemoryUserStore::new());
    let addresses = Arc::new(MemoryAddressStore::new());

    users
        .upsert(User::new("user-1").with_cart_item("prod-100", 2))
        .await
        .unwrap();
    addresses
        .upsert(Address::new(
            "addr-1", "12 Elm St", "Springfield", "IL", "62704", "US",
        ))
        .await
        .unwrap();

    let state = AppState::with_components(
        orders.clone(),
        Arc::new(CatalogProductStore::new(catalog())),
        users.clone(),
        addresses,
        gateway,
        test_config(),
    );

    TestApp {
        server: TestServer::new(create_router(state)).unwrap(),
        orders,
        users,
    }
}

async fn app_with_fake_gateway() -> TestApp {
    build_app(Arc::new(FakeGateway {
        fail_checkout: false,
    }))
    .await
}

async fn app_with_stripe_gateway() -> TestApp {
    let config = StripeConfig::new("sk_test_endpoint", WEBHOOK_SECRET);
    build_app(Arc::new(StripeGateway::new(config))).await
}

fn order_body(user_id: &str) -> Value {
    json!({
        "userId": user_id,
        "items": [
            {"product": "prod-100", "quantity": 2},
            {"product": "prod-50", "quantity": 1}
        ],
        "address": "addr-1"
    })
}

fn signed_header(payload: &[u8]) -> String {
    let timestamp = Utc::now().timestamp();
    format!(
        "t={},v1={}",
        timestamp,
        compute_signature(WEBHOOK_SECRET, timestamp, payload)
    )
}

async fn listed_orders(app: &TestApp, user_id: &str) -> Vec<order_core::OrderView> {
    app.server
        .get("/order/user")
        .add_query_param("userId", user_id)
        .await
        .json::<OrdersResponse>()
        .orders
}

// =============================================================================
// Order placement
// =============================================================================

#[tokio::test]
async fn test_cod_order_placed_with_taxed_amount() {
    let app = app_with_fake_gateway().await;

    let response = app.server.post("/order/cod").json(&order_body("user-1")).await;
    response.assert_status_ok();
    let body: StatusResponse = response.json();
    assert!(body.success);
    assert_eq!(body.message, "Order placed successfully");

    let orders = listed_orders(&app, "user-1").await;
    assert_eq!(orders.len(), 1);
    // subtotal 250 + floor(2%) = 255
    assert_eq!(orders[0].amount, 255);
    assert_eq!(orders[0].payment_type, PaymentType::Cod);
    assert!(!orders[0].is_paid);
    assert_eq!(orders[0].address.as_ref().unwrap().city, "Springfield");
}

#[tokio::test]
async fn test_cod_order_with_missing_address_rejected() {
    let app = app_with_fake_gateway().await;

    let response = app
        .server
        .post("/order/cod")
        .json(&json!({
            "userId": "user-1",
            "items": [{"product": "prod-100", "quantity": 1}],
            "address": ""
        }))
        .await;

    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
    let body: StatusResponse = response.json();
    assert!(!body.success);

    assert!(listed_orders(&app, "user-1").await.is_empty());
}

#[tokio::test]
async fn test_unknown_product_aborts_order_without_writes() {
    let app = app_with_fake_gateway().await;

    let response = app
        .server
        .post("/order/cod")
        .json(&json!({
            "userId": "user-1",
            "items": [
                {"product": "prod-100", "quantity": 1},
                {"product": "prod-ghost", "quantity": 1}
            ],
            "address": "addr-1"
        }))
        .await;

    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
    let seller: OrdersResponse = app.server.get("/order/seller").await.json();
    assert!(seller.orders.is_empty());
}

#[tokio::test]
async fn test_online_order_returns_checkout_url_and_stays_hidden() {
    let app = app_with_fake_gateway().await;

    let response = app
        .server
        .post("/order/stripe")
        .json(&order_body("user-1"))
        .await;
    response.assert_status_ok();
    let body: CheckoutRedirectResponse = response.json();
    assert!(body.success);
    assert!(body.url.starts_with("https://checkout.test/pay/"));

    // Pending checkout: persisted, but never exposed in listings
    assert!(listed_orders(&app, "user-1").await.is_empty());
    let seller: OrdersResponse = app.server.get("/order/seller").await.json();
    assert!(seller.orders.is_empty());
}

#[tokio::test]
async fn test_provider_rejection_surfaces_as_failure() {
    let app = build_app(Arc::new(FakeGateway { fail_checkout: true })).await;

    let response = app
        .server
        .post("/order/stripe")
        .json(&order_body("user-1"))
        .await;

    response.assert_status(axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    let body: StatusResponse = response.json();
    assert!(!body.success);
}

// =============================================================================
// Webhook reconciliation
// =============================================================================

#[tokio::test]
async fn test_webhook_completion_marks_order_paid_and_clears_cart() {
    let app = app_with_stripe_gateway().await;

    let order = Order::new_online("user-1", vec![OrderItem::new("prod-100", 2)], "addr-1", 204);
    let order_id = order.id.clone();
    app.orders.create(order).await.unwrap();

    let payload = json!({
        "type": "checkout.session.completed",
        "data": {"object": {"id": "cs_1", "metadata": {"orderId": order_id, "userId": "user-1"}}}
    })
    .to_string();

    let response = app
        .server
        .post("/webhook")
        .add_header("stripe-signature", signed_header(payload.as_bytes()))
        .bytes(payload.clone().into())
        .await;
    response.assert_status_ok();
    response.assert_json(&json!({"received": true}));

    let orders = listed_orders(&app, "user-1").await;
    assert_eq!(orders.len(), 1);
    assert!(orders[0].is_paid);
    assert!(app
        .users
        .get("user-1")
        .await
        .unwrap()
        .unwrap()
        .cart_items
        .is_empty());

    // Redelivery of the same event: acknowledged again, same end state
    let response = app
        .server
        .post("/webhook")
        .add_header("stripe-signature", signed_header(payload.as_bytes()))
        .bytes(payload.into())
        .await;
    response.assert_status_ok();
    assert!(listed_orders(&app, "user-1").await[0].is_paid);
}

#[tokio::test]
async fn test_webhook_invalid_signature_mutates_nothing() {
    let app = app_with_stripe_gateway().await;

    let order = Order::new_online("user-1", vec![OrderItem::new("prod-100", 1)], "addr-1", 102);
    let order_id = order.id.clone();
    app.orders.create(order).await.unwrap();

    let payload = json!({
        "type": "checkout.session.completed",
        "data": {"object": {"metadata": {"orderId": order_id, "userId": "user-1"}}}
    })
    .to_string();

    let timestamp = Utc::now().timestamp();
    let forged = format!(
        "t={},v1={}",
        timestamp,
        compute_signature("whsec_wrong_secret", timestamp, payload.as_bytes())
    );

    let response = app
        .server
        .post("/webhook")
        .add_header("stripe-signature", forged)
        .bytes(payload.into())
        .await;

    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
    assert!(!app
        .orders
        .get(&order_id)
        .await
        .unwrap()
        .unwrap()
        .is_paid());
    assert!(!app
        .users
        .get("user-1")
        .await
        .unwrap()
        .unwrap()
        .cart_items
        .is_empty());
}

#[tokio::test]
async fn test_webhook_missing_signature_header_rejected() {
    let app = app_with_stripe_gateway().await;

    let response = app
        .server
        .post("/webhook")
        .bytes(json!({"type": "checkout.session.completed"}).to_string().into())
        .await;

    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_webhook_ignored_event_acknowledged() {
    let app = app_with_stripe_gateway().await;

    let payload = json!({
        "type": "customer.subscription.created",
        "data": {"object": {"id": "sub_1"}}
    })
    .to_string();

    let response = app
        .server
        .post("/webhook")
        .add_header("stripe-signature", signed_header(payload.as_bytes()))
        .bytes(payload.into())
        .await;

    // The provider must not redeliver events this system does not care about
    response.assert_status_ok();
    response.assert_json(&json!({"received": true}));
}

// =============================================================================
// Listings
// =============================================================================

#[tokio::test]
async fn test_user_listing_scoped_to_requester() {
    let app = app_with_fake_gateway().await;

    app.server
        .post("/order/cod")
        .json(&order_body("user-1"))
        .await
        .assert_status_ok();
    app.server
        .post("/order/cod")
        .json(&order_body("user-2"))
        .await
        .assert_status_ok();

    let orders = listed_orders(&app, "user-1").await;
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].user_id, "user-1");

    let seller: OrdersResponse = app.server.get("/order/seller").await.json();
    assert_eq!(seller.orders.len(), 2);
}

#[tokio::test]
async fn test_seller_listing_sorted_newest_first() {
    let app = app_with_fake_gateway().await;
    let base = Utc::now();

    for (offset, amount) in [(0_i64, 1_i64), (1, 2), (2, 3)] {
        let mut order =
            Order::new_cod("user-1", vec![OrderItem::new("prod-50", 1)], "addr-1", amount);
        order.created_at = base + Duration::seconds(offset);
        app.orders.create(order).await.unwrap();
    }

    let seller: OrdersResponse = app.server.get("/order/seller").await.json();
    let amounts: Vec<i64> = seller.orders.iter().map(|o| o.amount).collect();
    assert_eq!(amounts, vec![3, 2, 1]);
}
