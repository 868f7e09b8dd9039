//! # Request Handlers
//!
//! Axum request handlers for order placement, webhook reconciliation, and
//! order listings. Handlers catch every error at this boundary and translate
//! it into the storefront's `{success, ...}` response shapes; the webhook
//! endpoint answers the provider with plain text plus a status code instead.

use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use order_core::{price_items, CheckoutUrls, Order, OrderError, OrderItem, ReconcileOutcome};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info, instrument, warn};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Order placement request (COD and online share the same shape)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    /// The purchasing user
    pub user_id: String,
    /// Items to order
    #[serde(default)]
    pub items: Vec<OrderItem>,
    /// Reference to a stored shipping address
    #[serde(default)]
    pub address: String,
}

/// Buyer-scoped listing parameters
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOrdersParams {
    pub user_id: String,
}

/// `{success, message}` response shape
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub success: bool,
    pub message: String,
}

impl StatusResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

fn error_response(err: OrderError) -> (StatusCode, Json<StatusResponse>) {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(StatusResponse::failure(err.to_string())))
}

fn validate_order_request(request: &PlaceOrderRequest) -> Result<(), OrderError> {
    if request.address.is_empty() || request.items.is_empty() {
        return Err(OrderError::InvalidRequest("Invalid order data".to_string()));
    }
    Ok(())
}

/// Checkout redirects come from the storefront's Origin header, falling
/// back to the configured base URL.
fn checkout_urls(state: &AppState, headers: &HeaderMap) -> CheckoutUrls {
    let origin = headers
        .get("origin")
        .and_then(|v| v.to_str().ok())
        .unwrap_or(state.config.base_url.as_str());
    CheckoutUrls::from_origin(origin)
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "storefront-orders",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Place a cash-on-delivery order
#[instrument(skip(state, request), fields(user_id = %request.user_id, items = request.items.len()))]
pub async fn place_order_cod(
    State(state): State<AppState>,
    Json(request): Json<PlaceOrderRequest>,
) -> Result<Json<StatusResponse>, (StatusCode, Json<StatusResponse>)> {
    validate_order_request(&request).map_err(error_response)?;

    // Amount is re-derived from current catalog prices; nothing is written
    // until every product resolves
    let priced = price_items(state.products.as_ref(), &request.items)
        .await
        .map_err(error_response)?;

    let order = Order::new_cod(&request.user_id, request.items, &request.address, priced.amount);
    let order_id = order.id.clone();

    state.orders.create(order).await.map_err(error_response)?;

    info!(order_id = %order_id, amount = priced.amount, "COD order placed");

    Ok(Json(StatusResponse::ok("Order placed successfully")))
}

/// Online checkout response: `{success, url}`
#[derive(Debug, Serialize, Deserialize)]
pub struct CheckoutRedirectResponse {
    pub success: bool,
    pub url: String,
}

/// Place an online order and open a hosted checkout session
#[instrument(skip(state, headers, request), fields(user_id = %request.user_id, items = request.items.len()))]
pub async fn place_order_online(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<PlaceOrderRequest>,
) -> Result<Json<CheckoutRedirectResponse>, (StatusCode, Json<StatusResponse>)> {
    validate_order_request(&request).map_err(error_response)?;

    let priced = price_items(state.products.as_ref(), &request.items)
        .await
        .map_err(error_response)?;

    // The order row must exist before a session referencing its id is
    // created, so the reconciler has something to update; it stays
    // PendingPayment (hidden from listings) until the provider confirms
    let order = Order::new_online(
        &request.user_id,
        request.items,
        &request.address,
        priced.amount,
    );
    state
        .orders
        .create(order.clone())
        .await
        .map_err(error_response)?;

    let urls = checkout_urls(&state, &headers);

    let session = state
        .gateway
        .create_checkout(&order, &priced.lines, &urls)
        .await
        .map_err(|e| {
            error!(order_id = %order.id, "failed to create checkout session: {}", e);
            error_response(e)
        })?;

    info!(
        order_id = %order.id,
        session_id = %session.session_id,
        amount = priced.amount,
        "online order placed, checkout session created"
    );

    Ok(Json(CheckoutRedirectResponse {
        success: true,
        url: session.checkout_url,
    }))
}

/// Handle the payment provider's webhook callback.
///
/// Plain-text error bodies; 400 tells the provider the payload is invalid
/// and must not be redelivered, 500 tells it to retry later. The handler is
/// safe to re-run with the same event.
#[instrument(skip(state, headers, body))]
pub async fn payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(signature) = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
    else {
        return (StatusCode::BAD_REQUEST, "Missing Stripe-Signature header").into_response();
    };

    // Verification runs over the exact raw bytes received
    let event = match state.gateway.verify_webhook(&body, signature).await {
        Ok(event) => event,
        Err(e) => {
            warn!("webhook rejected: {}", e);
            return (
                StatusCode::BAD_REQUEST,
                format!("Webhook Error: {}", e),
            )
                .into_response();
        }
    };

    match state.reconciler.apply(event).await {
        Ok(outcome) => {
            match &outcome {
                ReconcileOutcome::OrderPaid { order_id } => {
                    info!(order_id = %order_id, "webhook reconciled: paid")
                }
                ReconcileOutcome::OrderRemoved { order_id } => {
                    info!(order_id = %order_id, "webhook reconciled: removed")
                }
                ReconcileOutcome::NoOp => {}
            }
            Json(json!({ "received": true })).into_response()
        }
        Err(e) => {
            error!("webhook processing failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Webhook processing failed.",
            )
                .into_response()
        }
    }
}

/// Orders listing response: `{success, orders}`
#[derive(Debug, Serialize, Deserialize)]
pub struct OrdersResponse {
    pub success: bool,
    pub orders: Vec<order_core::OrderView>,
}

/// Settled orders for the requesting buyer
#[instrument(skip(state))]
pub async fn user_orders(
    State(state): State<AppState>,
    Query(params): Query<UserOrdersParams>,
) -> Result<Json<OrdersResponse>, (StatusCode, Json<StatusResponse>)> {
    let orders = state
        .queries
        .orders_for_user(&params.user_id)
        .await
        .map_err(error_response)?;

    Ok(Json(OrdersResponse {
        success: true,
        orders,
    }))
}

/// All settled orders (seller/admin view)
#[instrument(skip(state))]
pub async fn seller_orders(
    State(state): State<AppState>,
) -> Result<Json<OrdersResponse>, (StatusCode, Json<StatusResponse>)> {
    let orders = state.queries.all_orders().await.map_err(error_response)?;

    Ok(Json(OrdersResponse {
        success: true,
        orders,
    }))
}
