//! # Routes
//!
//! Axum router configuration for the order API.

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
/// - Orders:
///   - POST /order/cod - Place a cash-on-delivery order
///   - POST /order/stripe - Place an online order, returns checkout URL
///   - GET  /order/user?userId= - Buyer's settled orders
///   - GET  /order/seller - All settled orders (seller/admin)
///
/// - Webhooks (raw body, no CORS):
///   - POST /webhook - Payment provider callback
pub fn create_router(state: AppState) -> Router {
    // CORS for the storefront frontend
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let order_routes = Router::new()
        .route("/cod", post(handlers::place_order_cod))
        .route("/stripe", post(handlers::place_order_online))
        .route("/user", get(handlers::user_orders))
        .route("/seller", get(handlers::seller_orders));

    Router::new()
        // Health check at root
        .route("/health", get(handlers::health))
        .route("/", get(handlers::health))
        // Order placement and listings
        .nest("/order", order_routes)
        // Provider callback (must see the raw request body)
        .route("/webhook", post(handlers::payment_webhook))
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        // State
        .with_state(state)
}
