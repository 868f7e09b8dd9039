//! # order-api
//!
//! HTTP API layer for storefront-orders-rs.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - Order placement endpoints (COD and hosted checkout)
//! - Webhook endpoint feeding the payment reconciler
//! - Buyer and seller order listings
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | POST | `/order/cod` | Place cash-on-delivery order |
//! | POST | `/order/stripe` | Place online order, returns checkout URL |
//! | POST | `/webhook` | Payment provider webhook |
//! | GET | `/order/user` | Buyer's settled orders |
//! | GET | `/order/seller` | All settled orders |

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState};
