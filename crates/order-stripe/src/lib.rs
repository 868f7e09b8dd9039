//! # order-stripe
//!
//! Stripe payment gateway for storefront-orders-rs.
//!
//! Implements `order_core::PaymentGateway`:
//! - Hosted Checkout Sessions with `{orderId, userId}` correlation metadata
//! - Webhook signature verification over the exact raw request bytes
//! - Checkout-session lookup by payment intent (reconciler failure branch)
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use order_stripe::StripeGateway;
//!
//! // Create gateway from environment
//! let gateway = StripeGateway::from_env()?;
//!
//! // Create a checkout session for a persisted order
//! let session = gateway.create_checkout(&order, &priced.lines, &urls).await?;
//!
//! // Redirect the buyer to session.checkout_url
//! ```

pub mod checkout;
pub mod config;
pub mod webhook;

// Re-exports
pub use checkout::StripeGateway;
pub use config::StripeConfig;
pub use webhook::{compute_signature, verify_and_parse, SIGNATURE_TOLERANCE_SECS};
