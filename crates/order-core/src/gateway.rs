//! # Payment Gateway Trait
//!
//! Seam between the order engine and the hosted-payment provider.
//!
//! The provider is a black box behind this trait: handlers and the reconciler
//! hold an explicitly constructed `Arc<dyn PaymentGateway>` (no process-wide
//! provider singleton), so it can be substituted with a test double.

use crate::error::OrderResult;
use crate::order::Order;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A resolved line item handed to the checkout adapter.
///
/// `unit_price` is in whole currency units; the adapter converts to the
/// provider's minor-unit convention on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutLine {
    pub product_id: String,
    pub name: String,
    pub unit_price: i64,
    pub quantity: u32,
}

/// Redirect targets for a hosted checkout flow
#[derive(Debug, Clone)]
pub struct CheckoutUrls {
    pub success_url: String,
    pub cancel_url: String,
}

impl CheckoutUrls {
    /// Build the storefront redirect pair from the requesting origin
    pub fn from_origin(origin: &str) -> Self {
        let origin = origin.trim_end_matches('/');
        Self {
            success_url: format!("{}/loader?next=my-orders", origin),
            cancel_url: format!("{}/cart", origin),
        }
    }
}

/// A checkout session created by the payment provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Provider's session ID
    pub session_id: String,

    /// Our internal order ID
    pub order_id: String,

    /// URL to redirect the buyer to for payment
    pub checkout_url: String,

    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

/// Correlation metadata attached to a checkout session at creation and
/// round-tripped by the provider on every related event.
///
/// Either half may be absent on a malformed or foreign session; consumers
/// treat a missing half as a benign skip, not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMetadata {
    pub order_id: Option<String>,
    pub user_id: Option<String>,
}

impl SessionMetadata {
    pub fn new(order_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            order_id: Some(order_id.into()),
            user_id: Some(user_id.into()),
        }
    }
}

/// A verified provider notification, as a closed union over the event types
/// this system reconciles. Everything else lands in `Ignored` and is
/// acknowledged without side effects so the provider does not redeliver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEvent {
    /// The buyer completed the hosted checkout for a session
    CheckoutCompleted { metadata: SessionMetadata },

    /// A payment intent failed terminally; carries only the intent id, the
    /// order must be resolved through the provider's session list
    PaymentFailed { payment_intent_id: String },

    /// Any event type this system does not care about
    Ignored { event_type: String },
}

/// Core trait for payment provider implementations
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a hosted checkout session and return the redirect URL.
    ///
    /// The order row must already be persisted before this is called, so the
    /// reconciler has something to update when the provider reports back.
    /// No local state is changed by the adapter itself.
    async fn create_checkout(
        &self,
        order: &Order,
        lines: &[CheckoutLine],
        urls: &CheckoutUrls,
    ) -> OrderResult<CheckoutSession>;

    /// Verify a webhook signature against the exact raw body bytes and parse
    /// the event. Fails closed: any verification or parse failure is an
    /// error and must cause zero state changes upstream.
    async fn verify_webhook(&self, payload: &[u8], signature: &str) -> OrderResult<WebhookEvent>;

    /// Look up the correlation metadata of the checkout session associated
    /// with a payment intent. Returns `None` when the provider has no
    /// matching session.
    async fn session_metadata_for_intent(
        &self,
        payment_intent_id: &str,
    ) -> OrderResult<Option<SessionMetadata>>;

    /// Provider name (for logging)
    fn provider_name(&self) -> &'static str;
}

/// Type alias for a shared gateway handle (dynamic dispatch)
pub type SharedPaymentGateway = Arc<dyn PaymentGateway>;
