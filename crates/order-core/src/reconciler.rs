//! # Webhook Reconciler
//!
//! Keeps an order's paid/unpaid state consistent with the payment provider's
//! asynchronous notifications.
//!
//! The provider delivers events at least once, in any order. Both terminal
//! transitions therefore tolerate redelivery and reordering: marking a paid
//! order paid again, clearing an already-empty cart, and deleting an
//! already-deleted order are all benign no-ops. Only infrastructure failures
//! (store or provider unavailable) propagate as errors, which the webhook
//! endpoint turns into a retryable 500.

use crate::error::OrderResult;
use crate::gateway::{SharedPaymentGateway, WebhookEvent};
use crate::store::{OrderStore, UserStore};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What a reconciliation pass did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Order transitioned to `Paid`
    OrderPaid { order_id: String },

    /// Order deleted after terminal payment failure
    OrderRemoved { order_id: String },

    /// Nothing to do (ignored event type, missing correlation id, or an
    /// order that was already gone)
    NoOp,
}

/// Applies verified provider events to local order and profile state
pub struct Reconciler {
    orders: Arc<dyn OrderStore>,
    users: Arc<dyn UserStore>,
    gateway: SharedPaymentGateway,
}

impl Reconciler {
    pub fn new(
        orders: Arc<dyn OrderStore>,
        users: Arc<dyn UserStore>,
        gateway: SharedPaymentGateway,
    ) -> Self {
        Self {
            orders,
            users,
            gateway,
        }
    }

    /// Apply one verified event. Safe to re-run with the same event.
    pub async fn apply(&self, event: WebhookEvent) -> OrderResult<ReconcileOutcome> {
        match event {
            WebhookEvent::CheckoutCompleted { metadata } => {
                let mut outcome = ReconcileOutcome::NoOp;

                match metadata.order_id {
                    Some(order_id) => {
                        if self.orders.mark_paid(&order_id).await? {
                            info!(order_id = %order_id, "order confirmed paid");
                            outcome = ReconcileOutcome::OrderPaid { order_id };
                        } else {
                            // Racing or reordered delivery may have removed
                            // the order already
                            warn!(order_id = %order_id, "completed checkout for unknown order");
                        }
                    }
                    None => warn!("completed checkout carried no order id"),
                }

                if let Some(user_id) = metadata.user_id {
                    if self.users.clear_cart(&user_id).await? {
                        debug!(user_id = %user_id, "cleared cart after checkout");
                    } else {
                        warn!(user_id = %user_id, "completed checkout for unknown user");
                    }
                }

                Ok(outcome)
            }

            WebhookEvent::PaymentFailed { payment_intent_id } => {
                let metadata = self
                    .gateway
                    .session_metadata_for_intent(&payment_intent_id)
                    .await?;

                match metadata.and_then(|m| m.order_id) {
                    Some(order_id) => {
                        if self.orders.delete(&order_id).await? {
                            info!(order_id = %order_id, "order removed after payment failure");
                            Ok(ReconcileOutcome::OrderRemoved { order_id })
                        } else {
                            debug!(order_id = %order_id, "failed payment for already-removed order");
                            Ok(ReconcileOutcome::NoOp)
                        }
                    }
                    None => {
                        debug!(
                            payment_intent_id = %payment_intent_id,
                            "no session metadata for failed payment intent"
                        );
                        Ok(ReconcileOutcome::NoOp)
                    }
                }
            }

            WebhookEvent::Ignored { event_type } => {
                debug!(event_type = %event_type, "ignoring unhandled webhook event");
                Ok(ReconcileOutcome::NoOp)
            }
        }
    }
}
