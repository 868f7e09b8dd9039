//! # Order Types
//!
//! Order records and their payment lifecycle.
//!
//! An order is created once (COD handler or online handler), mutated at most
//! by the webhook reconciler (transition to `Paid`, or deletion on terminal
//! payment failure), and never otherwise updated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A line in an order: a product reference plus quantity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Product ID (field named `product` on the wire for storefront compatibility)
    #[serde(rename = "product")]
    pub product_id: String,

    /// Quantity, must be > 0
    pub quantity: u32,
}

impl OrderItem {
    pub fn new(product_id: impl Into<String>, quantity: u32) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
        }
    }
}

/// How the buyer pays for an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentType {
    /// Cash on delivery; settled out of band, never touched by the reconciler
    #[serde(rename = "COD")]
    Cod,
    /// Hosted checkout session with the payment provider
    Online,
}

/// Payment lifecycle of an order.
///
/// Online orders start `PendingPayment` and are moved to `Paid` by the
/// reconciler once the provider confirms, or deleted outright on terminal
/// failure. COD orders stay `PendingPayment` for their entire life here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    PendingPayment,
    Paid,
}

/// A persisted purchase record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Unique order ID (generated)
    pub id: String,

    /// The purchasing user
    pub user_id: String,

    /// Ordered line items
    pub items: Vec<OrderItem>,

    /// Reference to a stored shipping address
    pub address_id: String,

    /// Total in whole currency units, computed at creation, immutable after
    pub amount: i64,

    /// Payment type
    pub payment_type: PaymentType,

    /// Payment lifecycle state
    pub status: PaymentStatus,

    /// Creation timestamp, used for descending sort in listings
    pub created_at: DateTime<Utc>,
}

impl Order {
    fn new(
        user_id: impl Into<String>,
        items: Vec<OrderItem>,
        address_id: impl Into<String>,
        amount: i64,
        payment_type: PaymentType,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            items,
            address_id: address_id.into(),
            amount,
            payment_type,
            status: PaymentStatus::PendingPayment,
            created_at: Utc::now(),
        }
    }

    /// Create a cash-on-delivery order
    pub fn new_cod(
        user_id: impl Into<String>,
        items: Vec<OrderItem>,
        address_id: impl Into<String>,
        amount: i64,
    ) -> Self {
        Self::new(user_id, items, address_id, amount, PaymentType::Cod)
    }

    /// Create an online order awaiting a checkout session outcome
    pub fn new_online(
        user_id: impl Into<String>,
        items: Vec<OrderItem>,
        address_id: impl Into<String>,
        amount: i64,
    ) -> Self {
        Self::new(user_id, items, address_id, amount, PaymentType::Online)
    }

    /// Whether the provider has confirmed payment
    pub fn is_paid(&self) -> bool {
        self.status == PaymentStatus::Paid
    }

    /// Whether this order should appear in buyer/seller listings.
    ///
    /// An online order that is still an unconfirmed pending checkout is
    /// never exposed.
    pub fn is_settled(&self) -> bool {
        self.payment_type == PaymentType::Cod || self.is_paid()
    }
}

/// Filter for order listings
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    /// Restrict to one buyer
    pub user_id: Option<String>,

    /// Only settled orders (COD or confirmed-paid)
    pub settled_only: bool,
}

impl OrderFilter {
    /// All settled orders (seller/admin view)
    pub fn settled() -> Self {
        Self {
            user_id: None,
            settled_only: true,
        }
    }

    /// Settled orders for one buyer
    pub fn settled_for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            settled_only: true,
        }
    }

    /// Whether an order passes this filter
    pub fn matches(&self, order: &Order) -> bool {
        if let Some(ref user_id) = self.user_id {
            if &order.user_id != user_id {
                return false;
            }
        }
        if self.settled_only && !order.is_settled() {
            return false;
        }
        true
    }
}
