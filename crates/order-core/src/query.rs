//! # Order Query Service
//!
//! Read paths for "my orders" and the seller/admin view. Both restrict to
//! settled orders (COD or confirmed-paid), sort newest first, and eagerly
//! resolve item and address references for presentation. No pagination; the
//! full matching set is returned, which only holds up while volumes stay
//! small.

use crate::customer::Address;
use crate::error::OrderResult;
use crate::order::{Order, OrderFilter, PaymentType};
use crate::product::Product;
use crate::store::{AddressStore, OrderStore, ProductStore};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// An order item with its product reference resolved.
///
/// A product that has vanished from the catalog resolves to `null` rather
/// than failing the whole listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemView {
    pub product: Option<Product>,
    pub quantity: u32,
}

/// An order prepared for presentation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub id: String,
    pub user_id: String,
    pub items: Vec<OrderItemView>,
    pub address: Option<Address>,
    pub amount: i64,
    pub payment_type: PaymentType,
    pub is_paid: bool,
    pub created_at: DateTime<Utc>,
}

/// Read-side service over the order, product, and address stores
pub struct OrderQueryService {
    orders: Arc<dyn OrderStore>,
    products: Arc<dyn ProductStore>,
    addresses: Arc<dyn AddressStore>,
}

impl OrderQueryService {
    pub fn new(
        orders: Arc<dyn OrderStore>,
        products: Arc<dyn ProductStore>,
        addresses: Arc<dyn AddressStore>,
    ) -> Self {
        Self {
            orders,
            products,
            addresses,
        }
    }

    /// Settled orders for one buyer, newest first
    pub async fn orders_for_user(&self, user_id: &str) -> OrderResult<Vec<OrderView>> {
        let orders = self
            .orders
            .list(&OrderFilter::settled_for_user(user_id))
            .await?;
        self.resolve(orders).await
    }

    /// All settled orders (seller/admin view), newest first
    pub async fn all_orders(&self) -> OrderResult<Vec<OrderView>> {
        let orders = self.orders.list(&OrderFilter::settled()).await?;
        self.resolve(orders).await
    }

    async fn resolve(&self, orders: Vec<Order>) -> OrderResult<Vec<OrderView>> {
        let mut views = Vec::with_capacity(orders.len());

        for order in orders {
            let mut items = Vec::with_capacity(order.items.len());
            for item in &order.items {
                items.push(OrderItemView {
                    product: self.products.get(&item.product_id).await?,
                    quantity: item.quantity,
                });
            }

            let address = self.addresses.get(&order.address_id).await?;
            let is_paid = order.is_paid();

            views.push(OrderView {
                id: order.id,
                user_id: order.user_id,
                items,
                address,
                amount: order.amount,
                payment_type: order.payment_type,
                is_paid,
                created_at: order.created_at,
            });
        }

        Ok(views)
    }
}
