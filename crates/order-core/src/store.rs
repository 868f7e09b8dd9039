//! # Store Traits
//!
//! Persistence seams for orders, products, users, and addresses.
//!
//! Each operation is individually atomic; callers never compose multi-step
//! client-side transactions. Update and delete report "was it there" as a
//! `bool` rather than failing, because the reconciler must treat operations
//! on already-removed ids as benign no-ops under webhook redelivery.

use crate::customer::{Address, User};
use crate::error::OrderResult;
use crate::order::{Order, OrderFilter};
use crate::product::Product;
use async_trait::async_trait;

/// Order persistence
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist a new order
    async fn create(&self, order: Order) -> OrderResult<()>;

    /// Point lookup by id
    async fn get(&self, id: &str) -> OrderResult<Option<Order>>;

    /// Transition an order to `Paid`. Returns whether the order existed;
    /// setting an already-paid order paid again is the same end state.
    async fn mark_paid(&self, id: &str) -> OrderResult<bool>;

    /// Delete an order. Returns whether the order existed.
    async fn delete(&self, id: &str) -> OrderResult<bool>;

    /// Filtered listing, sorted by creation time descending
    async fn list(&self, filter: &OrderFilter) -> OrderResult<Vec<Order>>;
}

/// Read-only product lookups
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn get(&self, id: &str) -> OrderResult<Option<Product>>;
}

/// User profile store (cart state lives here)
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get(&self, id: &str) -> OrderResult<Option<User>>;

    async fn upsert(&self, user: User) -> OrderResult<()>;

    /// Empty a user's shopping cart. Returns whether the user existed;
    /// clearing an already-empty cart is the same end state.
    async fn clear_cart(&self, id: &str) -> OrderResult<bool>;
}

/// Stored shipping addresses
#[async_trait]
pub trait AddressStore: Send + Sync {
    async fn get(&self, id: &str) -> OrderResult<Option<Address>>;

    async fn upsert(&self, address: Address) -> OrderResult<()>;
}
