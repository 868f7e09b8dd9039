//! # In-Memory Stores
//!
//! `HashMap`-backed implementations of the store traits, behind async
//! `RwLock`s so many request tasks can share them. These are the storage this
//! repo ships with; a database-backed implementation is a drop-in swap
//! behind the same traits.

use crate::customer::{Address, User};
use crate::error::OrderResult;
use crate::order::{Order, OrderFilter, PaymentStatus};
use crate::product::{Product, ProductCatalog};
use crate::store::{AddressStore, OrderStore, ProductStore, UserStore};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-memory order store
#[derive(Default)]
pub struct MemoryOrderStore {
    orders: RwLock<HashMap<String, Order>>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn create(&self, order: Order) -> OrderResult<()> {
        self.orders.write().await.insert(order.id.clone(), order);
        Ok(())
    }

    async fn get(&self, id: &str) -> OrderResult<Option<Order>> {
        Ok(self.orders.read().await.get(id).cloned())
    }

    async fn mark_paid(&self, id: &str) -> OrderResult<bool> {
        let mut orders = self.orders.write().await;
        match orders.get_mut(id) {
            Some(order) => {
                order.status = PaymentStatus::Paid;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &str) -> OrderResult<bool> {
        Ok(self.orders.write().await.remove(id).is_some())
    }

    async fn list(&self, filter: &OrderFilter) -> OrderResult<Vec<Order>> {
        let orders = self.orders.read().await;
        let mut matching: Vec<Order> = orders
            .values()
            .filter(|o| filter.matches(o))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matching)
    }
}

/// Product store backed by the config-loaded catalog
pub struct CatalogProductStore {
    catalog: ProductCatalog,
}

impl CatalogProductStore {
    pub fn new(catalog: ProductCatalog) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl ProductStore for CatalogProductStore {
    async fn get(&self, id: &str) -> OrderResult<Option<Product>> {
        Ok(self.catalog.get(id).cloned())
    }
}

/// In-memory user profile store
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<String, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn get(&self, id: &str) -> OrderResult<Option<User>> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn upsert(&self, user: User) -> OrderResult<()> {
        self.users.write().await.insert(user.id.clone(), user);
        Ok(())
    }

    async fn clear_cart(&self, id: &str) -> OrderResult<bool> {
        let mut users = self.users.write().await;
        match users.get_mut(id) {
            Some(user) => {
                user.cart_items.clear();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// In-memory address store
#[derive(Default)]
pub struct MemoryAddressStore {
    addresses: RwLock<HashMap<String, Address>>,
}

impl MemoryAddressStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AddressStore for MemoryAddressStore {
    async fn get(&self, id: &str) -> OrderResult<Option<Address>> {
        Ok(self.addresses.read().await.get(id).cloned())
    }

    async fn upsert(&self, address: Address) -> OrderResult<()> {
        self.addresses
            .write()
            .await
            .insert(address.id.clone(), address);
        Ok(())
    }
}
