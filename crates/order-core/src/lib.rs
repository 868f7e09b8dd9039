//! # order-core
//!
//! Core types and traits for the storefront order engine.
//!
//! This crate provides:
//! - `Order`, `OrderItem`, and the `PendingPayment -> Paid` lifecycle
//! - `price_items` for deriving order totals from the authoritative catalog
//! - `OrderStore`, `ProductStore`, `UserStore`, `AddressStore` persistence
//!   seams with in-memory implementations
//! - `PaymentGateway` trait for hosted-checkout providers
//! - `Reconciler`, which applies provider webhook events to local state
//! - `OrderQueryService` for buyer and seller order listings
//! - `OrderError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use order_core::{price_items, Order, Reconciler};
//!
//! // Price an item list against the catalog
//! let priced = price_items(products.as_ref(), &items).await?;
//!
//! // Persist the order before asking the provider for a session
//! let order = Order::new_online(user_id, items, address_id, priced.amount);
//! orders.create(order.clone()).await?;
//! let session = gateway.create_checkout(&order, &priced.lines, &urls).await?;
//!
//! // Later, apply the provider's verified webhook event
//! reconciler.apply(event).await?;
//! ```

pub mod customer;
pub mod error;
pub mod gateway;
pub mod memory;
pub mod order;
pub mod pricing;
pub mod product;
pub mod query;
pub mod reconciler;
pub mod store;

// Re-exports for convenience
pub use customer::{Address, User};
pub use error::{OrderError, OrderResult};
pub use gateway::{
    CheckoutLine, CheckoutSession, CheckoutUrls, PaymentGateway, SessionMetadata,
    SharedPaymentGateway, WebhookEvent,
};
pub use memory::{CatalogProductStore, MemoryAddressStore, MemoryOrderStore, MemoryUserStore};
pub use order::{Order, OrderFilter, OrderItem, PaymentStatus, PaymentType};
pub use pricing::{price_items, PricedOrder, TAX_RATE_PERCENT};
pub use product::{Product, ProductCatalog};
pub use query::{OrderItemView, OrderQueryService, OrderView};
pub use reconciler::{ReconcileOutcome, Reconciler};
pub use store::{AddressStore, OrderStore, ProductStore, UserStore};
