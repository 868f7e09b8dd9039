//! # Customer Profile Types
//!
//! User profiles (holding the shopping-cart state the reconciler clears on a
//! completed checkout) and stored shipping addresses.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A storefront user profile
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user identifier
    pub id: String,

    /// Shopping-cart state: product id -> quantity
    #[serde(default)]
    pub cart_items: HashMap<String, u32>,
}

impl User {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            cart_items: HashMap::new(),
        }
    }

    /// Builder: put an item in the cart
    pub fn with_cart_item(mut self, product_id: impl Into<String>, quantity: u32) -> Self {
        self.cart_items.insert(product_id.into(), quantity);
        self
    }
}

/// A stored shipping address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    /// Unique address identifier
    pub id: String,

    pub street: String,
    pub city: String,
    pub state: String,
    pub zipcode: String,
    pub country: String,
}

impl Address {
    pub fn new(
        id: impl Into<String>,
        street: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        zipcode: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            street: street.into(),
            city: city.into(),
            state: state.into(),
            zipcode: zipcode.into(),
            country: country.into(),
        }
    }
}
