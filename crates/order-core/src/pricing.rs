//! # Pricing Calculator
//!
//! Derives an order total from the authoritative product catalog at order
//! time. Clients may lie about prices but never about product identity and
//! quantity, so requests carry only `{product, quantity}` and the amount is
//! recomputed here on every order.

use crate::error::{OrderError, OrderResult};
use crate::gateway::CheckoutLine;
use crate::order::OrderItem;
use crate::store::ProductStore;

/// Flat tax surcharge, applied as `floor(subtotal * TAX_RATE_PERCENT / 100)`
pub const TAX_RATE_PERCENT: i64 = 2;

/// Result of pricing an item list: the final amount plus the resolved lines
/// the checkout adapter charges, guaranteeing the hosted session describes
/// the same prices the amount was derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedOrder {
    /// Total including tax, in whole currency units
    pub amount: i64,

    /// Resolved line items (name, unit price, quantity)
    pub lines: Vec<CheckoutLine>,
}

/// Price an item list against current catalog prices.
///
/// All-or-nothing: any unresolvable product id aborts the whole order with
/// `ProductNotFound` before anything is written. Arithmetic is exact i64,
/// no floating-point accumulation.
pub async fn price_items(
    products: &dyn ProductStore,
    items: &[OrderItem],
) -> OrderResult<PricedOrder> {
    if items.is_empty() {
        return Err(OrderError::InvalidRequest("order has no items".to_string()));
    }

    let mut subtotal: i64 = 0;
    let mut lines = Vec::with_capacity(items.len());

    for item in items {
        if item.quantity == 0 {
            return Err(OrderError::InvalidRequest(format!(
                "zero quantity for product {}",
                item.product_id
            )));
        }

        let product = products
            .get(&item.product_id)
            .await?
            .ok_or_else(|| OrderError::ProductNotFound {
                product_id: item.product_id.clone(),
            })?;

        let line_total = product
            .offer_price
            .checked_mul(item.quantity as i64)
            .ok_or_else(|| OrderError::InvalidRequest("order total overflows".to_string()))?;

        subtotal = subtotal
            .checked_add(line_total)
            .ok_or_else(|| OrderError::InvalidRequest("order total overflows".to_string()))?;

        lines.push(CheckoutLine {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price: product.offer_price,
            quantity: item.quantity,
        });
    }

    // Integer division floors for non-negative subtotals
    let tax = subtotal
        .checked_mul(TAX_RATE_PERCENT)
        .ok_or_else(|| OrderError::InvalidRequest("order total overflows".to_string()))?
        / 100;
    let amount = subtotal
        .checked_add(tax)
        .ok_or_else(|| OrderError::InvalidRequest("order total overflows".to_string()))?;

    Ok(PricedOrder { amount, lines })
}
