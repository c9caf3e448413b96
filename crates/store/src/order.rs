//! Shopping-list types for order processing.

use serde::{Deserialize, Serialize};

use storefront_products::ProductId;

/// One shopping-list entry: which product, how many units.
///
/// A shopping list is an ordered slice of lines submitted together as one
/// order; the same product may appear on more than one line.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: u64,
}

impl OrderLine {
    pub fn new(product_id: ProductId, quantity: u64) -> Self {
        Self {
            product_id,
            quantity,
        }
    }
}
