//! Cart line item.

use serde::{Deserialize, Serialize};

use super::code::ProductCode;
use super::product::Product;

/// A product in the cart together with its quantity.
///
/// `count` is always at least 1 for items held by the cart store; a change
/// that would bring it to zero removes the item instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    /// The product as it was when first added.
    pub product: Product,
    /// Quantity, `>= 1`.
    pub count: u32,
}

impl CartItem {
    /// Create a line item with a count of one.
    #[must_use]
    pub const fn new(product: Product) -> Self {
        Self { product, count: 1 }
    }

    /// The product code this line is keyed by.
    #[must_use]
    pub const fn code(&self) -> &ProductCode {
        &self.product.code
    }

    /// The product's display name.
    #[must_use]
    pub fn product_name(&self) -> &str {
        &self.product.name
    }
}
