//! Cache types for catalog responses.

use food_explorer_core::{Product, ProductCode};

use crate::catalog::CategoryTag;

/// Cache key for result pages, single products and the category directory.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Search {
        query: String,
        page: u32,
        page_size: u32,
    },
    Category {
        category: String,
        page: u32,
    },
    Barcode(ProductCode),
    Categories,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Products(Vec<Product>),
    Product(Box<Product>),
    Categories(Vec<CategoryTag>),
}
