//! Integration tests for Food Explorer.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p food-explorer-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `catalog_browsing` - Listing controller driven against a fixture catalog
//! - `cart_persistence` - Cart store against real files, across reopenings
//!
//! The tests never reach the network. [`FixtureCatalog`] serves raw catalog
//! records shaped like real API payloads and runs them through the same
//! normalization as the HTTP client.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use food_explorer::catalog::{
    CatalogError, CatalogSource, CategoryTag, RawProduct, normalize_page, normalize_product,
};
use food_explorer_core::{Product, ProductCode};
use serde_json::{Value, json};

/// A request received by a [`FixtureCatalog`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Text { query: String, page: u32 },
    Category { category: String, page: u32 },
    Barcode(String),
    Categories,
}

/// In-memory catalog serving normalized fixture records.
///
/// Unknown queries, categories and pages answer with an empty page, like
/// the real catalog does past the last page.
#[derive(Default)]
pub struct FixtureCatalog {
    text_pages: HashMap<(String, u32), Vec<Product>>,
    category_pages: HashMap<(String, u32), Vec<Product>>,
    products: HashMap<String, Product>,
    categories: Vec<CategoryTag>,
    offline: AtomicBool,
    requests: Mutex<Vec<Request>>,
}

impl FixtureCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `records` (raw JSON product objects) for a text search page.
    #[must_use]
    pub fn with_text_page(mut self, query: &str, page: u32, records: &[Value]) -> Self {
        self.text_pages
            .insert((query.to_string(), page), normalize_records(records));
        self
    }

    /// Serve `records` for a category page.
    #[must_use]
    pub fn with_category_page(mut self, category: &str, page: u32, records: &[Value]) -> Self {
        self.category_pages
            .insert((category.to_string(), page), normalize_records(records));
        self
    }

    /// Serve `record` for barcode lookups of its code.
    #[must_use]
    pub fn with_product(mut self, record: &Value) -> Self {
        if let Some(product) = serde_json::from_value::<RawProduct>(record.clone())
            .ok()
            .and_then(|raw| normalize_product(raw).ok())
        {
            self.products.insert(product.code.to_string(), product);
        }
        self
    }

    /// Serve a category directory with these names.
    #[must_use]
    pub fn with_categories(mut self, names: &[&str]) -> Self {
        self.categories = names
            .iter()
            .map(|name| CategoryTag {
                id: format!("en:{}", name.to_lowercase().replace(' ', "-")),
                name: (*name).to_string(),
            })
            .collect();
        self
    }

    /// Make every request fail with a 503 until switched back.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Requests received so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<Request> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, request: Request) -> Result<(), CatalogError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);

        if self.offline.load(Ordering::SeqCst) {
            return Err(CatalogError::Status {
                status: 503,
                body: "Service Unavailable".to_string(),
            });
        }
        Ok(())
    }
}

impl CatalogSource for FixtureCatalog {
    async fn search_by_text(
        &self,
        query: &str,
        page: u32,
        _page_size: u32,
    ) -> Result<Vec<Product>, CatalogError> {
        self.record(Request::Text {
            query: query.to_string(),
            page,
        })?;
        Ok(self
            .text_pages
            .get(&(query.to_string(), page))
            .cloned()
            .unwrap_or_default())
    }

    async fn search_by_category(
        &self,
        category: &str,
        page: u32,
    ) -> Result<Vec<Product>, CatalogError> {
        self.record(Request::Category {
            category: category.to_string(),
            page,
        })?;
        Ok(self
            .category_pages
            .get(&(category.to_string(), page))
            .cloned()
            .unwrap_or_default())
    }

    async fn get_by_barcode(&self, code: &ProductCode) -> Result<Product, CatalogError> {
        self.record(Request::Barcode(code.to_string()))?;
        self.products
            .get(code.as_str())
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(format!("Product not found: {code}")))
    }

    async fn list_categories(&self) -> Result<Vec<CategoryTag>, CatalogError> {
        self.record(Request::Categories)?;
        Ok(self.categories.clone())
    }
}

/// Decode and normalize raw records, dropping those the client would drop.
fn normalize_records(records: &[Value]) -> Vec<Product> {
    let raw: Vec<RawProduct> = records
        .iter()
        .filter_map(|record| serde_json::from_value(record.clone()).ok())
        .collect();
    normalize_page(raw)
}

/// `count` raw records with codes `{prefix}-{page}-{i}` and names sorting in
/// generation order.
#[must_use]
pub fn generated_records(prefix: &str, page: u32, count: usize) -> Vec<Value> {
    (0..count)
        .map(|i| {
            json!({
                "code": format!("{prefix}-{page}-{i}"),
                "product_name": format!("{prefix} p{page:02} i{i:02}"),
                "categories": "Generated",
                "nutrition_grade_fr": "c",
            })
        })
        .collect()
}

/// A complete raw record in the shape the catalog returns.
#[must_use]
pub fn nutella_record() -> Value {
    json!({
        "code": "3017620422003",
        "product_name": "Nutella",
        "image_url": "https://images.openfoodfacts.org/images/products/301/762/042/2003/front_en.jpg",
        "categories": "Breakfasts,Spreads,Sweet spreads,Hazelnut spreads",
        "ingredients_text": "Sugar, palm oil, hazelnuts 13%, skimmed milk powder 8.7%, fat-reduced cocoa 7.4%",
        "nutrition_grade_fr": "e",
        "nutriments": {
            "energy_value": 539,
            "fat": 30.9,
            "carbohydrates": 57.5,
            "proteins": 6.3
        },
        "labels": "No gluten,Green Dot"
    })
}

/// A sparse raw record: most fields absent or null.
#[must_use]
pub fn sparse_record(code: &str) -> Value {
    json!({
        "code": code,
        "product_name": null,
        "nutriments": [],
    })
}
