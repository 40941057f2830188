//! Open Food Facts catalog access.
//!
//! # Architecture
//!
//! - The catalog is the source of truth - products are never synced locally,
//!   every listing is a direct API call
//! - Raw records are normalized into [`Product`] at this boundary; nothing
//!   downstream ever sees an absent field
//! - In-memory caching via `moka` for API responses (5 minute TTL by default)
//! - [`CatalogSource`] abstracts the four source operations so the listing
//!   controller and category directory can run against any source
//!
//! # Example
//!
//! ```rust,ignore
//! use food_explorer::catalog::{CatalogSource, OpenFoodFactsClient};
//!
//! let client = OpenFoodFactsClient::new(&config.catalog)?;
//!
//! let page = client.search_by_text("muesli", 1, 20).await?;
//! let product = client.get_by_barcode(&page[0].code).await?;
//! ```

mod off;

use std::future::Future;
use std::time::Duration;

use food_explorer_core::{Product, ProductCode, ProductCodeError};
use thiserror::Error;

pub use off::OpenFoodFactsClient;
pub use off::conversions::{normalize_page, normalize_product};
pub use off::raw::RawProduct;

/// Errors that can occur when querying the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The catalog answered with a non-success status.
    #[error("Catalog returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Truncated response body.
        body: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The request did not complete in time.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Rate limited by the catalog.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// A request URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The input is not a usable product code.
    #[error("Invalid product code: {0}")]
    InvalidCode(#[from] ProductCodeError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl CatalogError {
    /// The catalog has no product for the requested code.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Transport, status or payload failure on the catalog side.
    #[must_use]
    pub const fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::Http(_)
                | Self::Status { .. }
                | Self::Parse(_)
                | Self::Timeout(_)
                | Self::RateLimited(_)
        )
    }
}

/// A category entry from the catalog's category directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTag {
    /// Catalog identifier (e.g. `en:breakfast-cereals`).
    pub id: String,
    /// Display name (e.g. `Breakfast cereals`).
    pub name: String,
}

/// A read-only product catalog.
///
/// All operations return normalized products. Implementations surface
/// failures to the caller without retrying.
pub trait CatalogSource: Send + Sync {
    /// Free-text search, 1-based `page`.
    ///
    /// Returns an empty list when nothing matches.
    fn search_by_text(
        &self,
        query: &str,
        page: u32,
        page_size: u32,
    ) -> impl Future<Output = Result<Vec<Product>, CatalogError>> + Send;

    /// Products in a category, 1-based `page` of source-defined size.
    fn search_by_category(
        &self,
        category: &str,
        page: u32,
    ) -> impl Future<Output = Result<Vec<Product>, CatalogError>> + Send;

    /// Exact lookup by product code.
    ///
    /// Fails with [`CatalogError::NotFound`] when the catalog has no such
    /// product.
    fn get_by_barcode(
        &self,
        code: &ProductCode,
    ) -> impl Future<Output = Result<Product, CatalogError>> + Send;

    /// The full category directory in source order.
    fn list_categories(
        &self,
    ) -> impl Future<Output = Result<Vec<CategoryTag>, CatalogError>> + Send;
}
