//! Open Food Facts API client implementation.
//!
//! Uses `reqwest` for HTTP and `url` to build request URLs with properly
//! encoded path segments. Caches result pages, single products and the
//! category directory using `moka`.

mod cache;
pub mod conversions;
pub mod raw;

use std::sync::Arc;
use std::time::Duration;

use food_explorer_core::{Product, ProductCode};
use moka::future::Cache;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use crate::catalog::{CatalogError, CatalogSource, CategoryTag};
use crate::config::CatalogConfig;

use cache::{CacheKey, CacheValue};
use conversions::{convert_category_tag, normalize_page, normalize_product};
use raw::{BarcodeResponse, CategoriesResponse, SearchResponse};

/// Maximum number of body characters kept in logs and error messages.
const BODY_PREVIEW_CHARS: usize = 500;

// =============================================================================
// OpenFoodFactsClient
// =============================================================================

/// Client for the Open Food Facts read API.
///
/// Cheap to clone; clones share the HTTP connection pool and the response
/// cache.
#[derive(Clone)]
pub struct OpenFoodFactsClient {
    inner: Arc<OpenFoodFactsClientInner>,
}

struct OpenFoodFactsClientInner {
    client: reqwest::Client,
    base_url: Url,
    timeout: Duration,
    cache: Cache<CacheKey, CacheValue>,
}

impl OpenFoodFactsClient {
    /// Create a new catalog client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let cache = Cache::builder()
            .max_capacity(config.cache_capacity)
            .time_to_live(config.cache_ttl)
            .build();

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            inner: Arc::new(OpenFoodFactsClientInner {
                client,
                base_url: config.base_url.clone(),
                timeout: config.timeout,
                cache,
            }),
        })
    }

    /// Build an endpoint URL from path segments, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, CatalogError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| CatalogError::InvalidUrl(url::ParseError::RelativeUrlWithoutBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Issue a GET request and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, CatalogError> {
        let response = self
            .inner
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();

        // Check for rate limiting
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(CatalogError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let response_text = response
            .text()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        if !status.is_success() {
            let body = preview(&response_text);
            tracing::error!(
                status = %status,
                body = %body,
                "Catalog returned non-success status"
            );
            return Err(CatalogError::Status {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %preview(&response_text),
                "Failed to parse catalog response"
            );
            CatalogError::Parse(e)
        })
    }

    fn map_transport_error(&self, error: reqwest::Error) -> CatalogError {
        if error.is_timeout() {
            CatalogError::Timeout(self.inner.timeout)
        } else {
            CatalogError::Http(error)
        }
    }

    // =========================================================================
    // Cache Management
    // =========================================================================

    /// Invalidate a cached product.
    pub async fn invalidate_product(&self, code: &ProductCode) {
        self.inner
            .cache
            .invalidate(&CacheKey::Barcode(code.clone()))
            .await;
    }

    /// Invalidate all cached data.
    pub async fn invalidate_all(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }
}

impl CatalogSource for OpenFoodFactsClient {
    #[instrument(skip(self))]
    async fn search_by_text(
        &self,
        query: &str,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<Product>, CatalogError> {
        let cache_key = CacheKey::Search {
            query: query.to_string(),
            page,
            page_size,
        };

        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for search page");
            return Ok(products);
        }

        let mut url = self.endpoint(&["cgi", "search.pl"])?;
        url.query_pairs_mut()
            .append_pair("search_terms", query)
            .append_pair("search_simple", "1")
            .append_pair("action", "process")
            .append_pair("json", "1")
            .append_pair("page", &page.to_string())
            .append_pair("page_size", &page_size.to_string());

        let response: SearchResponse = self.get_json(url).await?;
        debug!(count = ?response.count, records = response.products.len(), "Search page fetched");

        let products = normalize_page(response.products);

        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    #[instrument(skip(self))]
    async fn search_by_category(
        &self,
        category: &str,
        page: u32,
    ) -> Result<Vec<Product>, CatalogError> {
        let cache_key = CacheKey::Category {
            category: category.to_string(),
            page,
        };

        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for category page");
            return Ok(products);
        }

        let mut url = self.endpoint(&["category", &format!("{category}.json")])?;
        url.query_pairs_mut().append_pair("page", &page.to_string());

        let response: SearchResponse = self.get_json(url).await?;
        debug!(count = ?response.count, records = response.products.len(), "Category page fetched");

        let products = normalize_page(response.products);

        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    #[instrument(skip(self), fields(code = %code))]
    async fn get_by_barcode(&self, code: &ProductCode) -> Result<Product, CatalogError> {
        let cache_key = CacheKey::Barcode(code.clone());

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let url = self.endpoint(&["api", "v0", "product", &format!("{code}.json")])?;

        let response: BarcodeResponse = match self.get_json(url).await {
            Ok(response) => response,
            // Newer API revisions answer unknown codes with a 404
            Err(CatalogError::Status { status: 404, .. }) => {
                return Err(CatalogError::NotFound(format!("Product not found: {code}")));
            }
            Err(e) => return Err(e),
        };

        let mut raw_product = match (response.status, response.product) {
            (Some(0), _) | (_, None) => {
                debug!(status_verbose = ?response.status_verbose, "Product not in catalog");
                return Err(CatalogError::NotFound(format!("Product not found: {code}")));
            }
            (_, Some(product)) => product,
        };

        // The record itself may omit the code; the envelope or request carries it.
        if raw_product.code.as_deref().is_none_or(|c| c.trim().is_empty()) {
            raw_product.code = Some(response.code.unwrap_or_else(|| code.to_string()));
        }

        let product = normalize_product(raw_product)?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    #[instrument(skip(self))]
    async fn list_categories(&self) -> Result<Vec<CategoryTag>, CatalogError> {
        if let Some(CacheValue::Categories(tags)) =
            self.inner.cache.get(&CacheKey::Categories).await
        {
            debug!("Cache hit for categories");
            return Ok(tags);
        }

        let url = self.endpoint(&["categories.json"])?;
        let response: CategoriesResponse = self.get_json(url).await?;

        let tags: Vec<CategoryTag> = response
            .tags
            .into_iter()
            .filter_map(convert_category_tag)
            .collect();
        debug!(count = ?response.count, tags = tags.len(), "Category directory fetched");

        self.inner
            .cache
            .insert(CacheKey::Categories, CacheValue::Categories(tags.clone()))
            .await;

        Ok(tags)
    }
}

/// First [`BODY_PREVIEW_CHARS`] characters of a response body.
fn preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW_CHARS).collect()
}
