//! Application state shared across commands.

use std::sync::Arc;

use crate::cart::{CartStore, JsonFileStorage};
use crate::catalog::{CatalogError, OpenFoodFactsClient};
use crate::categories::CategoryDirectory;
use crate::config::ExplorerConfig;
use crate::view::CatalogView;

/// Application state.
///
/// This struct is cheaply cloneable via `Arc` and owns the single catalog
/// client, category directory and cart store of the process.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ExplorerConfig,
    catalog: Arc<OpenFoodFactsClient>,
    categories: CategoryDirectory<OpenFoodFactsClient>,
    cart: Arc<CartStore<JsonFileStorage>>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// Opens the cart at `config.cart_path`, rehydrating it from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: ExplorerConfig) -> Result<Self, CatalogError> {
        let catalog = Arc::new(OpenFoodFactsClient::new(&config.catalog)?);
        let categories = CategoryDirectory::new(Arc::clone(&catalog));
        let cart = Arc::new(CartStore::open(JsonFileStorage::new(&config.cart_path)));

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                categories,
                cart,
            }),
        })
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &ExplorerConfig {
        &self.inner.config
    }

    /// Get a reference to the catalog client.
    #[must_use]
    pub fn catalog(&self) -> &OpenFoodFactsClient {
        &self.inner.catalog
    }

    /// Get a reference to the category directory.
    #[must_use]
    pub fn categories(&self) -> &CategoryDirectory<OpenFoodFactsClient> {
        &self.inner.categories
    }

    /// Get a reference to the cart store.
    #[must_use]
    pub fn cart(&self) -> &CartStore<JsonFileStorage> {
        &self.inner.cart
    }

    /// Get a shared handle to the cart store.
    #[must_use]
    pub fn cart_handle(&self) -> Arc<CartStore<JsonFileStorage>> {
        Arc::clone(&self.inner.cart)
    }

    /// Create a listing controller over the shared catalog client.
    #[must_use]
    pub fn catalog_view(&self) -> CatalogView<OpenFoodFactsClient> {
        CatalogView::new(
            Arc::clone(&self.inner.catalog),
            self.inner.config.catalog.page_size,
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use food_explorer_core::{Product, ProductCode};

    use super::*;
    use crate::view::QueryMode;

    fn state(dir: &tempfile::TempDir) -> AppState {
        let config = ExplorerConfig::from_lookup(|key| match key {
            "FOOD_EXPLORER_CART_PATH" => Some(dir.path().join("cart.json").display().to_string()),
            "OFF_PAGE_SIZE" => Some("12".to_string()),
            _ => None,
        })
        .unwrap();
        AppState::new(config).unwrap()
    }

    #[test]
    fn test_catalog_view_uses_configured_page_size() {
        let dir = tempfile::tempdir().unwrap();
        let view = state(&dir).catalog_view();

        assert_eq!(view.page_size(), 12);
        assert_eq!(view.mode(), QueryMode::Browse);
        assert!(view.products().is_empty());
    }

    #[test]
    fn test_clones_share_the_cart() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(&dir);
        let other = state.clone();

        state
            .cart()
            .add(Product::new(ProductCode::parse("123").unwrap(), "Oats"))
            .unwrap();

        assert_eq!(other.cart().total_item_count(), 1);
        assert!(dir.path().join("cart.json").exists());
    }

    #[test]
    fn test_cart_rehydrates_on_new_state() {
        let dir = tempfile::tempdir().unwrap();
        state(&dir)
            .cart()
            .add(Product::new(ProductCode::parse("123").unwrap(), "Oats"))
            .unwrap();

        assert_eq!(state(&dir).cart().total_item_count(), 1);
    }
}
