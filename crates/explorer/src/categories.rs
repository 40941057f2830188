//! Fetch-once directory of filter categories.
//!
//! The catalog's category list is large and effectively static for the life
//! of a process, so it is fetched on first use and memoized. A failed fetch
//! is not memoized; the next call tries again.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::instrument;

use crate::catalog::{CatalogError, CatalogSource};

/// Number of categories offered in the filter control.
pub const MAX_FILTER_CATEGORIES: usize = 50;

/// Memoized category names of a [`CatalogSource`].
pub struct CategoryDirectory<S> {
    source: Arc<S>,
    names: OnceCell<Vec<String>>,
}

impl<S: CatalogSource> CategoryDirectory<S> {
    /// Create an empty directory over `source`. Nothing is fetched yet.
    #[must_use]
    pub fn new(source: Arc<S>) -> Self {
        Self {
            source,
            names: OnceCell::new(),
        }
    }

    /// All category names in source order, fetching them on first call.
    ///
    /// Blank names are dropped and duplicates keep their first position.
    ///
    /// # Errors
    ///
    /// Returns the source's error if the first fetch fails.
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<&[String], CatalogError> {
        let names = self
            .names
            .get_or_try_init(|| async {
                let tags = self.source.list_categories().await?;
                let mut seen = HashSet::new();
                let names: Vec<String> = tags
                    .into_iter()
                    .map(|tag| tag.name)
                    .filter(|name| !name.trim().is_empty() && seen.insert(name.clone()))
                    .collect();
                tracing::info!(count = names.len(), "Category directory loaded");
                Ok::<_, CatalogError>(names)
            })
            .await?;

        Ok(names)
    }

    /// The first [`MAX_FILTER_CATEGORIES`] names, for the filter control.
    ///
    /// # Errors
    ///
    /// Returns the source's error if the first fetch fails.
    pub async fn filter_options(&self) -> Result<&[String], CatalogError> {
        let names = self.list_categories().await?;
        Ok(names.get(..MAX_FILTER_CATEGORIES).unwrap_or(names))
    }

    /// Whether the directory has been fetched successfully.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.names.initialized()
    }
}
