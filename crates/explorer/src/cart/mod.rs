//! Locally persisted cart.
//!
//! # Architecture
//!
//! - [`CartStore`] holds the line items in memory behind a `Mutex` and is
//!   shared through an `Arc`
//! - Every mutation writes a full [`CartSnapshot`] to a [`CartStorage`]
//!   while the lock is held, so concurrent callers serialize on
//!   read-modify-persist
//! - The snapshot is read exactly once, when the store is opened; a missing
//!   or unreadable snapshot yields an empty cart
//! - A failed write keeps the in-memory change and reports the error

mod snapshot;
mod storage;

use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

use food_explorer_core::{CartItem, Product, ProductCode};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

pub use snapshot::{CartSnapshot, SNAPSHOT_VERSION, SnapshotItem};
pub use storage::{CartStorage, JsonFileStorage, MemoryStorage};

/// Errors that can occur when persisting the cart.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Reading or writing the snapshot file failed.
    #[error("Cart storage error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The snapshot could not be serialized.
    #[error("Cart serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// What [`CartStore::add`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// The product was not in the cart and now has a count of one.
    Added,
    /// The product was already in the cart; its count was raised.
    Incremented {
        /// The new count.
        count: u32,
    },
}

/// The cart: ordered line items keyed by product code.
pub struct CartStore<S> {
    storage: S,
    items: Mutex<Vec<CartItem>>,
}

impl<S: CartStorage> CartStore<S> {
    /// Open a store, rehydrating from `storage`.
    ///
    /// Never fails: missing, unreadable or corrupt snapshots are logged and
    /// treated as an empty cart.
    #[must_use]
    pub fn open(storage: S) -> Self {
        let items = rehydrate(&storage);
        Self {
            storage,
            items: Mutex::new(items),
        }
    }

    /// The backing storage.
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    fn lock(&self) -> MutexGuard<'_, Vec<CartItem>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, items: &[CartItem]) -> Result<(), PersistenceError> {
        let contents = serde_json::to_string(&CartSnapshot::capture(items))?;
        self.storage.save(&contents).inspect_err(|e| {
            warn!(error = %e, "Failed to persist cart; in-memory cart is ahead of storage");
        })
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add one of `product`.
    ///
    /// A product already in the cart has its count raised by one; otherwise
    /// it is appended with a count of one.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] if the snapshot write fails. The item is
    /// added in memory regardless.
    #[instrument(skip_all, fields(code = %product.code))]
    pub fn add(&self, product: Product) -> Result<AddOutcome, PersistenceError> {
        let mut items = self.lock();

        let outcome = if let Some(item) = items.iter_mut().find(|i| i.product.code == product.code) {
            item.count = item.count.saturating_add(1);
            AddOutcome::Incremented { count: item.count }
        } else {
            items.push(CartItem::new(product));
            AddOutcome::Added
        };

        debug!(?outcome, "Cart add");
        self.persist(&items)?;
        Ok(outcome)
    }

    /// Set the count of the item with `code`.
    ///
    /// A count of zero or less removes the item. Does nothing when the code
    /// is not in the cart.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] if the snapshot write fails.
    #[instrument(skip(self), fields(code = %code))]
    pub fn set_quantity(&self, code: &ProductCode, count: i64) -> Result<(), PersistenceError> {
        let mut items = self.lock();

        let Some(index) = items.iter().position(|i| i.code() == code) else {
            return Ok(());
        };

        apply_count(&mut items, index, count);
        self.persist(&items)
    }

    /// Remove the item with `code`. Returns whether it was present.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] if the snapshot write fails.
    #[instrument(skip(self), fields(code = %code))]
    pub fn remove(&self, code: &ProductCode) -> Result<bool, PersistenceError> {
        let mut items = self.lock();

        let Some(index) = items.iter().position(|i| i.code() == code) else {
            return Ok(false);
        };
        items.remove(index);

        self.persist(&items)?;
        Ok(true)
    }

    /// Remove every item.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] if the snapshot write fails.
    #[instrument(skip(self))]
    pub fn clear(&self) -> Result<(), PersistenceError> {
        let mut items = self.lock();
        items.clear();
        self.persist(&items)
    }

    /// Raise the count of `code` by one. Returns the new count, or `None`
    /// when the code is not in the cart.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] if the snapshot write fails.
    pub fn increment(&self, code: &ProductCode) -> Result<Option<u32>, PersistenceError> {
        self.step(code, 1)
    }

    /// Lower the count of `code` by one, removing it at zero. Returns the new
    /// count, or `None` when the item was removed or not in the cart.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] if the snapshot write fails.
    pub fn decrement(&self, code: &ProductCode) -> Result<Option<u32>, PersistenceError> {
        self.step(code, -1)
    }

    fn step(&self, code: &ProductCode, delta: i64) -> Result<Option<u32>, PersistenceError> {
        let mut items = self.lock();

        let Some((index, current)) = items
            .iter()
            .enumerate()
            .find(|(_, i)| i.code() == code)
            .map(|(index, i)| (index, i.count))
        else {
            return Ok(None);
        };

        let count = apply_count(&mut items, index, i64::from(current) + delta);
        self.persist(&items)?;
        Ok(count)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Sum of all counts.
    #[must_use]
    pub fn total_item_count(&self) -> u64 {
        self.lock().iter().map(|i| u64::from(i.count)).sum()
    }

    /// All items in insertion order.
    #[must_use]
    pub fn items(&self) -> Vec<CartItem> {
        self.lock().clone()
    }

    #[must_use]
    pub fn get(&self, code: &ProductCode) -> Option<CartItem> {
        self.lock().iter().find(|i| i.code() == code).cloned()
    }

    #[must_use]
    pub fn contains(&self, code: &ProductCode) -> bool {
        self.lock().iter().any(|i| i.code() == code)
    }

    /// Number of distinct products.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// Set the count at `index`, removing the line when `count` is not positive.
/// Returns the remaining count.
fn apply_count(items: &mut Vec<CartItem>, index: usize, count: i64) -> Option<u32> {
    if count <= 0 {
        items.remove(index);
        return None;
    }

    let count = u32::try_from(count).unwrap_or(u32::MAX);
    let item = items.get_mut(index)?;
    item.count = count;
    Some(count)
}

/// Read and sanitize the stored snapshot.
fn rehydrate<S: CartStorage>(storage: &S) -> Vec<CartItem> {
    let contents = match storage.load() {
        Ok(Some(contents)) => contents,
        Ok(None) => {
            debug!("No stored cart; starting empty");
            return Vec::new();
        }
        Err(e) => {
            warn!(error = %e, "Failed to read stored cart; starting empty");
            return Vec::new();
        }
    };

    let snapshot: CartSnapshot = match serde_json::from_str(&contents) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            warn!(error = %e, "Stored cart is corrupt; starting empty");
            return Vec::new();
        }
    };

    if snapshot.version != SNAPSHOT_VERSION {
        warn!(
            version = snapshot.version,
            expected = SNAPSHOT_VERSION,
            "Stored cart has an unknown version; starting empty"
        );
        return Vec::new();
    }

    let saved_at = snapshot.saved_at;
    let items = snapshot.into_items();
    info!(lines = items.len(), %saved_at, "Cart rehydrated");
    items
}
