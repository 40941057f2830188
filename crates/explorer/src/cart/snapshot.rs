//! Serialized form of the cart.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use food_explorer_core::{CartItem, Product, ProductCode};
use serde::{Deserialize, Serialize};

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// The persisted cart.
///
/// ```json
/// {"version": 1, "saved_at": "2024-05-01T12:00:00Z", "items": [{"product": {...}, "count": 2}]}
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartSnapshot {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub items: Vec<SnapshotItem>,
}

/// A stored line. `count` is signed so hand-edited or older files with bad
/// counts still decode and get sanitized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotItem {
    pub product: Product,
    pub count: i64,
}

impl CartSnapshot {
    /// Snapshot the given items, stamped with the current time.
    #[must_use]
    pub fn capture(items: &[CartItem]) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            items: items
                .iter()
                .map(|item| SnapshotItem {
                    product: item.product.clone(),
                    count: i64::from(item.count),
                })
                .collect(),
        }
    }

    /// Turn stored lines back into cart items.
    ///
    /// Lines with a non-positive count are dropped. Lines repeating a code
    /// are merged into the first one by summing counts.
    #[must_use]
    pub fn into_items(self) -> Vec<CartItem> {
        let mut items: Vec<CartItem> = Vec::with_capacity(self.items.len());
        let mut positions: HashMap<ProductCode, usize> = HashMap::new();

        for SnapshotItem { product, count } in self.items {
            if count <= 0 {
                continue;
            }
            let count = u32::try_from(count).unwrap_or(u32::MAX);

            if let Some(&index) = positions.get(&product.code) {
                if let Some(existing) = items.get_mut(index) {
                    existing.count = existing.count.saturating_add(count);
                }
            } else {
                positions.insert(product.code.clone(), items.len());
                items.push(CartItem { product, count });
            }
        }

        items
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use food_explorer_core::ProductCode;

    use super::*;

    fn product(code: &str) -> Product {
        Product::new(ProductCode::parse(code).unwrap(), format!("Product {code}"))
    }

    fn line(code: &str, count: i64) -> SnapshotItem {
        SnapshotItem {
            product: product(code),
            count,
        }
    }

    #[test]
    fn test_capture_format() {
        let items = vec![CartItem {
            product: product("123"),
            count: 3,
        }];
        let json = serde_json::to_value(CartSnapshot::capture(&items)).unwrap();

        assert_eq!(json["version"], 1);
        assert!(json["saved_at"].as_str().unwrap().contains('T'));
        assert_eq!(json["items"][0]["count"], 3);
        assert_eq!(json["items"][0]["product"]["code"], "123");
    }

    #[test]
    fn test_into_items_drops_non_positive_counts() {
        let snapshot = CartSnapshot {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            items: vec![line("1", 0), line("2", -4), line("3", 2)],
        };

        let items = snapshot.into_items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].code().as_str(), "3");
        assert_eq!(items[0].count, 2);
    }

    #[test]
    fn test_into_items_merges_duplicates_in_first_position() {
        let snapshot = CartSnapshot {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            items: vec![line("1", 1), line("2", 1), line("1", 4)],
        };

        let items = snapshot.into_items();
        let summary: Vec<(&str, u32)> = items
            .iter()
            .map(|i| (i.code().as_str(), i.count))
            .collect();
        assert_eq!(summary, vec![("1", 5), ("2", 1)]);
    }
}
