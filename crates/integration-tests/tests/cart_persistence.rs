//! Integration tests for the persisted cart.
//!
//! These verify that the cart survives process restarts (modelled as
//! reopening the store on the same file) and that products picked from a
//! listing land in the cart unchanged.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use food_explorer::cart::{AddOutcome, CartStore, JsonFileStorage};
use food_explorer::view::CatalogView;
use food_explorer_core::ProductCode;
use food_explorer_integration_tests::{FixtureCatalog, generated_records, nutella_record};

fn code(raw: &str) -> ProductCode {
    ProductCode::parse(raw).unwrap()
}

// =============================================================================
// Restart Round Trips
// =============================================================================

#[test]
fn test_cart_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cart.json");

    let catalog = FixtureCatalog::new().with_product(&nutella_record());
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let mut view = CatalogView::new(Arc::new(catalog), 20);
    view.set_barcode_text("3017620422003");
    let product = runtime.block_on(view.lookup_barcode()).unwrap();

    {
        let cart = CartStore::open(JsonFileStorage::new(&path));
        assert_eq!(cart.add(product.clone()).unwrap(), AddOutcome::Added);
        assert_eq!(
            cart.add(product.clone()).unwrap(),
            AddOutcome::Incremented { count: 2 }
        );
    }

    let cart = CartStore::open(JsonFileStorage::new(&path));
    let item = cart.get(&code("3017620422003")).unwrap();
    assert_eq!(item.count, 2);
    assert_eq!(item.product, product);
}

#[test]
fn test_removals_and_clear_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cart.json");

    {
        let cart = CartStore::open(JsonFileStorage::new(&path));
        for record in generated_records("item", 1, 3) {
            let product = food_explorer::catalog::normalize_product(
                serde_json::from_value(record).unwrap(),
            )
            .unwrap();
            cart.add(product).unwrap();
        }
        cart.set_quantity(&code("item-1-0"), 5).unwrap();
        cart.set_quantity(&code("item-1-1"), 0).unwrap();
    }

    {
        let cart = CartStore::open(JsonFileStorage::new(&path));
        let summary: Vec<(String, u32)> = cart
            .items()
            .iter()
            .map(|i| (i.code().to_string(), i.count))
            .collect();
        assert_eq!(
            summary,
            vec![("item-1-0".to_string(), 5), ("item-1-2".to_string(), 1)]
        );
        assert_eq!(cart.total_item_count(), 6);

        cart.clear().unwrap();
    }

    let cart = CartStore::open(JsonFileStorage::new(&path));
    assert!(cart.is_empty());
    assert_eq!(cart.total_item_count(), 0);
}

// =============================================================================
// Damaged Snapshots
// =============================================================================

#[test]
fn test_corrupt_file_starts_empty_and_is_replaced() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cart.json");
    std::fs::write(&path, "{\"version\": 1, \"items\": [").unwrap();

    let cart = CartStore::open(JsonFileStorage::new(&path));
    assert!(cart.is_empty());

    let product = food_explorer::catalog::normalize_product(
        serde_json::from_value(nutella_record()).unwrap(),
    )
    .unwrap();
    cart.add(product).unwrap();

    let reopened = CartStore::open(JsonFileStorage::new(&path));
    assert_eq!(reopened.total_item_count(), 1);
}

#[test]
fn test_hand_edited_snapshot_is_sanitized() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cart.json");

    let product = serde_json::to_value(
        food_explorer::catalog::normalize_product(serde_json::from_value(nutella_record()).unwrap())
            .unwrap(),
    )
    .unwrap();
    let snapshot = serde_json::json!({
        "version": 1,
        "saved_at": "2024-05-01T12:00:00Z",
        "items": [
            {"product": product, "count": 2},
            {"product": product, "count": -3},
            {"product": product, "count": 1},
        ]
    });
    std::fs::write(&path, snapshot.to_string()).unwrap();

    let cart = CartStore::open(JsonFileStorage::new(&path));

    assert_eq!(cart.line_count(), 1);
    assert_eq!(cart.total_item_count(), 3);
}

// =============================================================================
// Shared Store
// =============================================================================

#[tokio::test]
async fn test_shared_store_serializes_writers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cart.json");
    let cart = Arc::new(CartStore::open(JsonFileStorage::new(&path)));
    let product = food_explorer::catalog::normalize_product(
        serde_json::from_value(nutella_record()).unwrap(),
    )
    .unwrap();

    let tasks: Vec<_> = (0..4)
        .map(|_| {
            let cart = Arc::clone(&cart);
            let product = product.clone();
            tokio::task::spawn_blocking(move || {
                for _ in 0..10 {
                    cart.add(product.clone()).unwrap();
                }
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(cart.total_item_count(), 40);
    let reopened = CartStore::open(JsonFileStorage::new(&path));
    assert_eq!(reopened.total_item_count(), 40);
}
