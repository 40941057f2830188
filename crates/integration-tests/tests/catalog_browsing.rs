//! Integration tests for catalog browsing.
//!
//! These drive the listing controller and category directory end to end
//! against a fixture catalog whose records go through the same
//! normalization as live API responses.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use food_explorer::categories::{CategoryDirectory, MAX_FILTER_CATEGORIES};
use food_explorer::view::{CatalogView, FailureKind, FetchStatus, QueryMode};
use food_explorer_core::{NutritionGrade, SortKey};
use food_explorer_integration_tests::{
    FixtureCatalog, Request, generated_records, nutella_record, sparse_record,
};
use serde_json::json;

const PAGE_SIZE: u32 = 20;

fn view(catalog: FixtureCatalog) -> CatalogView<FixtureCatalog> {
    CatalogView::new(Arc::new(catalog), PAGE_SIZE)
}

fn codes(view: &CatalogView<FixtureCatalog>) -> Vec<String> {
    view.products()
        .iter()
        .map(|p| p.code.to_string())
        .collect()
}

// =============================================================================
// Normalization
// =============================================================================

#[tokio::test]
async fn test_listed_products_are_fully_defaulted() {
    let catalog = FixtureCatalog::new().with_text_page(
        "spread",
        1,
        &[
            nutella_record(),
            sparse_record("0000000000017"),
            json!({ "product_name": "No code" }),
        ],
    );
    let mut view = view(catalog);
    view.set_query_text("spread");
    view.refresh().await;

    // The record without a code is dropped.
    assert_eq!(view.products().len(), 2);

    let sparse = view
        .products()
        .iter()
        .find(|p| p.code == "0000000000017")
        .unwrap();
    assert_eq!(sparse.name, "");
    assert!(sparse.image_url.is_none());
    assert_eq!(sparse.nutrition_grade, NutritionGrade::Unknown);
    assert_eq!(sparse.nutriments.fat, 0.0);
    assert!(sparse.labels.is_empty());

    let nutella = view.products().iter().find(|p| p.name == "Nutella").unwrap();
    assert_eq!(nutella.nutrition_grade, NutritionGrade::E);
    assert_eq!(nutella.primary_category(), Some("Breakfasts"));
    assert!(nutella.labels.contains("Green Dot"));
    assert!((nutella.nutriments.energy_value - 539.0).abs() < f64::EPSILON);
}

// =============================================================================
// Mode and Paging
// =============================================================================

#[tokio::test]
async fn test_browse_paginates_default_term() {
    let catalog = FixtureCatalog::new()
        .with_text_page("food", 1, &generated_records("food", 1, 20))
        .with_text_page("food", 2, &generated_records("food", 2, 20));
    let mut view = view(catalog);

    view.refresh().await;
    assert!(view.load_more());
    view.refresh().await;

    let expected: Vec<String> = (1..=2)
        .flat_map(|page| (0..20).map(move |i| format!("food-{page}-{i}")))
        .collect();
    assert_eq!(codes(&view), expected);
    assert_eq!(
        view.source().requests(),
        vec![
            Request::Text {
                query: "food".to_string(),
                page: 1
            },
            Request::Text {
                query: "food".to_string(),
                page: 2
            },
        ]
    );
}

#[tokio::test]
async fn test_category_switch_discards_accumulated_pages() {
    let catalog = FixtureCatalog::new()
        .with_category_page("Snacks", 1, &generated_records("snacks", 1, 20))
        .with_category_page("Snacks", 2, &generated_records("snacks", 2, 20))
        .with_category_page("Beverages", 1, &generated_records("beverages", 1, 20));
    let mut view = view(catalog);

    view.set_category(Some("Snacks".to_string()));
    view.refresh().await;
    view.load_more();
    view.refresh().await;
    assert_eq!(view.products().len(), 40);

    view.set_category(Some("Beverages".to_string()));
    view.refresh().await;

    assert_eq!(view.products().len(), 20);
    assert!(codes(&view).iter().all(|c| c.starts_with("beverages-1-")));
}

#[tokio::test]
async fn test_duplicates_across_pages_are_kept() {
    let page = generated_records("dup", 1, 3);
    let catalog = FixtureCatalog::new()
        .with_text_page("dup", 1, &page)
        .with_text_page("dup", 2, &page);
    let mut view = view(catalog);
    view.set_query_text("dup");

    view.refresh().await;
    view.load_more();
    view.refresh().await;

    assert_eq!(view.products().len(), 6);
}

#[tokio::test]
async fn test_empty_page_ends_listing() {
    let catalog = FixtureCatalog::new().with_text_page("tea", 1, &generated_records("tea", 1, 5));
    let mut view = view(catalog);
    view.set_query_text("tea");
    view.refresh().await;

    assert!(view.load_more());
    let status = view.refresh().await;

    assert_eq!(
        status,
        FetchStatus::Loaded {
            page: 2,
            received: 0,
            total: 5
        }
    );
}

#[tokio::test]
async fn test_mode_follows_inputs() {
    let mut view = view(FixtureCatalog::new());
    assert_eq!(view.mode(), QueryMode::Browse);

    view.set_query_text("oat milk");
    assert_eq!(view.mode(), QueryMode::Text("oat milk".to_string()));

    view.set_category(Some("Plant milks".to_string()));
    assert_eq!(view.mode(), QueryMode::Category("Plant milks".to_string()));

    view.set_category(None);
    view.set_query_text("  ");
    assert_eq!(view.mode(), QueryMode::Browse);
}

// =============================================================================
// Sorting
// =============================================================================

#[tokio::test]
async fn test_nutrition_sort_over_accumulated_pages() {
    let catalog = FixtureCatalog::new()
        .with_text_page(
            "bars",
            1,
            &[
                json!({"code": "1", "product_name": "Bar C", "nutrition_grade_fr": "c"}),
                json!({"code": "2", "product_name": "Bar ?"}),
            ],
        )
        .with_text_page(
            "bars",
            2,
            &[
                json!({"code": "3", "product_name": "Bar A", "nutrition_grades": "a"}),
                json!({"code": "4", "product_name": "Bar E", "nutrition_grade_fr": "E"}),
            ],
        );
    let mut view = view(catalog);
    view.set_query_text("bars");
    view.set_sort_key(SortKey::NutritionAsc);

    view.refresh().await;
    view.load_more();
    view.refresh().await;

    assert_eq!(codes(&view), vec!["2", "3", "1", "4"]);
}

#[tokio::test]
async fn test_name_sort_is_case_aware() {
    let catalog = FixtureCatalog::new().with_text_page(
        "cola",
        1,
        &[
            json!({"code": "1", "product_name": "Cola"}),
            json!({"code": "2", "product_name": "apple juice"}),
            json!({"code": "3", "product_name": "cola"}),
            json!({"code": "4", "product_name": "Banana"}),
        ],
    );
    let mut view = view(catalog);
    view.set_query_text("cola");
    view.refresh().await;

    assert_eq!(codes(&view), vec!["2", "4", "3", "1"]);
}

// =============================================================================
// Barcode Lookup
// =============================================================================

#[tokio::test]
async fn test_barcode_lookup_then_back_to_catalog() {
    let catalog = FixtureCatalog::new()
        .with_text_page("food", 1, &generated_records("food", 1, 20))
        .with_product(&nutella_record());
    let mut view = view(catalog);
    view.refresh().await;

    view.set_barcode_text("3017620422003");
    let product = view.lookup_barcode().await.unwrap();

    assert_eq!(product.name, "Nutella");
    assert_eq!(codes(&view), vec!["3017620422003"]);
    assert!(!view.load_more());

    assert!(view.show_catalog());
    view.refresh().await;
    assert_eq!(view.products().len(), 20);
}

#[tokio::test]
async fn test_unknown_barcode_keeps_displayed_list() {
    let catalog = FixtureCatalog::new().with_text_page("food", 1, &generated_records("food", 1, 20));
    let mut view = view(catalog);
    view.refresh().await;
    let before = codes(&view);

    view.set_barcode_text("4006381333931");
    let err = view.lookup_barcode().await.unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(codes(&view), before);
    assert_eq!(view.last_error().unwrap().kind, FailureKind::NotFound);
}

#[tokio::test]
async fn test_slow_barcode_lookup_never_overwrites_newer_listing() {
    let catalog = FixtureCatalog::new()
        .with_category_page("Beverages", 1, &generated_records("beverages", 1, 20))
        .with_product(&nutella_record());
    let mut view = view(catalog);

    view.set_barcode_text("3017620422003");
    let slow = view.begin_barcode_lookup().unwrap();
    view.set_category(Some("Beverages".to_string()));
    view.refresh().await;

    let source = view.source();
    let outcome = slow.run(source.as_ref()).await;

    assert!(view.complete_barcode(outcome).unwrap().is_none());
    assert!(view.barcode_result().is_none());
    assert!(codes(&view).iter().all(|c| c.starts_with("beverages-1-")));
    assert!(!view.is_loading());
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test]
async fn test_outage_keeps_list_and_recovers() {
    let catalog = FixtureCatalog::new()
        .with_text_page("food", 1, &generated_records("food", 1, 20))
        .with_text_page("food", 2, &generated_records("food", 2, 20));
    let mut view = view(catalog);
    view.refresh().await;

    view.source().set_offline(true);
    assert!(view.load_more());
    assert_eq!(view.refresh().await, FetchStatus::Failed);
    assert_eq!(view.products().len(), 20);
    assert!(!view.is_loading());
    assert_eq!(view.last_error().unwrap().kind, FailureKind::Upstream);

    view.source().set_offline(false);
    view.refresh().await;
    assert_eq!(view.products().len(), 40);
    assert!(view.last_error().is_none());
}

#[tokio::test]
async fn test_stale_page_never_lands() {
    let catalog = FixtureCatalog::new()
        .with_text_page("food", 1, &generated_records("food", 1, 20))
        .with_text_page("tea", 1, &generated_records("tea", 1, 3));
    let mut view = view(catalog);

    let slow = view.begin_fetch().unwrap();
    view.set_query_text("tea");
    let fresh = view.begin_fetch().unwrap();

    let source = view.source();
    let fresh_outcome = fresh.run(source.as_ref()).await;
    let slow_outcome = slow.run(source.as_ref()).await;

    assert!(matches!(view.complete(fresh_outcome), FetchStatus::Loaded { .. }));
    assert_eq!(view.complete(slow_outcome), FetchStatus::Discarded);
    assert!(codes(&view).iter().all(|c| c.starts_with("tea-1-")));
}

// =============================================================================
// Category Directory
// =============================================================================

#[tokio::test]
async fn test_category_directory_is_fetched_once() {
    let names: Vec<String> = (0..80).map(|i| format!("Category {i:02}")).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let catalog = Arc::new(FixtureCatalog::new().with_categories(&refs));
    let directory = CategoryDirectory::new(Arc::clone(&catalog));

    assert_eq!(directory.filter_options().await.unwrap().len(), MAX_FILTER_CATEGORIES);
    assert_eq!(directory.list_categories().await.unwrap().len(), 80);

    let directory_requests = catalog
        .requests()
        .into_iter()
        .filter(|r| *r == Request::Categories)
        .count();
    assert_eq!(directory_requests, 1);
}
