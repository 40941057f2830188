//! Catalog listing.

use food_explorer::error::AppError;
use food_explorer::state::AppState;
use food_explorer::view::FetchStatus;
use food_explorer_core::SortKey;

use super::product_line;

/// Fetch `pages` pages for the given inputs and print the accumulated list.
pub async fn run(
    state: &AppState,
    query: Option<String>,
    category: Option<String>,
    sort: SortKey,
    pages: u32,
) -> Result<(), AppError> {
    let mut view = state.catalog_view();
    view.set_query_text(query.unwrap_or_default());
    view.set_category(category);
    view.set_sort_key(sort);

    tracing::info!(mode = %view.mode(), sort = %sort, pages, "Browsing catalog");

    for page in 1..=pages.max(1) {
        if page > 1 && !view.load_more() {
            break;
        }

        match view.refresh().await {
            FetchStatus::Loaded { received: 0, .. } => break,
            FetchStatus::Loaded { .. } | FetchStatus::Skipped | FetchStatus::Discarded => {}
            FetchStatus::Failed => {
                let Some(failure) = view.last_error().cloned() else {
                    break;
                };
                if view.products().is_empty() {
                    return Err(AppError::Listing(failure));
                }
                tracing::warn!(page, error = %failure, "Stopped loading pages");
                break;
            }
        }
    }

    println!("{} ({})", view.mode(), sort.label());
    for product in view.products() {
        println!("{}", product_line(product));
    }
    println!("{} products", view.products().len());

    Ok(())
}
