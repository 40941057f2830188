//! Category directory listing.

use food_explorer::error::AppError;
use food_explorer::state::AppState;

/// Print the filter categories, or the whole directory with `all`.
pub async fn run(state: &AppState, all: bool) -> Result<(), AppError> {
    let directory = state.categories();
    let names = if all {
        directory.list_categories().await?
    } else {
        directory.filter_options().await?
    };

    for name in names {
        println!("{name}");
    }

    Ok(())
}
