//! Single-product lookups.

use food_explorer::catalog::CatalogSource;
use food_explorer::error::AppError;
use food_explorer::state::AppState;
use food_explorer_core::Product;

use super::{parse_code, product_line};

/// Look up `code` through the listing controller and print the result line.
pub async fn lookup(state: &AppState, code: String) -> Result<(), AppError> {
    let mut view = state.catalog_view();
    view.set_barcode_text(code);

    let product = view.lookup_barcode().await?;
    println!("{}", product_line(&product));

    Ok(())
}

/// Print every field of the product with `code`.
pub async fn show(state: &AppState, code: &str) -> Result<(), AppError> {
    let code = parse_code(code)?;
    let product = state.catalog().get_by_barcode(&code).await?;

    print_details(&product);
    if let Some(item) = state.cart().get(&product.code) {
        println!("In cart:      {}", item.count);
    }

    Ok(())
}

fn print_details(product: &Product) {
    let or_dash = |s: &str| if s.is_empty() { "-".to_string() } else { s.to_string() };
    let nutriments = &product.nutriments;

    println!("Code:         {}", product.code);
    println!("Name:         {}", or_dash(&product.name));
    println!("Nutri-Score:  {}", or_dash(&product.nutrition_grade.as_str().to_uppercase()));
    println!("Categories:   {}", or_dash(&product.display_categories(usize::MAX)));
    println!(
        "Labels:       {}",
        or_dash(&product.labels.iter().cloned().collect::<Vec<_>>().join(", "))
    );
    println!("Image:        {}", product.image_url.as_deref().unwrap_or("-"));
    println!("Ingredients:  {}", or_dash(&product.ingredients_text));
    println!("Per 100g:");
    println!("  Energy:        {}", nutriments.energy_value);
    println!("  Fat:           {} g", nutriments.fat);
    println!("  Carbohydrates: {} g", nutriments.carbohydrates);
    println!("  Proteins:      {} g", nutriments.proteins);
}
