//! Command implementations.

pub mod browse;
pub mod cart;
pub mod categories;
pub mod product;

use food_explorer::error::AppError;
use food_explorer_core::{Product, ProductCode};

/// Parse a product code argument.
fn parse_code(raw: &str) -> Result<ProductCode, AppError> {
    ProductCode::parse(raw).map_err(|e| AppError::InvalidInput(format!("Invalid product code: {e}")))
}

/// One listing line: code, grade, name and primary categories.
fn product_line(product: &Product) -> String {
    let grade = if product.nutrition_grade.is_known() {
        product.nutrition_grade.as_str().to_uppercase()
    } else {
        "?".to_string()
    };
    let name = if product.name.is_empty() {
        "(unnamed)"
    } else {
        product.name.as_str()
    };

    format!(
        "{:<14} [{grade}] {name}  {}",
        product.code,
        product.display_categories(2)
    )
}
