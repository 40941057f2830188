//! Canonical product representation.
//!
//! A [`Product`] is what the catalog client hands out after normalization:
//! every field is populated, absent source values have already been
//! defaulted, and the value is not mutated afterwards.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::code::ProductCode;
use super::grade::NutritionGrade;

/// Nutrition facts per 100g.
///
/// Missing source values are stored as `0.0`; the model does not distinguish
/// "missing" from "zero".
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Nutriments {
    /// Energy value in the unit reported by the catalog.
    pub energy_value: f64,
    /// Fat in grams.
    pub fat: f64,
    /// Carbohydrates in grams.
    pub carbohydrates: f64,
    /// Proteins in grams.
    pub proteins: f64,
}

/// A normalized catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Catalog identifier, primary key for list and cart identity.
    pub code: ProductCode,
    /// Display name (may be empty).
    pub name: String,
    /// Front image URL. `None` means no image is available.
    pub image_url: Option<String>,
    /// Comma-delimited category labels, primary category first.
    pub categories: String,
    /// Ingredient list as free text (may be empty).
    pub ingredients_text: String,
    /// Nutri-Score grade.
    pub nutrition_grade: NutritionGrade,
    /// Nutrition facts.
    pub nutriments: Nutriments,
    /// Label strings (e.g. "Organic", "Fair trade").
    pub labels: BTreeSet<String>,
}

impl Product {
    /// Create a product with only a code and name; everything else defaulted.
    #[must_use]
    pub fn new(code: ProductCode, name: impl Into<String>) -> Self {
        Self {
            code,
            name: name.into(),
            image_url: None,
            categories: String::new(),
            ingredients_text: String::new(),
            nutrition_grade: NutritionGrade::Unknown,
            nutriments: Nutriments::default(),
            labels: BTreeSet::new(),
        }
    }

    /// All category labels, trimmed, in source order.
    pub fn category_list(&self) -> impl Iterator<Item = &str> {
        self.categories
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }

    /// The first category label, used as the display category.
    #[must_use]
    pub fn primary_category(&self) -> Option<&str> {
        self.category_list().next()
    }

    /// The first `limit` category labels joined for display.
    #[must_use]
    pub fn display_categories(&self, limit: usize) -> String {
        self.category_list()
            .take(limit)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Whether the product has an image to show.
    #[must_use]
    pub const fn has_image(&self) -> bool {
        self.image_url.is_some()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product_with_categories(categories: &str) -> Product {
        let mut product = Product::new(ProductCode::parse("1").unwrap(), "Test");
        product.categories = categories.to_string();
        product
    }

    #[test]
    fn test_new_is_fully_defaulted() {
        let product = Product::new(ProductCode::parse("42").unwrap(), "Oats");
        assert_eq!(product.name, "Oats");
        assert!(product.image_url.is_none());
        assert!(product.categories.is_empty());
        assert!(product.ingredients_text.is_empty());
        assert_eq!(product.nutrition_grade, NutritionGrade::Unknown);
        assert_eq!(product.nutriments, Nutriments::default());
        assert!(product.labels.is_empty());
    }

    #[test]
    fn test_primary_category() {
        let product = product_with_categories("Snacks, Sweet snacks, Cocoa");
        assert_eq!(product.primary_category(), Some("Snacks"));
    }

    #[test]
    fn test_primary_category_skips_blank_entries() {
        let product = product_with_categories(" , Beverages");
        assert_eq!(product.primary_category(), Some("Beverages"));

        let product = product_with_categories("");
        assert_eq!(product.primary_category(), None);
    }

    #[test]
    fn test_display_categories_takes_first_two() {
        let product = product_with_categories("Snacks,Sweet snacks,Cocoa");
        assert_eq!(product.display_categories(2), "Snacks, Sweet snacks");
    }

    #[test]
    fn test_serde_round_trip_keeps_fields() {
        let mut product = Product::new(ProductCode::parse("3017620422003").unwrap(), "Spread");
        product.nutrition_grade = NutritionGrade::E;
        product.labels.insert("Vegetarian".to_string());
        product.nutriments.fat = 30.9;

        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["code"], "3017620422003");
        assert_eq!(json["nutrition_grade"], "e");
        assert_eq!(json["labels"][0], "Vegetarian");

        let back: Product = serde_json::from_value(json).unwrap();
        assert_eq!(back, product);
    }
}
