//! Normalization from raw catalog records to [`Product`].
//!
//! This is the only place where absent source values are defaulted. Once a
//! [`Product`] leaves here, every field is populated.

use std::collections::BTreeSet;

use food_explorer_core::{NutritionGrade, Nutriments, Product, ProductCode, ProductCodeError};

use super::raw::{RawCategoryTag, RawNutriments, RawProduct};
use crate::catalog::CategoryTag;

/// Normalize a raw record into a canonical [`Product`].
///
/// # Errors
///
/// Returns [`ProductCodeError`] when the record has no usable code; such a
/// record cannot be identified in lists or the cart.
pub fn normalize_product(raw: RawProduct) -> Result<Product, ProductCodeError> {
    let code = ProductCode::parse(raw.code.as_deref().unwrap_or_default())?;

    // Older records only carry `nutrition_grades`.
    let grade = raw
        .nutrition_grade_fr
        .filter(|g| !g.trim().is_empty())
        .or(raw.nutrition_grades)
        .map_or(NutritionGrade::Unknown, |g| NutritionGrade::parse_lenient(&g));

    Ok(Product {
        code,
        name: raw.product_name.map(|n| n.trim().to_string()).unwrap_or_default(),
        image_url: raw.image_url.filter(|url| !url.trim().is_empty()),
        categories: raw.categories.unwrap_or_default(),
        ingredients_text: raw.ingredients_text.unwrap_or_default(),
        nutrition_grade: grade,
        nutriments: raw.nutriments.map(convert_nutriments).unwrap_or_default(),
        labels: normalize_labels(raw.labels.unwrap_or_default()),
    })
}

/// Normalize a result page, dropping records without a usable code.
pub fn normalize_page(records: Vec<RawProduct>) -> Vec<Product> {
    records
        .into_iter()
        .filter_map(|raw| match normalize_product(raw) {
            Ok(product) => Some(product),
            Err(e) => {
                tracing::debug!(error = %e, "Dropping catalog record without usable code");
                None
            }
        })
        .collect()
}

/// Trimmed, non-empty, de-duplicated label strings.
pub fn normalize_labels(labels: Vec<String>) -> BTreeSet<String> {
    labels
        .into_iter()
        .map(|label| label.trim().to_string())
        .filter(|label| !label.is_empty())
        .collect()
}

fn convert_nutriments(raw: RawNutriments) -> Nutriments {
    Nutriments {
        energy_value: raw.energy_value.unwrap_or_default(),
        fat: raw.fat.unwrap_or_default(),
        carbohydrates: raw.carbohydrates.unwrap_or_default(),
        proteins: raw.proteins.unwrap_or_default(),
    }
}

/// Convert a directory entry; entries without a name are dropped.
pub fn convert_category_tag(tag: RawCategoryTag) -> Option<CategoryTag> {
    let name = tag.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())?;
    let id = tag
        .id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| name.clone());
    Some(CategoryTag { id, name })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn raw(json: &str) -> RawProduct {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_full_record() {
        let product = normalize_product(raw(
            r#"{
                "code": "3017620422003",
                "product_name": "Nutella",
                "image_url": "https://images.openfoodfacts.org/3017620422003.jpg",
                "categories": "Spreads, Sweet spreads, Cocoa and hazelnuts spreads",
                "ingredients_text": "Sugar, palm oil, hazelnuts 13%",
                "nutrition_grade_fr": "e",
                "nutriments": {"energy_value": 2252, "fat": 30.9, "carbohydrates": 57.5, "proteins": 6.3},
                "labels": "Vegetarian, No gluten"
            }"#,
        ))
        .unwrap();

        assert_eq!(product.code, "3017620422003");
        assert_eq!(product.name, "Nutella");
        assert_eq!(
            product.image_url.as_deref(),
            Some("https://images.openfoodfacts.org/3017620422003.jpg")
        );
        assert_eq!(product.primary_category(), Some("Spreads"));
        assert_eq!(product.nutrition_grade, NutritionGrade::E);
        assert!((product.nutriments.energy_value - 2252.0).abs() < f64::EPSILON);
        assert!(product.labels.contains("Vegetarian"));
        assert!(product.labels.contains("No gluten"));
    }

    #[test]
    fn test_missing_fields_are_defaulted() {
        let product = normalize_product(raw(r#"{"code": "42"}"#)).unwrap();

        assert_eq!(product.name, "");
        assert!(product.image_url.is_none());
        assert_eq!(product.categories, "");
        assert_eq!(product.ingredients_text, "");
        assert_eq!(product.nutrition_grade, NutritionGrade::Unknown);
        assert_eq!(product.nutriments, Nutriments::default());
        assert!(product.labels.is_empty());
    }

    #[test]
    fn test_partial_nutriments_default_to_zero() {
        let product =
            normalize_product(raw(r#"{"code": "42", "nutriments": {"fat": 1.5}}"#)).unwrap();

        assert!((product.nutriments.fat - 1.5).abs() < f64::EPSILON);
        assert!(product.nutriments.proteins.abs() < f64::EPSILON);
        assert!(product.nutriments.carbohydrates.abs() < f64::EPSILON);
        assert!(product.nutriments.energy_value.abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_image_is_absent() {
        let product = normalize_product(raw(r#"{"code": "42", "image_url": ""}"#)).unwrap();
        assert!(product.image_url.is_none());
    }

    #[test]
    fn test_labels_are_trimmed_and_non_empty() {
        let product =
            normalize_product(raw(r#"{"code": "42", "labels": " Organic ,, EU Organic, Organic,"}"#))
                .unwrap();

        let labels: Vec<&str> = product.labels.iter().map(String::as_str).collect();
        assert_eq!(labels, vec!["EU Organic", "Organic"]);
    }

    #[test]
    fn test_grade_falls_back_to_nutrition_grades() {
        let product = normalize_product(raw(
            r#"{"code": "42", "nutrition_grade_fr": "", "nutrition_grades": "B"}"#,
        ))
        .unwrap();
        assert_eq!(product.nutrition_grade, NutritionGrade::B);
    }

    #[test]
    fn test_missing_code_is_rejected() {
        assert!(normalize_product(raw(r#"{"product_name": "Orphan"}"#)).is_err());
    }

    #[test]
    fn test_normalize_page_drops_records_without_code() {
        let records = vec![
            raw(r#"{"code": "1"}"#),
            raw(r#"{"product_name": "no code"}"#),
            raw(r#"{"code": "2"}"#),
        ];
        let products = normalize_page(records);
        let codes: Vec<&str> = products.iter().map(|p| p.code.as_str()).collect();
        assert_eq!(codes, vec!["1", "2"]);
    }

    #[test]
    fn test_category_tag_id_falls_back_to_name() {
        let tag = convert_category_tag(RawCategoryTag {
            id: None,
            name: Some("Beverages".to_string()),
        })
        .unwrap();
        assert_eq!(tag.id, "Beverages");

        assert!(
            convert_category_tag(RawCategoryTag {
                id: Some("en:x".to_string()),
                name: Some("  ".to_string()),
            })
            .is_none()
        );
    }
}
