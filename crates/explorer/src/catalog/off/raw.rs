//! Raw response shapes of the Open Food Facts API.
//!
//! The catalog is crowd-sourced and its JSON is loosely typed: numbers show up
//! as strings, strings as numbers, and any field may be missing or `null`.
//! Everything here is optional and decoded leniently; defaulting happens in
//! [`super::conversions`].

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// `GET /cgi/search.pl` and `GET /category/{id}.json`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    /// Total number of matches reported by the source.
    #[serde(default, deserialize_with = "lenient_u64")]
    pub count: Option<u64>,
    /// Records on this page.
    #[serde(default)]
    pub products: Vec<RawProduct>,
}

/// `GET /api/v0/product/{code}.json`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BarcodeResponse {
    /// The code that was looked up.
    #[serde(default, deserialize_with = "lenient_string")]
    pub code: Option<String>,
    /// `1` when found, `0` otherwise.
    #[serde(default, deserialize_with = "lenient_u64")]
    pub status: Option<u64>,
    /// Human-readable status (e.g. `product not found`).
    #[serde(default, deserialize_with = "lenient_string")]
    pub status_verbose: Option<String>,
    /// The record, absent when not found.
    #[serde(default)]
    pub product: Option<RawProduct>,
}

/// `GET /categories.json`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoriesResponse {
    #[serde(default, deserialize_with = "lenient_u64")]
    pub count: Option<u64>,
    #[serde(default)]
    pub tags: Vec<RawCategoryTag>,
}

/// One entry of the category directory.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCategoryTag {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
}

/// A product record as delivered by the catalog.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawProduct {
    #[serde(default, deserialize_with = "lenient_string")]
    pub code: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub product_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub categories: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub ingredients_text: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub nutrition_grade_fr: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub nutrition_grades: Option<String>,
    #[serde(default, deserialize_with = "lenient_nutriments")]
    pub nutriments: Option<RawNutriments>,
    #[serde(default, deserialize_with = "lenient_labels")]
    pub labels: Option<Vec<String>>,
}

/// Nutrition facts as delivered by the catalog.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawNutriments {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub energy_value: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub fat: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub carbohydrates: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub proteins: Option<f64>,
}

// =============================================================================
// Lenient decoders
// =============================================================================

/// Accept a string or a number; anything else is treated as absent.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Accept a number or a numeric string.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite()))
}

/// Accept a non-negative integer or an integer string.
fn lenient_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
        _ => None,
    })
}

/// Some records carry `[]` or a scalar instead of an object.
fn lenient_nutriments<'de, D>(deserializer: D) -> Result<Option<RawNutriments>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(value @ Value::Object(_)) => serde_json::from_value(value).ok(),
        _ => None,
    })
}

/// Labels arrive as a comma-delimited string; some records carry an array.
fn lenient_labels<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s.split(',').map(str::to_string).collect()),
        Some(Value::Array(items)) => Some(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
        ),
        _ => None,
    })
}
