//! Client-side ordering of the accumulated product list.
//!
//! Sorting is always stable: products that compare equal keep the order the
//! catalog returned them in. Descending keys reverse the comparator, not the
//! list, so ties stay in source order in both directions.

use std::cmp::Ordering;

use food_explorer_core::{Product, SortKey};

/// Sort `products` in place by `key`.
pub fn sort_products(products: &mut [Product], key: SortKey) {
    products.sort_by(|a, b| compare_products(a, b, key));
}

/// Compare two products under `key`.
#[must_use]
pub fn compare_products(a: &Product, b: &Product, key: SortKey) -> Ordering {
    match key {
        SortKey::NameAsc => collate(&a.name, &b.name),
        SortKey::NameDesc => collate(&b.name, &a.name),
        SortKey::NutritionAsc => a.nutrition_grade.cmp(&b.nutrition_grade),
        SortKey::NutritionDesc => b.nutrition_grade.cmp(&a.nutrition_grade),
    }
}

/// Collation for display names.
///
/// Three levels, each consulted only when the previous one ties:
/// base letters (accents and case folded), then accents, then case with
/// lowercase first. This matches locale-aware ordering for Latin text, which
/// is what the catalog's names are.
#[must_use]
pub fn collate(a: &str, b: &str) -> Ordering {
    let base = |s: &str| {
        s.chars()
            .flat_map(char::to_lowercase)
            .map(fold_accent)
            .collect::<Vec<char>>()
    };
    let accents = |s: &str| s.chars().flat_map(char::to_lowercase).collect::<Vec<char>>();
    let case = |s: &str| s.chars().map(char::is_uppercase).collect::<Vec<bool>>();

    base(a)
        .cmp(&base(b))
        .then_with(|| accents(a).cmp(&accents(b)))
        .then_with(|| case(a).cmp(&case(b)))
}

/// Map an accented Latin lowercase letter to its base letter.
const fn fold_accent(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' => 'a',
        'ç' | 'ć' | 'č' => 'c',
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ę' | 'ě' => 'e',
        'ì' | 'í' | 'î' | 'ï' | 'ī' => 'i',
        'ñ' | 'ń' | 'ň' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' => 'o',
        'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' => 'u',
        'ý' | 'ÿ' => 'y',
        'ś' | 'š' | 'ß' => 's',
        'ź' | 'ż' | 'ž' => 'z',
        'ł' => 'l',
        'ř' => 'r',
        _ => c,
    }
}
