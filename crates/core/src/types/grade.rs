//! Nutrition grade (Nutri-Score letter).

use core::fmt;

use serde::{Deserialize, Serialize};

/// Nutri-Score letter grade of a product.
///
/// Ordering is `Unknown < A < B < C < D < E`, which is the lexical order of
/// the serialized forms (`""`, `"a"` .. `"e"`). Sorting ascending therefore
/// places ungraded products first.
///
/// Parsing is lenient: the catalog delivers grades in either case and uses
/// values such as `"unknown"` or `"not-applicable"` for ungraded products.
/// Anything that is not a single letter `a`-`e` becomes [`Self::Unknown`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(from = "String", into = "String")]
pub enum NutritionGrade {
    #[default]
    Unknown,
    A,
    B,
    C,
    D,
    E,
}

impl NutritionGrade {
    /// Parse a grade from a catalog value, falling back to `Unknown`.
    #[must_use]
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "a" => Self::A,
            "b" => Self::B,
            "c" => Self::C,
            "d" => Self::D,
            "e" => Self::E,
            _ => Self::Unknown,
        }
    }

    /// Lowercase letter, or an empty string when ungraded.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "",
            Self::A => "a",
            Self::B => "b",
            Self::C => "c",
            Self::D => "d",
            Self::E => "e",
        }
    }

    /// Whether the product carries an actual letter grade.
    #[must_use]
    pub const fn is_known(self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl fmt::Display for NutritionGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for NutritionGrade {
    fn from(value: String) -> Self {
        Self::parse_lenient(&value)
    }
}

impl From<NutritionGrade> for String {
    fn from(grade: NutritionGrade) -> Self {
        grade.as_str().to_string()
    }
}
