//! Sort keys for the catalog listing.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when a sort key string is not recognized.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown sort key '{0}' (expected name-asc, name-desc, nutrition-asc or nutrition-desc)")]
pub struct SortKeyError(pub String);

/// The active ordering of the accumulated product list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// Name, A to Z.
    #[default]
    NameAsc,
    /// Name, Z to A.
    NameDesc,
    /// Nutrition grade, ungraded first then A to E.
    NutritionAsc,
    /// Nutrition grade, E to A then ungraded.
    NutritionDesc,
}

impl SortKey {
    /// All sort keys in menu order.
    pub const ALL: [Self; 4] = [
        Self::NameAsc,
        Self::NameDesc,
        Self::NutritionAsc,
        Self::NutritionDesc,
    ];

    /// Stable string identifier (`name-asc`, ...).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NameAsc => "name-asc",
            Self::NameDesc => "name-desc",
            Self::NutritionAsc => "nutrition-asc",
            Self::NutritionDesc => "nutrition-desc",
        }
    }

    /// Human-readable label for menus.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::NameAsc => "Name (A-Z)",
            Self::NameDesc => "Name (Z-A)",
            Self::NutritionAsc => "Nutrition Grade (Ascending)",
            Self::NutritionDesc => "Nutrition Grade (Descending)",
        }
    }

    /// Whether this key orders in descending direction.
    #[must_use]
    pub const fn is_descending(self) -> bool {
        matches!(self, Self::NameDesc | Self::NutritionDesc)
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SortKey {
    type Err = SortKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SortKeyError(s.to_string()))
    }
}
