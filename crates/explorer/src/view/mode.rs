//! Query mode derivation.

use std::fmt;

/// Search term used when neither a category nor a query is set.
pub const DEFAULT_BROWSE_TERM: &str = "food";

/// Which kind of catalog request backs the listing.
///
/// Derived from the inputs on every fetch; never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryMode {
    /// Products of a category. Takes precedence over any query text.
    Category(String),
    /// Free-text search.
    Text(String),
    /// Default browse: a text search for [`DEFAULT_BROWSE_TERM`].
    Browse,
}

impl QueryMode {
    /// Derive the mode from the selected category and the query text.
    ///
    /// A category wins when present. Otherwise whitespace-only query text
    /// falls back to browsing.
    #[must_use]
    pub fn derive(category: Option<&str>, query_text: &str) -> Self {
        if let Some(category) = category.filter(|c| !c.trim().is_empty()) {
            return Self::Category(category.to_string());
        }

        let query = query_text.trim();
        if query.is_empty() {
            Self::Browse
        } else {
            Self::Text(query.to_string())
        }
    }

    /// The text search term, or `None` for category mode.
    #[must_use]
    pub fn search_term(&self) -> Option<&str> {
        match self {
            Self::Category(_) => None,
            Self::Text(query) => Some(query),
            Self::Browse => Some(DEFAULT_BROWSE_TERM),
        }
    }
}

impl fmt::Display for QueryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Category(category) => write!(f, "category:{category}"),
            Self::Text(query) => write!(f, "search:{query}"),
            Self::Browse => write!(f, "browse"),
        }
    }
}
