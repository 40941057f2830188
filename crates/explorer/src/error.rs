//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type for hosts of the library. Hosts call
//! [`AppError::report`] before showing [`AppError::user_message`] so that
//! upstream and storage failures reach Sentry.

use thiserror::Error;

use crate::cart::PersistenceError;
use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::view::{FailureKind, FetchFailure};

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Catalog request failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// A listing fetch failed.
    #[error("Listing error: {0}")]
    Listing(FetchFailure),

    /// Cart persistence failed.
    #[error("Cart error: {0}")]
    Persistence(#[from] PersistenceError),

    /// Configuration is invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Bad input from the user.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl AppError {
    /// Log the error and capture it to Sentry when it is not the user's
    /// doing.
    pub fn report(&self) {
        let capture = match self {
            Self::Catalog(err) => err.is_upstream(),
            Self::Listing(failure) => failure.kind == FailureKind::Upstream,
            Self::Persistence(_) | Self::Config(_) => true,
            Self::InvalidInput(_) => false,
        };

        if capture {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Command error"
            );
        } else {
            tracing::warn!(error = %self, "Command rejected");
        }
    }

    /// Message suitable for showing to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Catalog(err) if err.is_not_found() => "Product not found".to_string(),
            Self::Catalog(CatalogError::InvalidCode(err)) => format!("Invalid barcode: {err}"),
            Self::Catalog(CatalogError::RateLimited(secs)) => {
                format!("The catalog is busy, try again in {secs} seconds")
            }
            Self::Catalog(CatalogError::Timeout(_)) => "The catalog did not respond in time".to_string(),
            Self::Catalog(_) => "Could not reach the product catalog".to_string(),
            Self::Listing(failure) => match failure.kind {
                FailureKind::NotFound => "Nothing found".to_string(),
                FailureKind::InvalidInput => failure.message.clone(),
                FailureKind::Upstream => "Could not reach the product catalog".to_string(),
            },
            Self::Persistence(_) => "The cart could not be saved".to_string(),
            Self::Config(err) => err.to_string(),
            Self::InvalidInput(msg) => msg.clone(),
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added product", Some(&[("code", "3017620422003")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use food_explorer_core::ProductCodeError;

    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::InvalidInput("count must be a number".to_string());
        assert_eq!(err.to_string(), "Invalid input: count must be a number");

        let err = AppError::from(CatalogError::NotFound("123".to_string()));
        assert_eq!(err.to_string(), "Catalog error: Not found: 123");
    }

    #[test]
    fn test_user_messages_distinguish_not_found_from_upstream() {
        let not_found = AppError::from(CatalogError::NotFound("123".to_string()));
        assert_eq!(not_found.user_message(), "Product not found");

        let upstream = AppError::from(CatalogError::Status {
            status: 502,
            body: String::new(),
        });
        assert_eq!(upstream.user_message(), "Could not reach the product catalog");

        let timeout = AppError::from(CatalogError::Timeout(Duration::from_secs(10)));
        assert_eq!(timeout.user_message(), "The catalog did not respond in time");

        let invalid = AppError::from(CatalogError::InvalidCode(ProductCodeError::Empty));
        assert!(invalid.user_message().starts_with("Invalid barcode"));
    }

    #[test]
    fn test_listing_failure_message() {
        let failure = FetchFailure::from(&CatalogError::RateLimited(3));
        let err = AppError::Listing(failure);
        assert_eq!(err.user_message(), "Could not reach the product catalog");
        assert_eq!(
            err.to_string(),
            "Listing error: Rate limited, retry after 3 seconds"
        );
    }

    #[test]
    fn test_persistence_message() {
        let err = AppError::from(PersistenceError::Io {
            path: "cart.json".into(),
            source: std::io::Error::other("disk full"),
        });
        assert_eq!(err.user_message(), "The cart could not be saved");
    }
}
