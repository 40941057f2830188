//! Food Explorer library.
//!
//! Browse, search and filter the Open Food Facts catalog and keep a locally
//! persisted cart of selected products.
//!
//! # Components
//!
//! - [`catalog`] - HTTP client for the catalog and normalization of raw records
//! - [`categories`] - Fetch-once directory of filter categories
//! - [`view`] - Listing controller: query mode, page accumulation, sorting
//! - [`cart`] - Write-through persisted cart store
//! - [`state`] - Application state wiring the above together
//!
//! # Example
//!
//! ```rust,ignore
//! use food_explorer::{config::ExplorerConfig, state::AppState};
//!
//! let state = AppState::new(ExplorerConfig::from_env()?)?;
//!
//! let mut view = state.catalog_view();
//! view.set_query_text("chocolate");
//! view.refresh().await;
//!
//! let product = view.products()[0].clone();
//! state.cart().add(product)?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod categories;
pub mod config;
pub mod error;
pub mod state;
pub mod view;
