//! Core types for Food Explorer.
//!
//! This module provides type-safe wrappers for the catalog and cart domain.

pub mod cart;
pub mod code;
pub mod grade;
pub mod product;
pub mod sort;

pub use cart::CartItem;
pub use code::{ProductCode, ProductCodeError};
pub use grade::NutritionGrade;
pub use product::{Nutriments, Product};
pub use sort::{SortKey, SortKeyError};
