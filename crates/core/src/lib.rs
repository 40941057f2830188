//! Food Explorer Core - Shared domain types.
//!
//! This crate provides the canonical types used across all Food Explorer
//! components:
//! - `food-explorer` - Catalog client, view controller and cart store
//! - `food-explorer-cli` - Command-line surface over the library
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no storage.
//! Normalization from raw catalog records happens at the client boundary;
//! everything in here is already fully populated.
//!
//! # Modules
//!
//! - [`types`] - Product codes, canonical products, nutrition grades, sort keys
//!   and cart line items

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
