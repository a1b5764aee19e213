//! Database query modules.
//!
//! - recipes: recipe graph creation, summary listing, and full lookup
//! - categories: category CRUD and pivot lookups

pub mod categories;
pub mod recipes;
