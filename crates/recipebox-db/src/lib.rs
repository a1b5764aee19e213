//! Recipebox-DB: Database schema, migrations, and query operations
//!
//! This crate provides the relational store for recipebox using SQLite
//! with rusqlite and r2d2 connection pooling.
//!
//! # Modules
//!
//! - `migrations` - Database schema migrations
//! - `pool` - Connection pool management
//! - `models` - Rust models matching database schema
//! - `queries` - Database query operations
//!
//! # Example
//!
//! ```
//! use recipebox_db::pool::{get_conn, init_memory_pool};
//! use recipebox_db::queries::categories;
//!
//! let pool = init_memory_pool().unwrap();
//! let conn = get_conn(&pool).unwrap();
//!
//! let category = categories::create_category(&conn, "Dessert").unwrap();
//! assert_eq!(category.name, "Dessert");
//! ```

pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;
