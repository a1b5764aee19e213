//! Recipebox-Common: Shared types and utilities.
//!
//! - **Typed IDs**: integer newtypes for recipes and categories
//! - **Error Handling**: the error taxonomy shared by every store and the API
//!
//! # Examples
//!
//! ```
//! use recipebox_common::{Error, RecipeId, Result};
//!
//! let id: RecipeId = "7".parse().unwrap();
//! assert_eq!(id.get(), 7);
//!
//! fn lookup() -> Result<()> {
//!     Err(Error::not_found("recipe", 7))
//! }
//! assert!(lookup().is_err());
//! ```

pub mod error;
pub mod ids;

pub use error::{Error, Result, StoreKind};
pub use ids::*;
