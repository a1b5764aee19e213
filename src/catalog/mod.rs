//! Recipe catalog: relational repository and the service that joins recipes
//! with their images.

mod repository;
mod service;

pub use repository::{RecipeRepository, SqliteRecipeRepository};
pub use service::{RecipeService, RecipeView, UploadedImage};
