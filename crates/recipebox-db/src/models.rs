//! Rust structs mapping to database tables.
//!
//! Read models implement `from_row` for constructing themselves from a
//! `rusqlite::Row`. Write payloads (`New*`) are deserialized straight from
//! API request bodies.

use recipebox_common::{CategoryId, RecipeId};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ---------------------------------------------------------------------------
// Recipe
// ---------------------------------------------------------------------------

/// A recipe row without its owned rows or categories.
///
/// This is what listing returns; nested data is only loaded by
/// `queries::recipes::get_recipe`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RecipeSummary {
    #[schema(value_type = i64)]
    pub id: RecipeId,
    pub title: String,
    pub description: String,
    /// Preparation time in minutes.
    pub prep_time: i64,
    /// Cook time in minutes.
    pub cook_time: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl RecipeSummary {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: RecipeId::new(row.get(0)?),
            title: row.get(1)?,
            description: row.get(2)?,
            prep_time: row.get(3)?,
            cook_time: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }
}

/// A recipe with its ingredients, steps, and categories eagerly loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RecipeDetail {
    #[serde(flatten)]
    pub recipe: RecipeSummary,
    pub ingredients: Vec<Ingredient>,
    /// Ordered by step number, then insertion order.
    pub steps: Vec<Step>,
    pub categories: Vec<Category>,
}

// ---------------------------------------------------------------------------
// Ingredient / Step
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Ingredient {
    pub id: i64,
    #[schema(value_type = i64)]
    pub recipe_id: RecipeId,
    pub name: String,
    /// Free-form quantity text ("2 cups", "a pinch").
    pub quantity: String,
}

impl Ingredient {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            recipe_id: RecipeId::new(row.get(1)?),
            name: row.get(2)?,
            quantity: row.get(3)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Step {
    pub id: i64,
    #[schema(value_type = i64)]
    pub recipe_id: RecipeId,
    pub step_number: i32,
    pub instructions: String,
}

impl Step {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            recipe_id: RecipeId::new(row.get(1)?),
            step_number: row.get(2)?,
            instructions: row.get(3)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Category {
    #[schema(value_type = i64)]
    pub id: CategoryId,
    pub name: String,
    pub created_at: String,
}

impl Category {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: CategoryId::new(row.get(0)?),
            name: row.get(1)?,
            created_at: row.get(2)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Write payloads
// ---------------------------------------------------------------------------

/// Payload for creating a recipe together with its owned rows.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct NewRecipe {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub prep_time: u32,
    #[serde(default)]
    pub cook_time: u32,
    #[serde(default)]
    pub ingredients: Vec<NewIngredient>,
    #[serde(default)]
    pub steps: Vec<NewStep>,
    /// Existing categories to link. Unknown categories are rejected.
    #[serde(default)]
    pub categories: Vec<CategoryRef>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewIngredient {
    pub name: String,
    #[serde(default)]
    pub quantity: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewStep {
    pub step_number: i32,
    pub instructions: String,
}

/// Reference to an existing category, by id or by exact name.
///
/// Accepts `3`, `"Dessert"`, `{"id": 3}` or `{"name": "Dessert"}`. The
/// object keys may also be capitalised (`{"ID": 3}`, `{"Name": "Dessert"}`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum CategoryRef {
    Id(i64),
    Name(String),
    ById {
        #[serde(alias = "ID")]
        id: i64,
    },
    ByName {
        #[serde(alias = "Name")]
        name: String,
    },
}

/// Payload for creating a category.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewCategory {
    #[serde(alias = "Name")]
    pub name: String,
}
