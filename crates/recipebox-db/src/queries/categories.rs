//! Category create, list, and lookup operations.

use chrono::Utc;
use recipebox_common::{CategoryId, Error, RecipeId, Result};
use rusqlite::{Connection, ErrorCode};

use crate::models::Category;

const COLS: &str = "id, name, created_at";

/// Create a new category.
///
/// Names are trimmed and must be non-empty. Names are unique
/// (case-sensitive); a duplicate yields [`Error::Conflict`].
pub fn create_category(conn: &Connection, name: &str) -> Result<Category> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::validation("Category name must not be empty"));
    }
    let now = Utc::now().to_rfc3339();

    conn.execute(
        "INSERT INTO categories (name, created_at) VALUES (?1, ?2)",
        rusqlite::params![name, &now],
    )
    .map_err(|e| match e {
        rusqlite::Error::SqliteFailure(ref f, _) if f.code == ErrorCode::ConstraintViolation => {
            Error::conflict(format!("Category already exists: {name}"))
        }
        e => Error::database(e.to_string()),
    })?;

    Ok(Category {
        id: CategoryId::new(conn.last_insert_rowid()),
        name: name.to_string(),
        created_at: now,
    })
}

/// List all categories in creation order.
pub fn list_categories(conn: &Connection) -> Result<Vec<Category>> {
    let q = format!("SELECT {COLS} FROM categories ORDER BY id");
    let mut stmt = conn.prepare(&q).map_err(|e| Error::database(e.to_string()))?;
    let rows = stmt
        .query_map([], Category::from_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(rows)
}

/// Get a category by ID.
pub fn get_category(conn: &Connection, id: CategoryId) -> Result<Option<Category>> {
    let q = format!("SELECT {COLS} FROM categories WHERE id = ?1");
    match conn.query_row(&q, [id.get()], Category::from_row) {
        Ok(c) => Ok(Some(c)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// Get a category by its exact name.
pub fn get_category_by_name(conn: &Connection, name: &str) -> Result<Option<Category>> {
    let q = format!("SELECT {COLS} FROM categories WHERE name = ?1");
    match conn.query_row(&q, [name], Category::from_row) {
        Ok(c) => Ok(Some(c)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// List the categories linked to a recipe through the pivot table.
pub fn list_categories_for_recipe(conn: &Connection, recipe_id: RecipeId) -> Result<Vec<Category>> {
    let mut stmt = conn
        .prepare(
            "SELECT c.id, c.name, c.created_at
             FROM categories c
             JOIN recipe_categories rc ON rc.category_id = c.id
             WHERE rc.recipe_id = ?1
             ORDER BY c.name",
        )
        .map_err(|e| Error::database(e.to_string()))?;
    let rows = stmt
        .query_map([recipe_id.get()], Category::from_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(rows)
}
