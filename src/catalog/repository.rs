//! Relational access to recipes and categories.

use async_trait::async_trait;
use recipebox_common::{Error, RecipeId, Result};
use recipebox_db::models::{Category, NewRecipe, RecipeDetail, RecipeSummary};
use recipebox_db::pool::{get_conn, DbPool, PooledConnection};
use recipebox_db::queries::{categories, recipes};

/// Recipe and category operations against the relational store.
#[async_trait]
pub trait RecipeRepository: Send + Sync {
    /// Insert a recipe with its ingredients, steps, and category links in one
    /// transaction.
    async fn create_recipe(&self, new: NewRecipe) -> Result<RecipeDetail>;

    /// Recipes ordered by id. A non-empty `category` keeps only recipes
    /// linked to a category with exactly that name.
    async fn list_recipes(&self, category: Option<&str>) -> Result<Vec<RecipeSummary>>;

    /// A recipe with its nested rows, or [`Error::NotFound`].
    async fn get_recipe(&self, id: RecipeId) -> Result<RecipeDetail>;

    async fn create_category(&self, name: &str) -> Result<Category>;

    async fn list_categories(&self) -> Result<Vec<Category>>;
}

/// [`RecipeRepository`] over the SQLite pool.
///
/// rusqlite is synchronous, so each call runs on the blocking thread pool.
#[derive(Clone)]
pub struct SqliteRecipeRepository {
    pool: DbPool,
}

impl SqliteRecipeRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&PooledConnection) -> Result<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = get_conn(&pool)?;
            f(&conn)
        })
        .await
        .map_err(|e| Error::internal(format!("Database task failed: {e}")))?
    }
}

#[async_trait]
impl RecipeRepository for SqliteRecipeRepository {
    async fn create_recipe(&self, new: NewRecipe) -> Result<RecipeDetail> {
        self.with_conn(move |conn| recipes::create_recipe(conn, &new))
            .await
    }

    async fn list_recipes(&self, category: Option<&str>) -> Result<Vec<RecipeSummary>> {
        let category = category.map(str::to_owned);
        self.with_conn(move |conn| recipes::list_recipes(conn, category.as_deref()))
            .await
    }

    async fn get_recipe(&self, id: RecipeId) -> Result<RecipeDetail> {
        self.with_conn(move |conn| {
            recipes::get_recipe(conn, id)?.ok_or_else(|| Error::not_found("recipe", id))
        })
        .await
    }

    async fn create_category(&self, name: &str) -> Result<Category> {
        let name = name.to_owned();
        self.with_conn(move |conn| categories::create_category(conn, &name))
            .await
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        self.with_conn(|conn| categories::list_categories(conn)).await
    }
}
