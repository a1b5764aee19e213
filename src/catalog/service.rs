//! Recipe reads enriched with image paths, and the upload pipeline.
//!
//! Recipes come from the relational store; image paths come from the
//! document store, joined in memory by recipe id. Image lookups on reads are
//! best effort: when the document store fails the recipes are returned
//! without images. Uploads write the file first and the metadata second,
//! with no transaction spanning the two.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use recipebox_common::{Error, RecipeId, Result, StoreKind};
use recipebox_db::models::{Category, NewRecipe, RecipeDetail, RecipeSummary};
use serde::Serialize;
use utoipa::ToSchema;

use super::repository::RecipeRepository;
use crate::images::{BlobStore, ByteStream, ImageMetadataRepository, RecipeImage};

/// A recipe plus the path of its latest uploaded image, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeView<R> {
    #[serde(flatten)]
    pub recipe: R,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
}

/// Response body for a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct UploadedImage {
    pub message: String,
    /// Public path the file is served under.
    pub path: String,
}

pub struct RecipeService {
    recipes: Arc<dyn RecipeRepository>,
    images: Arc<dyn ImageMetadataRepository>,
    blobs: Arc<dyn BlobStore>,
    timeout: Duration,
    remove_orphaned_blobs: bool,
}

impl RecipeService {
    pub fn new(
        recipes: Arc<dyn RecipeRepository>,
        images: Arc<dyn ImageMetadataRepository>,
        blobs: Arc<dyn BlobStore>,
        timeout: Duration,
    ) -> Self {
        Self {
            recipes,
            images,
            blobs,
            timeout,
            remove_orphaned_blobs: true,
        }
    }

    /// Whether a stored file is deleted again when its metadata insert fails.
    pub fn with_orphan_cleanup(mut self, enabled: bool) -> Self {
        self.remove_orphaned_blobs = enabled;
        self
    }

    /// List recipes, optionally filtered by exact category name, each with
    /// its latest image path.
    ///
    /// Issues one relational query and at most one batched image lookup.
    pub async fn list_with_images(
        &self,
        category: Option<&str>,
    ) -> Result<Vec<RecipeView<RecipeSummary>>> {
        let recipes = self
            .bounded(StoreKind::Relational, self.recipes.list_recipes(category))
            .await?;
        if recipes.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<RecipeId> = recipes.iter().map(|r| r.id).collect();
        let lookup = self
            .bounded(StoreKind::Document, self.images.find_by_recipe_ids(&ids))
            .await;
        let mut paths: HashMap<RecipeId, String> = best_effort(lookup, "list");

        Ok(recipes
            .into_iter()
            .map(|recipe| RecipeView {
                image_path: paths.remove(&recipe.id),
                recipe,
            })
            .collect())
    }

    /// Fetch one recipe with its nested rows and latest image path.
    ///
    /// A missing recipe fails with [`Error::NotFound`] before the document
    /// store is consulted.
    pub async fn get_with_image(&self, id: RecipeId) -> Result<RecipeView<RecipeDetail>> {
        let recipe = self
            .bounded(StoreKind::Relational, self.recipes.get_recipe(id))
            .await?;

        let lookup = self
            .bounded(StoreKind::Document, self.images.find_one(id))
            .await;
        let image_path = best_effort(lookup, "get");

        Ok(RecipeView { recipe, image_path })
    }

    /// Store an uploaded file and record it as the image of `raw_id`.
    ///
    /// The recipe is not required to exist. If the metadata insert fails
    /// after the file was written, the file is removed again (unless cleanup
    /// is disabled) and a document store error is returned. An insert that
    /// times out also returns an error but keeps the file.
    pub async fn upload_image(
        &self,
        raw_id: &str,
        data: ByteStream<'_>,
        filename: &str,
    ) -> Result<UploadedImage> {
        let id: RecipeId = raw_id.parse()?;

        let path = self.blobs.store(data, filename).await?;

        let insert = self.images.insert(RecipeImage::new(id, path.clone()));
        match tokio::time::timeout(self.timeout, insert).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::error!(recipe_id = %id, path = %path, error = %e, "Failed to record image metadata");
                self.discard_blob(&path).await;
                return Err(match e {
                    Error::Store { .. } => e,
                    other => Error::documents(other.to_string()),
                });
            }
            // The document may still land after the deadline, so the file stays.
            Err(_) => {
                tracing::warn!(recipe_id = %id, path = %path, "Image metadata insert timed out, keeping upload");
                return Err(self.timed_out(StoreKind::Document));
            }
        }

        tracing::info!(recipe_id = %id, path = %path, "Image uploaded");
        Ok(UploadedImage {
            message: "Image uploaded successfully".to_string(),
            path,
        })
    }

    pub async fn create_recipe(&self, new: NewRecipe) -> Result<RecipeDetail> {
        let recipe = self
            .bounded(StoreKind::Relational, self.recipes.create_recipe(new))
            .await?;
        tracing::info!(recipe_id = %recipe.recipe.id, title = %recipe.recipe.title, "Recipe created");
        Ok(recipe)
    }

    pub async fn create_category(&self, name: &str) -> Result<Category> {
        self.bounded(StoreKind::Relational, self.recipes.create_category(name))
            .await
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>> {
        self.bounded(StoreKind::Relational, self.recipes.list_categories())
            .await
    }

    async fn discard_blob(&self, path: &str) {
        if !self.remove_orphaned_blobs {
            tracing::warn!(path, "Keeping orphaned upload");
            return;
        }
        match self.blobs.remove(path).await {
            Ok(()) => tracing::info!(path, "Removed orphaned upload"),
            Err(e) => tracing::warn!(path, error = %e, "Failed to remove orphaned upload"),
        }
    }

    /// Run a store call under the configured deadline.
    async fn bounded<T>(&self, store: StoreKind, call: impl Future<Output = Result<T>>) -> Result<T> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(self.timed_out(store)),
        }
    }

    fn timed_out(&self, store: StoreKind) -> Error {
        Error::Store {
            store,
            message: format!("timed out after {}s", self.timeout.as_secs_f32()),
        }
    }
}

/// Degrade a failed image lookup to "no images".
fn best_effort<T: Default>(lookup: Result<T>, operation: &str) -> T {
    lookup.unwrap_or_else(|e| {
        tracing::warn!(operation, error = %e, "Image lookup failed, continuing without images");
        T::default()
    })
}
