//! In-process image metadata store.
//!
//! Used when `documents.backend = "memory"` and by tests. Contents are lost
//! when the process exits.

use std::collections::HashMap;

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use parking_lot::RwLock;
use recipebox_common::{RecipeId, Result};

use super::metadata::{latest_paths, ImageMetadataRepository, RecipeImage};

#[derive(Debug, Default)]
pub struct MemoryImageRepository {
    docs: RwLock<Vec<RecipeImage>>,
}

impl MemoryImageRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents, including superseded ones.
    pub fn len(&self) -> usize {
        self.docs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.read().is_empty()
    }
}

#[async_trait]
impl ImageMetadataRepository for MemoryImageRepository {
    async fn find_by_recipe_ids(&self, ids: &[RecipeId]) -> Result<HashMap<RecipeId, String>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let matching: Vec<RecipeImage> = self
            .docs
            .read()
            .iter()
            .filter(|d| ids.iter().any(|id| id.get() == d.recipe_sql_id))
            .cloned()
            .collect();
        Ok(latest_paths(matching))
    }

    async fn find_one(&self, id: RecipeId) -> Result<Option<String>> {
        let mut latest = self.find_by_recipe_ids(&[id]).await?;
        Ok(latest.remove(&id))
    }

    async fn insert(&self, mut image: RecipeImage) -> Result<()> {
        image.id.get_or_insert_with(ObjectId::new);
        self.docs.write().push(image);
        Ok(())
    }
}
