//! Image metadata kept in the document store.
//!
//! Each upload appends one [`RecipeImage`] document to the `images`
//! collection. Documents point at recipes through `recipe_sql_id`, a soft
//! reference that is never checked against the relational store. When a
//! recipe has several documents the most recent one wins.

use std::collections::HashMap;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::options::{ClientOptions, FindOneOptions, FindOptions};
use mongodb::{Client, Collection};
use recipebox_common::{Error, RecipeId, Result};
use serde::{Deserialize, Serialize};

/// One stored image document.
///
/// Field names are the persisted document format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeImage {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub recipe_sql_id: i64,
    pub image_path: String,
    /// Missing on documents written before uploads were timestamped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_at: Option<DateTime>,
}

impl RecipeImage {
    /// A new document for `recipe_id`, stamped with the current time.
    ///
    /// The stamp is taken when the upload finishes writing its file, before
    /// the insert is sent.
    pub fn new(recipe_id: RecipeId, image_path: impl Into<String>) -> Self {
        Self {
            id: None,
            recipe_sql_id: recipe_id.get(),
            image_path: image_path.into(),
            uploaded_at: Some(DateTime::now()),
        }
    }

    fn recency(&self) -> (Option<DateTime>, Option<ObjectId>) {
        (self.uploaded_at, self.id)
    }
}

/// Lookup and append operations on image metadata.
#[async_trait]
pub trait ImageMetadataRepository: Send + Sync {
    /// Latest image path for each of `ids` that has at least one document.
    ///
    /// Ids without documents are absent from the map. Empty input returns an
    /// empty map without touching the store.
    async fn find_by_recipe_ids(&self, ids: &[RecipeId]) -> Result<HashMap<RecipeId, String>>;

    /// Latest image path for one recipe, or `None` when it has no documents.
    async fn find_one(&self, id: RecipeId) -> Result<Option<String>>;

    /// Append a document. Existing documents are never replaced.
    async fn insert(&self, image: RecipeImage) -> Result<()>;
}

/// Fold documents into a map of recipe id to latest image path.
///
/// Documents are ordered by `(uploaded_at, _id)` before folding, so later
/// uploads overwrite earlier ones regardless of input order.
///
/// "Later" means a later `uploaded_at`, which is stamped by the uploading
/// request and not by the store. Two concurrent uploads for one recipe are
/// decided by which finished writing its file last, even when the other
/// document reached the store afterwards.
pub fn latest_paths(docs: impl IntoIterator<Item = RecipeImage>) -> HashMap<RecipeId, String> {
    let mut docs: Vec<RecipeImage> = docs.into_iter().collect();
    docs.sort_by_key(RecipeImage::recency);

    let mut paths = HashMap::with_capacity(docs.len());
    for doc in docs {
        paths.insert(RecipeId::new(doc.recipe_sql_id), doc.image_path);
    }
    paths
}

fn ids_filter(ids: &[RecipeId]) -> Document {
    let raw: Vec<i64> = ids.iter().map(|id| id.get()).collect();
    doc! { "recipe_sql_id": { "$in": raw } }
}

fn mongo_err(e: mongodb::error::Error) -> Error {
    Error::documents(e.to_string())
}

/// [`ImageMetadataRepository`] backed by a MongoDB collection.
#[derive(Debug, Clone)]
pub struct MongoImageRepository {
    collection: Collection<RecipeImage>,
}

impl MongoImageRepository {
    /// Connect to `uri` and verify the server answers a ping.
    pub async fn connect(uri: &str, database: &str, collection: &str) -> Result<Self> {
        let options = ClientOptions::parse(uri).await.map_err(mongo_err)?;
        let client = Client::with_options(options).map_err(mongo_err)?;
        let db = client.database(database);

        db.run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(mongo_err)?;
        tracing::info!(database, collection, "Connected to document store");

        Ok(Self {
            collection: db.collection(collection),
        })
    }
}

#[async_trait]
impl ImageMetadataRepository for MongoImageRepository {
    async fn find_by_recipe_ids(&self, ids: &[RecipeId]) -> Result<HashMap<RecipeId, String>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let options = FindOptions::builder()
            .sort(doc! { "uploaded_at": 1, "_id": 1 })
            .build();
        let docs: Vec<RecipeImage> = self
            .collection
            .find(ids_filter(ids), options)
            .await
            .map_err(mongo_err)?
            .try_collect()
            .await
            .map_err(mongo_err)?;

        Ok(latest_paths(docs))
    }

    async fn find_one(&self, id: RecipeId) -> Result<Option<String>> {
        let options = FindOneOptions::builder()
            .sort(doc! { "uploaded_at": -1, "_id": -1 })
            .build();
        let doc = self
            .collection
            .find_one(doc! { "recipe_sql_id": id.get() }, options)
            .await
            .map_err(mongo_err)?;

        Ok(doc.map(|d| d.image_path))
    }

    async fn insert(&self, image: RecipeImage) -> Result<()> {
        self.collection
            .insert_one(image, None)
            .await
            .map_err(mongo_err)?;
        Ok(())
    }
}
