//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`], which wires a [`RecipeService`] over an
//! in-memory SQLite pool, an in-memory image repository, and a temporary
//! upload directory, then starts Axum on a random port.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use recipebox::catalog::{RecipeService, SqliteRecipeRepository};
use recipebox::config::{Config, DocumentBackend};
use recipebox::images::{ImageMetadataRepository, LocalBlobStore, MemoryImageRepository};
use recipebox::server::{create_router, AppContext};
use recipebox_db::pool::{init_memory_pool, DbPool};
use serde_json::{json, Value};

pub struct TestHarness {
    pub addr: SocketAddr,
    pub db: DbPool,
    pub images: Arc<MemoryImageRepository>,
    pub uploads_dir: PathBuf,
    pub client: reqwest::Client,
    _tmp: tempfile::TempDir,
}

impl TestHarness {
    /// Start a server with default configuration.
    pub async fn start() -> Self {
        Self::start_with(|_| {}).await
    }

    /// Start a server after letting `configure` adjust the config.
    pub async fn start_with(configure: impl FnOnce(&mut Config)) -> Self {
        let images = Arc::new(MemoryImageRepository::new());
        Self::start_with_images(configure, images.clone(), images).await
    }

    /// Start a server whose service talks to `repo` for image metadata.
    ///
    /// `images` is kept on the harness for inspection and may be the same
    /// repository.
    pub async fn start_with_images(
        configure: impl FnOnce(&mut Config),
        repo: Arc<dyn ImageMetadataRepository>,
        images: Arc<MemoryImageRepository>,
    ) -> Self {
        let tmp = tempfile::tempdir().expect("failed to create temp dir");
        let uploads_dir = tmp.path().join("uploads");

        let mut config = Config::default();
        config.documents.backend = DocumentBackend::Memory;
        config.uploads.dir = uploads_dir.clone();
        configure(&mut config);

        let db = init_memory_pool().expect("failed to create in-memory pool");
        let blobs = LocalBlobStore::new(
            &config.uploads.dir,
            &config.uploads.public_prefix,
            config.uploads.max_bytes,
        )
        .expect("failed to create upload dir");

        let service = RecipeService::new(
            Arc::new(SqliteRecipeRepository::new(db.clone())),
            repo,
            Arc::new(blobs),
            Duration::from_secs(config.stores.timeout_secs),
        )
        .with_orphan_cleanup(config.uploads.remove_orphaned_blobs);

        let app = create_router(AppContext {
            service: Arc::new(service),
            config: Arc::new(config),
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self {
            addr,
            db,
            images,
            uploads_dir,
            client: reqwest::Client::new(),
            _tmp: tmp,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Get a database connection from the pool.
    pub fn conn(&self) -> recipebox_db::pool::PooledConnection {
        recipebox_db::pool::get_conn(&self.db).expect("failed to get db connection")
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client.get(self.url(path)).send().await.unwrap()
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .unwrap()
    }

    /// Create a category and return its id.
    pub async fn create_category(&self, name: &str) -> i64 {
        let resp = self
            .post_json("/api/v1/categories", &json!({ "name": name }))
            .await;
        assert_eq!(resp.status(), 201, "creating category {name}");
        resp.json::<Value>().await.unwrap()["id"].as_i64().unwrap()
    }

    /// Create a recipe linked to `categories` (by name) and return its id.
    pub async fn create_recipe(&self, title: &str, categories: &[&str]) -> i64 {
        let resp = self
            .post_json(
                "/api/v1/recipes",
                &json!({ "title": title, "categories": categories }),
            )
            .await;
        assert_eq!(resp.status(), 201, "creating recipe {title}");
        resp.json::<Value>().await.unwrap()["id"].as_i64().unwrap()
    }

    /// Upload `data` as the `image` field for the recipe at `id`.
    pub async fn upload(&self, id: &str, filename: &str, data: Vec<u8>) -> reqwest::Response {
        let part = reqwest::multipart::Part::bytes(data).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new().part("image", part);
        self.client
            .post(self.url(&format!("/api/v1/recipes/{id}/upload")))
            .multipart(form)
            .send()
            .await
            .unwrap()
    }

    /// Names of the files currently in the upload directory.
    pub fn uploaded_files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(&self.uploads_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}
