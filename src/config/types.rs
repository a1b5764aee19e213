use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub documents: DocumentStoreConfig,

    #[serde(default)]
    pub uploads: UploadsConfig,

    #[serde(default)]
    pub stores: StoresConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Origins allowed by CORS. `["*"]` allows any origin.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origins() -> Vec<String> {
    vec!["http://localhost:3000".to_string()]
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: default_cors_origins(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file
    #[serde(default = "default_database_path")]
    pub path: PathBuf,
}

fn default_database_path() -> PathBuf {
    PathBuf::from("recipebox.db")
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

/// Which implementation backs the image metadata repository.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentBackend {
    #[default]
    Mongo,
    /// In-process store; contents are lost on restart.
    Memory,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DocumentStoreConfig {
    #[serde(default)]
    pub backend: DocumentBackend,

    /// Connection string, e.g. `mongodb://localhost:27017`
    #[serde(default)]
    pub uri: Option<String>,

    #[serde(default)]
    pub database: Option<String>,

    #[serde(default = "default_collection")]
    pub collection: String,
}

fn default_collection() -> String {
    "images".to_string()
}

impl Default for DocumentStoreConfig {
    fn default() -> Self {
        Self {
            backend: DocumentBackend::default(),
            uri: None,
            database: None,
            collection: default_collection(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UploadsConfig {
    /// Directory uploaded files are written to
    #[serde(default = "default_uploads_dir")]
    pub dir: PathBuf,

    /// URL prefix the directory is served under
    #[serde(default = "default_public_prefix")]
    pub public_prefix: String,

    /// Largest accepted upload in bytes (default: 10 MiB)
    #[serde(default = "default_max_bytes")]
    pub max_bytes: u64,

    /// Delete a stored file again when its metadata could not be recorded
    #[serde(default = "default_remove_orphaned_blobs")]
    pub remove_orphaned_blobs: bool,
}

fn default_uploads_dir() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_public_prefix() -> String {
    "/uploads".to_string()
}

fn default_max_bytes() -> u64 {
    10 * 1024 * 1024
}

fn default_remove_orphaned_blobs() -> bool {
    true
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            dir: default_uploads_dir(),
            public_prefix: default_public_prefix(),
            max_bytes: default_max_bytes(),
            remove_orphaned_blobs: default_remove_orphaned_blobs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoresConfig {
    /// Deadline applied to every store call (default: 10)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for StoresConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}
