mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./config.toml",
        "./recipebox.toml",
        "~/.config/recipebox/config.toml",
        "/etc/recipebox/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    let mut config = Config::default();
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config)?;
    Ok(config)
}

/// Apply environment overrides on top of file values.
///
/// `lookup` is `std::env::var` in production; tests pass a map.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = lookup("RECIPEBOX_DATABASE_PATH") {
        config.database.path = PathBuf::from(path);
    }
    if let Some(uri) = lookup("MONGO_URI") {
        config.documents.uri = Some(uri);
    }
    if let Some(db) = lookup("MONGO_DB_NAME") {
        config.documents.database = Some(db);
    }
    if let Some(dir) = lookup("RECIPEBOX_UPLOADS_DIR") {
        config.uploads.dir = PathBuf::from(dir);
    }
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    if config.uploads.max_bytes == 0 {
        anyhow::bail!("uploads.max_bytes must be greater than 0");
    }

    let prefix = &config.uploads.public_prefix;
    if !prefix.starts_with('/') || prefix.trim_end_matches('/').is_empty() {
        anyhow::bail!("uploads.public_prefix must be a path below '/': {:?}", prefix);
    }

    if config.stores.timeout_secs == 0 {
        anyhow::bail!("stores.timeout_secs must be greater than 0");
    }

    if config.documents.backend == DocumentBackend::Mongo {
        let missing = |v: &Option<String>| v.as_deref().map_or(true, str::is_empty);
        if missing(&config.documents.uri) || missing(&config.documents.database) {
            anyhow::bail!(
                "The mongo document backend needs documents.uri and documents.database \
                 (or MONGO_URI and MONGO_DB_NAME)"
            );
        }
    }

    Ok(())
}
