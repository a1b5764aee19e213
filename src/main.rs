mod cli;

use recipebox::{
    catalog::{RecipeService, SqliteRecipeRepository},
    config::{self, Config, DocumentBackend},
    images::{ImageMetadataRepository, LocalBlobStore, MemoryImageRepository, MongoImageRepository},
    server,
};
use recipebox_db::pool::init_pool;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::sync::Arc;
use std::time::Duration;

async fn start_server(
    host: Option<String>,
    port: Option<u16>,
    config_path: Option<&std::path::Path>,
) -> Result<()> {
    let mut config = config::load_config_or_default(config_path)?;

    // Override host/port from CLI if specified
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    tracing::info!("Starting recipebox server");

    let db_path = config.database.path.to_string_lossy().into_owned();
    tracing::info!("Initializing database at {}", db_path);
    let db_pool = init_pool(&db_path)?;

    let images = connect_documents(&config).await?;

    let blobs = LocalBlobStore::new(
        &config.uploads.dir,
        &config.uploads.public_prefix,
        config.uploads.max_bytes,
    )
    .with_context(|| format!("Failed to prepare upload directory {:?}", config.uploads.dir))?;
    tracing::info!("Storing uploads in {:?}", blobs.dir());

    let service = RecipeService::new(
        Arc::new(SqliteRecipeRepository::new(db_pool)),
        images,
        Arc::new(blobs),
        Duration::from_secs(config.stores.timeout_secs),
    )
    .with_orphan_cleanup(config.uploads.remove_orphaned_blobs);

    server::start_server(config, Arc::new(service)).await
}

async fn connect_documents(config: &Config) -> Result<Arc<dyn ImageMetadataRepository>> {
    let documents = &config.documents;
    match documents.backend {
        DocumentBackend::Mongo => {
            // Presence is checked by config validation.
            let uri = documents.uri.as_deref().unwrap_or_default();
            let database = documents.database.as_deref().unwrap_or_default();

            let timeout = Duration::from_secs(config.stores.timeout_secs);
            let repo = tokio::time::timeout(
                timeout,
                MongoImageRepository::connect(uri, database, &documents.collection),
            )
            .await
            .context("Timed out connecting to the document store")?
            .context("Failed to connect to the document store")?;
            Ok(Arc::new(repo))
        }
        DocumentBackend::Memory => {
            tracing::warn!("Using in-memory image metadata; uploads are forgotten on restart");
            Ok(Arc::new(MemoryImageRepository::new()))
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "recipebox=trace,recipebox_db=debug,tower_http=debug".to_string()
        } else {
            "recipebox=debug,recipebox_db=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Start { host, port } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, cli.config.as_deref()))
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("recipebox {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn validate_config(path: Option<&std::path::Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            config::load_config(p)?
        }
        None => {
            println!("No config file specified, checking default locations");
            config::load_config_or_default(None)?
        }
    };

    println!("✓ Configuration is valid");
    println!("  Server: {}:{}", config.server.host, config.server.port);
    println!("  Database: {}", config.database.path.display());
    println!(
        "  Documents: {:?} (collection {:?})",
        config.documents.backend, config.documents.collection
    );
    println!(
        "  Uploads: {} -> {} (max {} bytes)",
        config.uploads.dir.display(),
        config.uploads.public_prefix,
        config.uploads.max_bytes
    );
    println!("  Store timeout: {}s", config.stores.timeout_secs);

    Ok(())
}
