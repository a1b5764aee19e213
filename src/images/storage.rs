//! Filesystem-level storage for uploaded image bytes.
//!
//! Files are written under a single directory with generated UUID names, so
//! names are unguessable from recipe ids and never collide across concurrent
//! uploads. Bytes are streamed to a hidden `.part` file and only renamed into
//! place once the whole payload has been accepted.

use std::path::{Path, PathBuf};
use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use recipebox_common::{Error, Result};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// A stream of uploaded chunks.
pub type ByteStream<'a> = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send + 'a>>;

/// Durable storage for uploaded files.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Write the full stream under a freshly generated name and return its
    /// public path.
    async fn store(&self, data: ByteStream<'_>, original_filename: &str) -> Result<String>;

    /// Delete a file previously returned by [`BlobStore::store`].
    async fn remove(&self, public_path: &str) -> Result<()>;
}

/// [`BlobStore`] backed by a local directory.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    dir: PathBuf,
    public_prefix: String,
    max_bytes: u64,
}

impl LocalBlobStore {
    /// Create the store, creating `dir` if it does not exist.
    pub fn new(dir: impl Into<PathBuf>, public_prefix: &str, max_bytes: u64) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            public_prefix: public_prefix.trim_end_matches('/').to_string(),
            max_bytes,
        })
    }

    /// The directory files are written to.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn public_path(&self, filename: &str) -> String {
        format!("{}/{}", self.public_prefix, filename)
    }

    /// Map a public path back to a file inside the store directory.
    fn resolve(&self, public_path: &str) -> Result<PathBuf> {
        let name = public_path
            .strip_prefix(&self.public_prefix)
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(|| Error::validation(format!("Not an upload path: {public_path}")))?;

        if name.is_empty() || name.starts_with('.') || name.contains(['/', '\\']) {
            return Err(Error::validation(format!("Not an upload path: {public_path}")));
        }
        Ok(self.dir.join(name))
    }

    async fn write_part(&self, part: &Path, mut data: ByteStream<'_>) -> Result<u64> {
        let mut file = tokio::fs::File::create(part).await?;
        let mut written: u64 = 0;

        while let Some(chunk) = data.next().await {
            let chunk = chunk?;
            written += chunk.len() as u64;
            if written > self.max_bytes {
                return Err(Error::PayloadTooLarge {
                    limit: self.max_bytes,
                });
            }
            file.write_all(&chunk).await?;
        }

        file.flush().await?;
        file.sync_all().await?;
        Ok(written)
    }

    /// Move a finished `.part` file to its final name.
    async fn commit(&self, part: &Path, filename: &str) -> Result<()> {
        if let Err(e) = tokio::fs::rename(part, self.dir.join(filename)).await {
            discard_part(part).await;
            return Err(e.into());
        }
        Ok(())
    }
}

async fn discard_part(part: &Path) {
    if let Err(e) = tokio::fs::remove_file(part).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(path = %part.display(), error = %e, "Failed to remove partial upload");
        }
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn store(&self, data: ByteStream<'_>, original_filename: &str) -> Result<String> {
        let filename = generate_filename(original_filename);
        let part = self.dir.join(format!(".{filename}.part"));

        let written = match self.write_part(&part, data).await {
            Ok(n) => n,
            Err(e) => {
                discard_part(&part).await;
                return Err(e);
            }
        };

        self.commit(&part, &filename).await?;

        tracing::debug!(file = %filename, bytes = written, "Stored upload");
        Ok(self.public_path(&filename))
    }

    async fn remove(&self, public_path: &str) -> Result<()> {
        let path = self.resolve(public_path)?;
        tokio::fs::remove_file(&path).await?;
        Ok(())
    }
}

/// Generate a unique file name, keeping a sane extension from the original.
///
/// The extension survives when it is 1-16 ASCII alphanumerics; it is
/// lower-cased. Anything else is dropped.
fn generate_filename(original: &str) -> String {
    let id = Uuid::new_v4();
    match extension(original) {
        Some(ext) => format!("{id}.{ext}"),
        None => id.to_string(),
    }
}

fn extension(original: &str) -> Option<String> {
    let ext = Path::new(original).extension()?.to_str()?;
    let valid = !ext.is_empty() && ext.len() <= 16 && ext.chars().all(|c| c.is_ascii_alphanumeric());
    valid.then(|| ext.to_ascii_lowercase())
}

/// Wrap an in-memory buffer as a single-chunk [`ByteStream`].
pub fn bytes_stream(data: impl Into<Bytes>) -> ByteStream<'static> {
    let data: Bytes = data.into();
    Box::pin(futures::stream::once(std::future::ready(Ok::<_, Error>(data))))
}
