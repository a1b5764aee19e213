//! Uploaded image bytes and their metadata.
//!
//! Bytes live in a [`BlobStore`]; the document store records which file
//! belongs to which recipe through an [`ImageMetadataRepository`].

mod memory;
mod metadata;
mod storage;

pub use memory::MemoryImageRepository;
pub use metadata::{latest_paths, ImageMetadataRepository, MongoImageRepository, RecipeImage};
pub use storage::{bytes_stream, BlobStore, ByteStream, LocalBlobStore};
