//! Common error types used throughout recipebox.
//!
//! Every layer funnels its failures into [`Error`], which carries enough
//! context for the HTTP layer to derive a status code via
//! [`Error::http_status`].

use std::fmt;

/// Which backing store a [`Error::Store`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    /// The relational database holding recipes and categories.
    Relational,
    /// The document database holding image metadata.
    Document,
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Relational => write!(f, "relational"),
            Self::Document => write!(f, "document"),
        }
    }
}

/// Common error type for recipebox.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed input: request body, path identifier, or multipart form.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// No relational row matches the requested identifier.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity (e.g. "recipe").
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// A uniqueness rule was violated.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A store operation failed for infrastructure reasons.
    #[error("{store} store error: {message}")]
    Store {
        /// The store that failed.
        store: StoreKind,
        /// Human-readable description of the failure.
        message: String,
    },

    /// An upload exceeded the accepted size.
    #[error("Payload too large: limit is {limit} bytes")]
    PayloadTooLarge {
        /// The maximum accepted size in bytes.
        limit: u64,
    },

    /// A local I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An internal error occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new Validation error.
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a new NotFound error.
    pub fn not_found(entity: impl Into<String>, id: impl fmt::Display) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Create a new Conflict error.
    pub fn conflict<S: Into<String>>(msg: S) -> Self {
        Self::Conflict(msg.into())
    }

    /// Create a Store error originating from the relational database.
    pub fn database<S: Into<String>>(msg: S) -> Self {
        Self::Store {
            store: StoreKind::Relational,
            message: msg.into(),
        }
    }

    /// Create a Store error originating from the document database.
    pub fn documents<S: Into<String>>(msg: S) -> Self {
        Self::Store {
            store: StoreKind::Document,
            message: msg.into(),
        }
    }

    /// Create a new Internal error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns true for infrastructure failures of the given store.
    pub fn is_store(&self, kind: StoreKind) -> bool {
        matches!(self, Self::Store { store, .. } if *store == kind)
    }

    /// Map this error to an HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::NotFound { .. } => 404,
            Self::Conflict(_) => 409,
            Self::PayloadTooLarge { .. } => 413,
            Self::Store { .. } | Self::Io(_) | Self::Internal(_) => 500,
        }
    }

    /// Stable machine-readable code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::NotFound { .. } => "not_found",
            Self::Conflict(_) => "conflict",
            Self::Store { .. } => "store_error",
            Self::PayloadTooLarge { .. } => "payload_too_large",
            Self::Io(_) => "io_error",
            Self::Internal(_) => "internal_error",
        }
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
