//! # Store Error Types
//!
//! Error types for file store operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  std::io::Error / serde_json::Error                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreError (this module) ← Adds the file path                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  AppError (in register app) ← Code + message for the operator          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::{Path, PathBuf};
use thiserror::Error;

/// File store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing a file failed.
    ///
    /// ## When This Occurs
    /// - Data directory missing and can't be created
    /// - File permissions issue
    /// - Disk full
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A document exists but is not valid JSON for its type.
    ///
    /// Strict reads stop here so the file is never overwritten with an
    /// empty collection.
    #[error("Corrupt document {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A value could not be serialized.
    #[error("Serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Entity not found in the store.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique key already present.
    #[error("Duplicate {field}: '{value}' already exists")]
    Duplicate { field: String, value: String },
}

impl StoreError {
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn corrupt(path: impl AsRef<Path>, source: serde_json::Error) -> Self {
        StoreError::Corrupt {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Creates a NotFound error for a given entity type and key.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a Duplicate error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        StoreError::Duplicate {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
