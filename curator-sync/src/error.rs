//! Error types for curator-sync.

use std::path::PathBuf;

use thiserror::Error;

use curator_core::error::RegistryError;
use curator_core::types::EntityId;

/// All errors that can arise from export/import operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The override document is structurally invalid.
    #[error("invalid override document at {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },

    /// YAML parse error on read, with file path context.
    #[error("failed to parse overrides at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A strict import named an entity the registry does not contain.
    #[error("import: entity not found: {entity_id}")]
    EntityNotFound { entity_id: EntityId },

    /// An error from the registry collaborator.
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML serialization error (write path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
