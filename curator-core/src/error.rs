//! Error types for curator-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from registry snapshot operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Underlying I/O failure (file not found, permission denied, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error (write/save path).
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// JSON parse error on load — includes file path and position context.
    #[error("failed to parse registry snapshot at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The snapshot file did not exist at the expected path.
    #[error("registry snapshot not found at {path}")]
    SnapshotNotFound { path: PathBuf },

    /// An update named an entity the registry does not contain.
    #[error("no registry entry with id '{entity_id}'")]
    UnknownEntity { entity_id: String },
}
