//! Store error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when loading or querying the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No module with this code has been loaded.
    #[error("module not found: {0}")]
    ModuleNotFound(String),

    /// Two loaded modules share a code.
    #[error("duplicate module code: {0}")]
    DuplicateModule(String),

    /// A data file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A completion-records file is not valid JSON of the expected shape.
    #[error("invalid records file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
