//! Error types for cache operations.

use std::path::PathBuf;

/// Errors that can occur during staleness checks and marker maintenance.
///
/// All of these are fatal to a build: the orchestrator stops at the first
/// failing step rather than continuing with a cache in an unknown state.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// A declared build input does not exist on the filesystem.
    #[error("build input not found: {path}")]
    MissingInput {
        /// The resolved input path that was checked.
        path: PathBuf,
    },

    /// An I/O error occurred while reading or writing marker files.
    #[error("cache I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}
