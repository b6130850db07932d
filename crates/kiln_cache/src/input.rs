//! Build inputs resolved against the project root.

use std::path::{Path, PathBuf};

/// A build input: the source file or directory a step is checked against.
///
/// Carries both the path as declared in configuration (relative to the
/// project root, used to derive the marker name) and the resolved path (used
/// for existence and mtime checks). Deriving marker names from the declared
/// form keeps the cache independent of where the project is checked out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInput {
    /// Path as written in `kiln.toml`.
    declared: PathBuf,
    /// Project-root-joined path used for filesystem access.
    resolved: PathBuf,
}

impl BuildInput {
    /// Resolves a declared path against the project root.
    ///
    /// An absolute declared path is kept as-is.
    pub fn resolve(root: &Path, declared: &Path) -> Self {
        Self {
            declared: declared.to_path_buf(),
            resolved: root.join(declared),
        }
    }

    /// The path as written in configuration.
    pub fn declared(&self) -> &Path {
        &self.declared
    }

    /// The full path used for filesystem checks.
    pub fn resolved(&self) -> &Path {
        &self.resolved
    }

    /// Returns `true` if the input exists on the filesystem.
    pub fn exists(&self) -> bool {
        self.resolved.exists()
    }
}
