//! Marker-file staleness cache.
//!
//! The cache is a flat directory of empty marker files, one per build input.
//! A marker's mtime records when its input was last picked up for a build;
//! comparing it against the input's current mtime decides whether the owning
//! step must re-run. Marker presence and mtime are the whole persisted state.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::Serialize;

use crate::error::CacheError;
use crate::input::BuildInput;

/// Suffix appended to every marker file name.
const MARKER_SUFFIX: &str = ".cache";

/// Staleness classification for a single build input.
///
/// [`StalenessCache::must_rebuild`] collapses this to a boolean; status
/// reporting keeps the full category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Staleness {
    /// No marker exists: the input has never been built, or its last
    /// attempt failed and was invalidated.
    MissingMarker,
    /// The input was modified after its marker was written.
    InputNewer,
    /// The marker is at least as new as the input.
    Fresh,
}

/// Flattens a declared input path into its marker file name.
///
/// Every path separator is replaced with a literal `.` and the marker suffix
/// is appended, so `shaders/shader.frag` becomes `shaders.shader.frag.cache`.
/// The transform is a pure function of the declared path.
pub fn marker_file_name(declared: &Path) -> String {
    let flat: String = declared
        .to_string_lossy()
        .chars()
        .map(|c| if c == '/' || c == '\\' { '.' } else { c })
        .collect();
    format!("{flat}{MARKER_SUFFIX}")
}

/// Mtime-based staleness cache over a directory of marker files.
///
/// An explicit value rather than ambient process state: each instance owns
/// one marker directory, so several caches can coexist and tests can point
/// one at a scratch directory.
#[derive(Debug, Clone)]
pub struct StalenessCache {
    /// Directory holding the marker files.
    root: PathBuf,
}

impl StalenessCache {
    /// Creates a cache over the given marker directory.
    ///
    /// The directory itself is created lazily by [`record_attempt`](Self::record_attempt).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The marker directory this cache reads and writes.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The marker path for a build input.
    pub fn marker_path(&self, input: &BuildInput) -> PathBuf {
        self.root.join(marker_file_name(input.declared()))
    }

    /// Classifies an input as fresh or stale.
    ///
    /// Fails with [`CacheError::MissingInput`] if the input itself does not
    /// exist: a missing input is a broken project, not staleness.
    pub fn staleness(&self, input: &BuildInput) -> Result<Staleness, CacheError> {
        if !input.exists() {
            return Err(CacheError::MissingInput {
                path: input.resolved().to_path_buf(),
            });
        }
        let marker = self.marker_path(input);
        if !marker.exists() {
            return Ok(Staleness::MissingMarker);
        }
        if mtime(input.resolved())? > mtime(&marker)? {
            Ok(Staleness::InputNewer)
        } else {
            Ok(Staleness::Fresh)
        }
    }

    /// Returns `true` if the step owning this input must re-run.
    ///
    /// True when no marker exists or when the input's mtime is strictly
    /// newer than the marker's. Equal timestamps count as fresh.
    pub fn must_rebuild(&self, input: &BuildInput) -> Result<bool, CacheError> {
        Ok(self.staleness(input)? != Staleness::Fresh)
    }

    /// Records a build attempt for an input and returns the marker path.
    ///
    /// Creates (or truncates) the empty marker file, stamping it with the
    /// current time. Called immediately before the step's command runs; on
    /// success the marker survives as the record of the attempt's start, so
    /// input edits made while the command was running still show up as newer.
    pub fn record_attempt(&self, input: &BuildInput) -> Result<PathBuf, CacheError> {
        std::fs::create_dir_all(&self.root).map_err(|e| CacheError::Io {
            path: self.root.clone(),
            source: e,
        })?;
        let marker = self.marker_path(input);
        std::fs::File::create(&marker).map_err(|e| CacheError::Io {
            path: marker.clone(),
            source: e,
        })?;
        Ok(marker)
    }

    /// Deletes the given markers, forcing their inputs stale.
    ///
    /// Already-absent markers count as deleted. Called when a step's command
    /// fails, so the next invocation retries from the failed boundary.
    pub fn invalidate(&self, markers: &[PathBuf]) -> Result<(), CacheError> {
        for marker in markers {
            match std::fs::remove_file(marker) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(CacheError::Io {
                        path: marker.clone(),
                        source: e,
                    })
                }
            }
        }
        Ok(())
    }

    /// Removes every marker under the cache root.
    ///
    /// Returns the number of markers removed. A missing cache directory is
    /// an empty cache; files without the marker suffix are left alone.
    pub fn clear(&self) -> Result<usize, CacheError> {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => {
                return Err(CacheError::Io {
                    path: self.root.clone(),
                    source: e,
                })
            }
        };
        let mut removed = 0;
        for entry in entries {
            let path = entry
                .map_err(|e| CacheError::Io {
                    path: self.root.clone(),
                    source: e,
                })?
                .path();
            let is_marker = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(MARKER_SUFFIX));
            if is_marker && path.is_file() {
                std::fs::remove_file(&path).map_err(|e| CacheError::Io {
                    path: path.clone(),
                    source: e,
                })?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}

/// Reads a path's modification time.
fn mtime(path: &Path) -> Result<SystemTime, CacheError> {
    let io_err = |e| CacheError::Io {
        path: path.to_path_buf(),
        source: e,
    };
    std::fs::metadata(path)
        .map_err(io_err)?
        .modified()
        .map_err(io_err)
}
