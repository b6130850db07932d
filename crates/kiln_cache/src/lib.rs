//! Mtime-based staleness cache for incremental rebuilds.
//!
//! This crate decides whether a build step must re-run by comparing a build
//! input's modification time against an empty marker file stamped at the
//! start of the last successful attempt. The markers are the entire persisted
//! state: creating one records an attempt, deleting one forces a rebuild.

#![warn(missing_docs)]

pub mod cache;
pub mod error;
pub mod input;

pub use cache::{marker_file_name, Staleness, StalenessCache};
pub use error::CacheError;
pub use input::BuildInput;
