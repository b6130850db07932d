//! Shared pipeline helpers for CLI commands.
//!
//! Contains the pieces `build`, `status`, and `clean` have in common:
//! project root resolution, configuration loading, and construction of the
//! staleness cache and resolved step list.

use std::path::{Path, PathBuf};

use kiln_cache::StalenessCache;
use kiln_config::ProjectConfig;
use kiln_step::BuildStep;

use crate::GlobalArgs;

/// Everything a command needs to operate on one project.
#[derive(Debug)]
pub struct Project {
    /// The directory containing `kiln.toml`.
    pub root: PathBuf,
    /// Parsed and validated configuration.
    pub config: ProjectConfig,
    /// Staleness cache rooted at the configured cache directory.
    pub cache: StalenessCache,
    /// Steps resolved against the project root, in declared order.
    pub steps: Vec<BuildStep>,
}

/// Loads the project the current invocation operates on.
pub fn load_project(global: &GlobalArgs) -> Result<Project, Box<dyn std::error::Error>> {
    let root = resolve_project_root(global)?;
    let config = kiln_config::load_config(&root)?;
    let cache = StalenessCache::new(root.join(&config.paths.cache));
    let steps = kiln_step::resolve_steps(&config, &root)?;
    Ok(Project {
        root,
        config,
        cache,
        steps,
    })
}

/// Walks up from `start` looking for the nearest directory containing `kiln.toml`.
///
/// Returns the directory containing `kiln.toml`, or an error if none is found.
pub fn find_project_root(start: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let mut current = start.to_path_buf();
    loop {
        if current.join("kiln.toml").exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(format!(
                "could not find kiln.toml in {} or any parent directory",
                start.display()
            )
            .into());
        }
    }
}

/// Resolves the project root directory from global CLI args.
///
/// If `--config` is specified, uses that path (file → parent dir, dir → itself).
/// Otherwise walks up from the current directory looking for `kiln.toml`.
pub fn resolve_project_root(global: &GlobalArgs) -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Some(ref config_path) = global.config {
        let p = PathBuf::from(config_path);
        if p.is_file() {
            Ok(p.parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| PathBuf::from(".")))
        } else {
            Ok(p)
        }
    } else {
        find_project_root(&std::env::current_dir()?)
    }
}
