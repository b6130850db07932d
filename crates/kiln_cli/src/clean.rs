//! `kiln clean` — drop every cache marker.

use crate::pipeline::load_project;
use crate::GlobalArgs;

/// Runs the `kiln clean` command.
///
/// Removes every marker under the cache directory so the next build treats
/// all cached steps as stale. Build outputs are untouched.
pub fn run(global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project = load_project(global)?;
    let removed = project.cache.clear()?;
    if !global.quiet {
        eprintln!("   Cleaned {removed} marker(s)");
    }
    Ok(0)
}
