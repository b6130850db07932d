//! `kiln init` — project scaffolding command.
//!
//! Creates a new kiln project directory containing a starter `kiln.toml`
//! with a commented example step.

use std::fs;
use std::path::{Path, PathBuf};

/// Runs the `kiln init` command.
///
/// If `name` is `Some`, creates a new subdirectory with that name.
/// Otherwise initializes in the current working directory.
/// Returns exit code 0 on success.
pub fn run(name: Option<String>) -> Result<i32, Box<dyn std::error::Error>> {
    let project_dir = match &name {
        Some(n) => {
            let dir = PathBuf::from(n);
            if dir.exists() {
                return Err(format!("directory '{}' already exists", n).into());
            }
            fs::create_dir_all(&dir)?;
            dir
        }
        None => std::env::current_dir()?,
    };
    scaffold(&project_dir)
}

/// Writes the starter config into `project_dir`.
fn scaffold(project_dir: &Path) -> Result<i32, Box<dyn std::error::Error>> {
    let config_path = project_dir.join("kiln.toml");
    if config_path.exists() {
        return Err(format!("{} already exists", config_path.display()).into());
    }

    let project_name = project_dir
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("my_project");

    eprintln!("  Creating new kiln project `{project_name}`");

    fs::write(&config_path, config_template(project_name))?;

    eprintln!("     Created {}", config_path.display());

    Ok(0)
}

/// Renders the starter `kiln.toml` contents.
fn config_template(name: &str) -> String {
    format!(
        r#"[project]
name = "{name}"
version = "0.1.0"

[paths]
cache = ".cache"
output = "build"

# Steps run in declared order. A step with an `input` runs only when that
# input is newer than its cache marker; a step without one runs every build.
#
# [[steps]]
# name = "shaders"
# input = "shaders/shader.frag"
# command = ["glslc", "-o", "${{out_dir}}/shader.frag.spv", "${{input}}"]
"#
    )
}
