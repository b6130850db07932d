//! Configuration types deserialized from `kiln.toml`.

use serde::Deserialize;

/// The top-level project configuration parsed from `kiln.toml`.
///
/// Contains project metadata, the cache and output directory layout, and the
/// ordered list of build steps.
#[derive(Debug, Deserialize)]
pub struct ProjectConfig {
    /// Core project metadata (name, version).
    pub project: ProjectMeta,
    /// Cache and output directory layout.
    #[serde(default)]
    pub paths: PathsConfig,
    /// Build steps, executed in declaration order.
    #[serde(default)]
    pub steps: Vec<StepConfig>,
}

/// Core project metadata required in every `kiln.toml`.
#[derive(Debug, Deserialize)]
pub struct ProjectMeta {
    /// The project name.
    pub name: String,
    /// The project version string.
    #[serde(default)]
    pub version: String,
    /// A brief description of the project.
    #[serde(default)]
    pub description: String,
}

/// Directory layout for cache markers and build outputs.
///
/// Both paths are interpreted relative to the project root and created on
/// demand; neither has to exist before a build.
#[derive(Debug, Deserialize)]
pub struct PathsConfig {
    /// Directory holding the staleness marker files.
    #[serde(default = "default_cache_dir")]
    pub cache: String,
    /// Directory where finished artifacts are collected.
    #[serde(default = "default_output_dir")]
    pub output: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            cache: default_cache_dir(),
            output: default_output_dir(),
        }
    }
}

fn default_cache_dir() -> String {
    ".cache".to_string()
}

fn default_output_dir() -> String {
    "build".to_string()
}

/// A single declared build step.
#[derive(Debug, Deserialize)]
pub struct StepConfig {
    /// Step name, unique within the project.
    pub name: String,
    /// Input file or directory watched for staleness, relative to the project
    /// root. Steps without an input run on every invocation.
    #[serde(default)]
    pub input: Option<String>,
    /// Argument vector for the external command; element 0 is the program.
    /// Elements may reference `${input}`, `${out_dir}`, and `${root}`.
    pub command: Vec<String>,
    /// Working directory for the command, relative to the project root.
    #[serde(default)]
    pub cwd: Option<String>,
    /// File the command produces, copied into the output directory after a
    /// successful run. Relative to the project root.
    #[serde(default)]
    pub artifact: Option<String>,
}
