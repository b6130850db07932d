//! Build step resolution.
//!
//! Turns the declared [`StepConfig`] entries into runnable [`BuildStep`]
//! values: paths are joined against the project root, command placeholders
//! expanded, and cache marker collisions rejected up front.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use kiln_cache::{marker_file_name, BuildInput};
use kiln_config::{ProjectConfig, StepConfig};

use crate::error::StepError;
use crate::template::{expand, TemplateVars};

/// A file a step produces, mirrored into the shared output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactCopy {
    /// Full path of the file the command produces.
    pub source: PathBuf,
    /// Destination inside the output directory.
    pub dest: PathBuf,
}

/// A fully resolved build step, ready for the runner.
#[derive(Debug, Clone)]
pub struct BuildStep {
    /// Step name from configuration.
    pub name: String,
    /// Staleness-checked input, if the step declares one. Steps without an
    /// input run on every invocation and leave no marker.
    pub input: Option<BuildInput>,
    /// Expanded argument vector; element 0 is the program.
    pub command: Vec<String>,
    /// Working directory for the command, if declared.
    pub cwd: Option<PathBuf>,
    /// Artifact copied into the output directory after success, if declared.
    pub artifact: Option<ArtifactCopy>,
}

/// Resolves every declared step against the project root.
///
/// Resolution is pure: no filesystem access happens here, so a broken
/// declaration is reported before any command runs. Fails if a command
/// placeholder cannot be expanded, if an artifact path does not name a file,
/// or if two steps' inputs flatten to the same cache marker.
pub fn resolve_steps(config: &ProjectConfig, root: &Path) -> Result<Vec<BuildStep>, StepError> {
    let out_dir = root.join(&config.paths.output);
    let mut steps = Vec::with_capacity(config.steps.len());
    for sc in &config.steps {
        steps.push(resolve_step(sc, root, &out_dir)?);
    }
    check_marker_collisions(&steps)?;
    Ok(steps)
}

/// Resolves a single step declaration.
fn resolve_step(sc: &StepConfig, root: &Path, out_dir: &Path) -> Result<BuildStep, StepError> {
    let input = sc
        .input
        .as_ref()
        .map(|decl| BuildInput::resolve(root, Path::new(decl)));

    let vars = TemplateVars {
        input: input.as_ref().map(|i| i.resolved()),
        out_dir,
        root,
    };
    let mut command = Vec::with_capacity(sc.command.len());
    for arg in &sc.command {
        let expanded = expand(arg, &vars).map_err(|reason| StepError::Template {
            step: sc.name.clone(),
            reason,
        })?;
        command.push(expanded);
    }

    let cwd = sc.cwd.as_ref().map(|c| root.join(c));

    let artifact = match &sc.artifact {
        Some(decl) => {
            let source = root.join(decl);
            let file_name = source.file_name().ok_or_else(|| StepError::ArtifactName {
                step: sc.name.clone(),
                path: PathBuf::from(decl),
            })?;
            Some(ArtifactCopy {
                dest: out_dir.join(file_name),
                source,
            })
        }
        None => None,
    };

    Ok(BuildStep {
        name: sc.name.clone(),
        input,
        command,
        cwd,
        artifact,
    })
}

/// Rejects step sets whose inputs flatten to the same marker file name.
///
/// The flattening substitutes `.` for path separators, so distinct declared
/// paths such as `a/b.txt` and `a.b.txt` would otherwise silently share one
/// staleness record.
fn check_marker_collisions(steps: &[BuildStep]) -> Result<(), StepError> {
    let mut seen: HashMap<String, &str> = HashMap::new();
    for step in steps {
        let Some(input) = &step.input else { continue };
        let marker = marker_file_name(input.declared());
        if let Some(first) = seen.insert(marker.clone(), &step.name) {
            return Err(StepError::MarkerCollision {
                first: first.to_string(),
                second: step.name.clone(),
                marker,
            });
        }
    }
    Ok(())
}
