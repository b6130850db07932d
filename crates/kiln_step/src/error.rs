//! Error types for step resolution and execution.

use std::path::PathBuf;

use kiln_cache::CacheError;

/// Errors from resolving or running build steps.
///
/// Every variant is fatal to the invocation: the orchestrator stops at the
/// failing step and surfaces the error through the process exit code.
#[derive(Debug, thiserror::Error)]
pub enum StepError {
    /// A command placeholder could not be expanded.
    #[error("step '{step}': {reason}")]
    Template {
        /// The step whose command failed to expand.
        step: String,
        /// What was wrong with the placeholder.
        reason: String,
    },

    /// An artifact path does not name a file.
    #[error("step '{step}': artifact path '{path}' has no file name")]
    ArtifactName {
        /// The step declaring the artifact.
        step: String,
        /// The offending artifact path.
        path: PathBuf,
    },

    /// Two steps' inputs flatten to the same cache marker.
    #[error("steps '{first}' and '{second}' share the cache marker '{marker}'")]
    MarkerCollision {
        /// Name of the step declared first.
        first: String,
        /// Name of the colliding step.
        second: String,
        /// The shared marker file name.
        marker: String,
    },

    /// A step's command vector is empty.
    #[error("step '{step}' has an empty command")]
    EmptyCommand {
        /// The step with no command.
        step: String,
    },

    /// A staleness check or marker write failed.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// The external command could not be started.
    #[error("step '{step}': failed to run '{program}': {source}")]
    Spawn {
        /// The step being run.
        step: String,
        /// The program that could not be started.
        program: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The external command ran and reported failure.
    ///
    /// By the time this is returned, every marker recorded during the
    /// invocation has been invalidated.
    #[error("step '{step}' failed with {}", exit_label(.code))]
    CommandFailed {
        /// The step whose command failed.
        step: String,
        /// The exit code, if the process exited normally.
        code: Option<i32>,
    },

    /// Copying a produced artifact failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

/// Formats an exit status for display.
fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit status {code}"),
        None => "no exit status (terminated by signal)".to_string(),
    }
}
