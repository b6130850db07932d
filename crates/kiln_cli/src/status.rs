//! `kiln status` — report per-step staleness without running anything.
//!
//! A dry run of the build's skip logic: each step is classified against the
//! cache exactly as `kiln build` would see it, but no command is spawned and
//! no marker is touched. Missing inputs are reported as a state rather than
//! aborting, so a broken project can still be inspected.

use serde::Serialize;

use kiln_step::{step_state, StepState};

use crate::pipeline::load_project;
use crate::{GlobalArgs, ReportFormat, StatusArgs};

/// One row of the status report.
#[derive(Debug, Serialize)]
struct StatusEntry {
    name: String,
    state: StepState,
}

/// Runs the `kiln status` command.
///
/// Prints one line (or one JSON object) per step in declared order. Always
/// returns exit code 0; status never mutates the cache.
pub fn run(args: &StatusArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project = load_project(global)?;

    let mut entries = Vec::with_capacity(project.steps.len());
    for step in &project.steps {
        entries.push(StatusEntry {
            name: step.name.clone(),
            state: step_state(step, &project.cache)?,
        });
    }

    match args.format {
        ReportFormat::Text => {
            let width = entries.iter().map(|e| e.name.len()).max().unwrap_or(0);
            for entry in &entries {
                println!("{:width$}  {}", entry.name, describe(entry.state));
            }
        }
        ReportFormat::Json => {
            let json = serde_json::to_string_pretty(&entries).unwrap_or_else(|_| "[]".to_string());
            println!("{json}");
        }
    }

    Ok(0)
}

/// Human-readable label for a step state.
fn describe(state: StepState) -> &'static str {
    match state {
        StepState::MissingMarker => "stale (never built)",
        StepState::InputNewer => "stale (input changed)",
        StepState::Fresh => "up to date",
        StepState::AlwaysRuns => "always runs",
        StepState::InputMissing => "input missing",
    }
}
