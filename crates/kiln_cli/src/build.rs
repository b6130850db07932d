//! `kiln build` — run every stale step in declared order.
//!
//! The full pipeline:
//!
//! 1. Find project root (walk up looking for `kiln.toml`)
//! 2. Load and validate config via `kiln_config`
//! 3. Resolve steps (inputs, command templates, artifacts)
//! 4. For each step in declared order: skip if fresh, otherwise stamp an
//!    attempt marker and run the command
//! 5. On a command failure, drop every marker stamped this run and abort

use kiln_step::{StepOutcome, StepRunner};

use crate::pipeline::load_project;
use crate::GlobalArgs;

/// Runs the `kiln build` command.
///
/// Executes stale steps in declared order and reports what ran. Returns exit
/// code 0 on success; a failed or unspawnable command surfaces as an error.
pub fn run(global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project = load_project(global)?;

    if !global.quiet {
        if project.config.project.version.is_empty() {
            eprintln!("   Building {}", project.config.project.name);
        } else {
            eprintln!(
                "   Building {} v{}",
                project.config.project.name, project.config.project.version
            );
        }
    }

    // Commands may write through ${out_dir}, so both managed directories
    // exist before the first spawn.
    std::fs::create_dir_all(project.cache.root())?;
    std::fs::create_dir_all(project.root.join(&project.config.paths.output))?;

    let mut runner = StepRunner::new(&project.cache);
    let mut executed = 0usize;

    for step in &project.steps {
        match runner.run_step(step)? {
            StepOutcome::Executed => {
                executed += 1;
                if !global.quiet {
                    if global.verbose {
                        eprintln!("       Ran {} ({})", step.name, step.command.join(" "));
                    } else {
                        eprintln!("       Ran {}", step.name);
                    }
                }
            }
            StepOutcome::Skipped => {
                if global.verbose {
                    eprintln!("     Fresh {}", step.name);
                }
            }
        }
    }

    if !global.quiet {
        if executed == 0 {
            eprintln!("   Nothing to do; all steps up to date.");
        } else {
            eprintln!("   Build complete.");
        }
    }

    Ok(0)
}
