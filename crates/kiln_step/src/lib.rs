//! Build step modeling and execution.
//!
//! A build step is a plain data value: a name, an optional staleness-checked
//! input, a command argument vector, and optional working directory and
//! artifact declarations. One generic routine ([`StepRunner::run_step`])
//! processes every step the same way: consult the cache, record the attempt,
//! run the external command, and invalidate this run's markers if the
//! command fails.

#![warn(missing_docs)]

pub mod error;
pub mod runner;
pub mod step;
mod template;

pub use error::StepError;
pub use runner::{step_state, StepOutcome, StepRunner, StepState};
pub use step::{resolve_steps, ArtifactCopy, BuildStep};
