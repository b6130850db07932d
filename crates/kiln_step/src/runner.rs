//! The generic check-then-run routine.
//!
//! [`StepRunner`] processes steps in declared order: consult the staleness
//! cache, stamp an attempt marker, run the external command to completion,
//! and on a non-zero exit invalidate every marker recorded during this
//! invocation so the next run retries from the failed boundary. Steps
//! completed in prior invocations keep their markers.

use std::path::PathBuf;
use std::process::{Command, ExitStatus};

use serde::Serialize;

use kiln_cache::{CacheError, Staleness, StalenessCache};

use crate::error::StepError;
use crate::step::{ArtifactCopy, BuildStep};

/// What [`StepRunner::run_step`] did for one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The step was stale (or uncached) and its command succeeded.
    Executed,
    /// The step was up to date; nothing ran.
    Skipped,
}

/// Runs build steps sequentially against one staleness cache.
///
/// Each external command is a blocking call with inherited stdio, so the
/// invoked tools report progress in their own format. The runner tracks
/// every marker it writes; a failing command drops all of them.
pub struct StepRunner<'a> {
    cache: &'a StalenessCache,
    session_markers: Vec<PathBuf>,
}

impl<'a> StepRunner<'a> {
    /// Creates a runner over the given cache.
    pub fn new(cache: &'a StalenessCache) -> Self {
        Self {
            cache,
            session_markers: Vec::new(),
        }
    }

    /// Checks, records, and runs a single step.
    ///
    /// Returns [`StepOutcome::Skipped`] without side effects when the step's
    /// input is fresh. Otherwise stamps the attempt marker before spawning,
    /// runs the command, and copies the declared artifact on success. A
    /// non-zero exit invalidates every marker recorded so far this run and
    /// surfaces as [`StepError::CommandFailed`]; a command that cannot be
    /// spawned at all propagates without touching the cache.
    pub fn run_step(&mut self, step: &BuildStep) -> Result<StepOutcome, StepError> {
        if let Some(input) = &step.input {
            if !self.cache.must_rebuild(input)? {
                return Ok(StepOutcome::Skipped);
            }
            let marker = self.cache.record_attempt(input)?;
            self.session_markers.push(marker);
        }

        let status = run_command(step)?;
        if !status.success() {
            self.cache.invalidate(&self.session_markers)?;
            return Err(StepError::CommandFailed {
                step: step.name.clone(),
                code: status.code(),
            });
        }

        if let Some(artifact) = &step.artifact {
            copy_artifact(artifact)?;
        }

        Ok(StepOutcome::Executed)
    }

    /// Markers written by this runner so far.
    pub fn session_markers(&self) -> &[PathBuf] {
        &self.session_markers
    }
}

/// Spawns the step's command and waits for it to exit.
fn run_command(step: &BuildStep) -> Result<ExitStatus, StepError> {
    let Some((program, args)) = step.command.split_first() else {
        return Err(StepError::EmptyCommand {
            step: step.name.clone(),
        });
    };
    let mut cmd = Command::new(program);
    cmd.args(args);
    if let Some(cwd) = &step.cwd {
        cmd.current_dir(cwd);
    }
    cmd.status().map_err(|e| StepError::Spawn {
        step: step.name.clone(),
        program: program.clone(),
        source: e,
    })
}

/// Copies a step's produced file into the output directory.
fn copy_artifact(artifact: &ArtifactCopy) -> Result<(), StepError> {
    if let Some(parent) = artifact.dest.parent() {
        std::fs::create_dir_all(parent).map_err(|e| StepError::Io {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    std::fs::copy(&artifact.source, &artifact.dest).map_err(|e| StepError::Io {
        path: artifact.source.clone(),
        source: e,
    })?;
    Ok(())
}

/// Dry-run classification of one step, as reported by `kiln status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepState {
    /// No marker recorded; a build would run this step.
    MissingMarker,
    /// Input modified since the marker; a build would run this step.
    InputNewer,
    /// Marker is current; a build would skip this step.
    Fresh,
    /// No input declared; this step runs on every invocation.
    AlwaysRuns,
    /// The declared input does not exist; a build would abort here.
    InputMissing,
}

impl StepState {
    /// Whether a build would execute this step (or abort on it).
    pub fn would_run(self) -> bool {
        !matches!(self, StepState::Fresh)
    }
}

/// Classifies a step without mutating the cache.
///
/// Unlike a build, a missing input is reported as a state here rather than
/// an error, since no work is about to depend on it.
pub fn step_state(step: &BuildStep, cache: &StalenessCache) -> Result<StepState, StepError> {
    let Some(input) = &step.input else {
        return Ok(StepState::AlwaysRuns);
    };
    match cache.staleness(input) {
        Ok(Staleness::MissingMarker) => Ok(StepState::MissingMarker),
        Ok(Staleness::InputNewer) => Ok(StepState::InputNewer),
        Ok(Staleness::Fresh) => Ok(StepState::Fresh),
        Err(CacheError::MissingInput { .. }) => Ok(StepState::InputMissing),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_cache::BuildInput;
    use std::path::Path;

    fn make_cache() -> (tempfile::TempDir, StalenessCache) {
        let dir = tempfile::tempdir().unwrap();
        let cache = StalenessCache::new(dir.path().join(".cache"));
        (dir, cache)
    }

    fn write_input(root: &Path, declared: &str) -> BuildInput {
        let input = BuildInput::resolve(root, Path::new(declared));
        if let Some(parent) = input.resolved().parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(input.resolved(), "contents").unwrap();
        input
    }

    fn step(name: &str, input: Option<BuildInput>, command: Vec<String>) -> BuildStep {
        BuildStep {
            name: name.to_string(),
            input,
            command,
            cwd: None,
            artifact: None,
        }
    }

    #[cfg(unix)]
    fn sh(script: &str) -> Vec<String> {
        vec!["/bin/sh".to_string(), "-c".to_string(), script.to_string()]
    }

    #[test]
    fn fresh_step_skips_without_spawning() {
        let (dir, cache) = make_cache();
        let input = write_input(dir.path(), "a.txt");
        cache.record_attempt(&input).unwrap();

        // The command is bogus; a Skipped result proves it never spawned.
        let step = step(
            "frag",
            Some(input),
            vec!["/no/such/binary".to_string()],
        );
        let mut runner = StepRunner::new(&cache);
        assert_eq!(runner.run_step(&step).unwrap(), StepOutcome::Skipped);
        assert!(runner.session_markers().is_empty());
    }

    #[test]
    fn missing_input_aborts_without_marker() {
        let (dir, cache) = make_cache();
        let input = BuildInput::resolve(dir.path(), Path::new("gone.txt"));
        let marker = cache.marker_path(&input);

        let step = step("frag", Some(input), vec!["true".to_string()]);
        let mut runner = StepRunner::new(&cache);
        let err = runner.run_step(&step).unwrap_err();
        assert!(matches!(
            err,
            StepError::Cache(CacheError::MissingInput { .. })
        ));
        assert!(!marker.exists());
    }

    #[test]
    fn empty_command_is_rejected() {
        let (_dir, cache) = make_cache();
        let step = step("broken", None, vec![]);
        let mut runner = StepRunner::new(&cache);
        let err = runner.run_step(&step).unwrap_err();
        assert!(matches!(err, StepError::EmptyCommand { .. }));
    }

    #[test]
    fn spawn_failure_propagates() {
        let (dir, cache) = make_cache();
        let input = write_input(dir.path(), "a.txt");
        let marker = cache.marker_path(&input);

        let step = step(
            "frag",
            Some(input),
            vec!["/no/such/binary".to_string()],
        );
        let mut runner = StepRunner::new(&cache);
        let err = runner.run_step(&step).unwrap_err();
        match err {
            StepError::Spawn { step, program, .. } => {
                assert_eq!(step, "frag");
                assert_eq!(program, "/no/such/binary");
            }
            other => panic!("expected Spawn, got {other:?}"),
        }
        // The attempt was stamped before the spawn was attempted.
        assert!(marker.exists());
    }

    #[cfg(unix)]
    #[test]
    fn uncached_step_runs_every_time() {
        let (dir, cache) = make_cache();
        let log = dir.path().join("runs.log");
        let cmd = sh(&format!("echo ran >> {}", log.display()));

        let step = step("exe", None, cmd);
        let mut runner = StepRunner::new(&cache);
        assert_eq!(runner.run_step(&step).unwrap(), StepOutcome::Executed);
        assert_eq!(runner.run_step(&step).unwrap(), StepOutcome::Executed);
        let runs = std::fs::read_to_string(&log).unwrap();
        assert_eq!(runs.lines().count(), 2);
        assert!(runner.session_markers().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn successful_step_keeps_marker() {
        let (dir, cache) = make_cache();
        let input = write_input(dir.path(), "a.txt");
        let marker = cache.marker_path(&input);

        let step = step("frag", Some(input.clone()), sh("exit 0"));
        let mut runner = StepRunner::new(&cache);
        assert_eq!(runner.run_step(&step).unwrap(), StepOutcome::Executed);
        assert!(marker.exists());
        assert!(!cache.must_rebuild(&input).unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn failure_invalidates_all_markers_from_this_run() {
        let (dir, cache) = make_cache();
        let first = write_input(dir.path(), "a.txt");
        let second = write_input(dir.path(), "b.txt");

        let ok_step = step("a", Some(first.clone()), sh("exit 0"));
        let bad_step = step("b", Some(second.clone()), sh("exit 1"));

        let mut runner = StepRunner::new(&cache);
        assert_eq!(runner.run_step(&ok_step).unwrap(), StepOutcome::Executed);
        let err = runner.run_step(&bad_step).unwrap_err();
        match err {
            StepError::CommandFailed { step, code } => {
                assert_eq!(step, "b");
                assert_eq!(code, Some(1));
            }
            other => panic!("expected CommandFailed, got {other:?}"),
        }

        // Both markers are gone, including the step that had succeeded.
        assert!(!cache.marker_path(&first).exists());
        assert!(!cache.marker_path(&second).exists());
        assert!(cache.must_rebuild(&first).unwrap());
        assert!(cache.must_rebuild(&second).unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn markers_from_prior_runs_survive_a_failure() {
        let (dir, cache) = make_cache();
        let first = write_input(dir.path(), "a.txt");
        let second = write_input(dir.path(), "b.txt");

        let ok_step = step("a", Some(first.clone()), sh("exit 0"));
        let bad_step = step("b", Some(second.clone()), sh("exit 1"));

        // First invocation: only step a.
        let mut runner = StepRunner::new(&cache);
        runner.run_step(&ok_step).unwrap();
        drop(runner);

        // Second invocation: a is fresh, b fails.
        let mut runner = StepRunner::new(&cache);
        assert_eq!(runner.run_step(&ok_step).unwrap(), StepOutcome::Skipped);
        runner.run_step(&bad_step).unwrap_err();

        assert!(!cache.must_rebuild(&first).unwrap());
        assert!(cache.must_rebuild(&second).unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn cwd_is_honored() {
        let (dir, cache) = make_cache();
        let sub = dir.path().join("pkgs/lib");
        std::fs::create_dir_all(&sub).unwrap();

        let mut step = step("lib", None, sh("pwd > where.txt"));
        step.cwd = Some(sub.clone());
        StepRunner::new(&cache).run_step(&step).unwrap();

        let recorded = std::fs::read_to_string(sub.join("where.txt")).unwrap();
        let recorded = Path::new(recorded.trim());
        // Compare canonicalized paths; the tempdir may sit behind a symlink.
        assert_eq!(
            recorded.canonicalize().unwrap(),
            sub.canonicalize().unwrap()
        );
    }

    #[cfg(unix)]
    #[test]
    fn artifact_is_copied_on_success() {
        let (dir, cache) = make_cache();
        let produced = dir.path().join("pkgs/lib/zig-out/abplib.dll");
        std::fs::create_dir_all(produced.parent().unwrap()).unwrap();

        let mut step = step(
            "lib",
            None,
            sh(&format!("echo binary > {}", produced.display())),
        );
        step.artifact = Some(ArtifactCopy {
            source: produced,
            dest: dir.path().join("build/abplib.dll"),
        });
        StepRunner::new(&cache).run_step(&step).unwrap();

        let copied = std::fs::read_to_string(dir.path().join("build/abplib.dll")).unwrap();
        assert_eq!(copied.trim(), "binary");
    }

    #[cfg(unix)]
    #[test]
    fn artifact_is_not_copied_on_failure() {
        let (dir, cache) = make_cache();
        let mut step = step("lib", None, sh("exit 3"));
        step.artifact = Some(ArtifactCopy {
            source: dir.path().join("never-made.dll"),
            dest: dir.path().join("build/never-made.dll"),
        });
        let err = StepRunner::new(&cache).run_step(&step).unwrap_err();
        assert!(matches!(
            err,
            StepError::CommandFailed { code: Some(3), .. }
        ));
        assert!(!dir.path().join("build/never-made.dll").exists());
    }

    #[test]
    fn step_state_always_runs_without_input() {
        let (_dir, cache) = make_cache();
        let step = step("exe", None, vec!["true".to_string()]);
        assert_eq!(step_state(&step, &cache).unwrap(), StepState::AlwaysRuns);
        assert!(StepState::AlwaysRuns.would_run());
    }

    #[test]
    fn step_state_reports_missing_input() {
        let (dir, cache) = make_cache();
        let input = BuildInput::resolve(dir.path(), Path::new("gone.txt"));
        let step = step("frag", Some(input), vec!["true".to_string()]);
        assert_eq!(step_state(&step, &cache).unwrap(), StepState::InputMissing);
    }

    #[test]
    fn step_state_tracks_staleness() {
        let (dir, cache) = make_cache();
        let input = write_input(dir.path(), "a.txt");
        let step = step("frag", Some(input.clone()), vec!["true".to_string()]);

        assert_eq!(step_state(&step, &cache).unwrap(), StepState::MissingMarker);

        let marker = cache.record_attempt(&input).unwrap();
        assert_eq!(step_state(&step, &cache).unwrap(), StepState::Fresh);
        assert!(!StepState::Fresh.would_run());

        let file = std::fs::File::options()
            .write(true)
            .open(input.resolved())
            .unwrap();
        let past = std::fs::metadata(&marker).unwrap().modified().unwrap()
            + std::time::Duration::from_secs(5);
        file.set_modified(past).unwrap();
        assert_eq!(step_state(&step, &cache).unwrap(), StepState::InputNewer);
    }
}
