//! Kiln CLI — the command-line interface for the kiln build orchestrator.
//!
//! Provides `kiln build` for running stale build steps, `kiln status` for a
//! read-only staleness report, `kiln clean` for dropping all cache markers,
//! and `kiln init` for project scaffolding.

#![warn(missing_docs)]

mod build;
mod clean;
mod init;
mod pipeline;
mod status;

use std::process;

use clap::{Parser, Subcommand, ValueEnum};

/// Kiln — a timestamp-driven incremental build orchestrator.
#[derive(Parser, Debug)]
#[command(name = "kiln", version, about = "Kiln build orchestrator")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Report skipped steps and expanded commands.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a custom `kiln.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run every build step whose input changed since the last build.
    Build,
    /// Report per-step staleness without running anything.
    Status(StatusArgs),
    /// Delete all cache markers, forcing the next build to run every step.
    Clean,
    /// Create a new kiln project.
    Init {
        /// Project name (creates a subdirectory). If omitted, initializes in
        /// the current directory.
        name: Option<String>,
    },
}

/// Arguments for the `kiln status` subcommand.
#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// Output format for the report.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Staleness report output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to report skipped steps and expanded commands.
    pub verbose: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        config: cli.config,
    };

    let result = match cli.command {
        Command::Build => build::run(&global),
        Command::Status(ref args) => status::run(args, &global),
        Command::Clean => clean::run(&global),
        Command::Init { name } => init::run(name),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
