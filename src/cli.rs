//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use uuid::Uuid;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "gantt-scheduler",
    version,
    about = "Validate and reschedule Gantt project plans stored as JSON task lists.",
    long_about = None
)]
pub struct CliArgs {
    /// Settings file (JSON). Defaults to `settings.json` in the OS config directory.
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `GANTT_SCHEDULER_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Validate a task list and report cycles and dangling dependencies.
    Check { file: PathBuf },

    /// Recompute every project and write the result.
    Reschedule {
        file: PathBuf,
        /// Output path; defaults to rewriting FILE.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print per-project metrics and critical paths.
    Summary { file: PathBuf },

    /// Apply a change read from a JSON file (`{"type": "add", "task": {...}}`).
    Apply {
        file: PathBuf,
        change: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Delete a task, its children and every reference to it.
    Delete {
        file: PathBuf,
        id: Uuid,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the tasks whose dates depend on the given task.
    Affected { file: PathBuf, id: Uuid },

    /// Write the task list as CSV.
    ExportCsv { file: PathBuf, output: PathBuf },

    /// Read a CSV file and write it as a JSON task list.
    ImportCsv { csv: PathBuf, output: PathBuf },
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
