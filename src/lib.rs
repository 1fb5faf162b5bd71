// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod io;
pub mod logging;
pub mod model;
pub mod schedule;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use crate::cli::{CliArgs, Command};
use crate::config::SchedulerConfig;
use crate::model::{Schedule, Task, TaskId};
use crate::schedule::TaskChange;

pub use crate::errors::{CycleError, ReferentialWarning, SchedulingError, ValidationError};
pub use crate::schedule::{aggregate, apply_task_change, detect_cycle, ProjectMetrics};

/// High-level entry point used by `main.rs`.
pub fn run(args: CliArgs) -> Result<()> {
    let config = SchedulerConfig::resolve(args.config.as_deref())?;

    match args.command {
        Command::Check { file } => check(&file),
        Command::Reschedule { file, output } => {
            let schedule = load(&file, &config)?;
            save(&schedule, output.as_deref().unwrap_or(file.as_path()))
        }
        Command::Summary { file } => summary(&load(&file, &config)?, &config),
        Command::Apply {
            file,
            change,
            output,
        } => {
            let json = std::fs::read_to_string(&change)
                .with_context(|| format!("reading change {}", change.display()))?;
            let change: TaskChange = serde_json::from_str(&json).context("parsing change")?;
            apply(&file, output, change, &config)
        }
        Command::Delete { file, id, output } => apply(&file, output, TaskChange::Delete(id), &config),
        Command::Affected { file, id } => affected(&load(&file, &config)?, id),
        Command::ExportCsv { file, output } => {
            let schedule = load(&file, &config)?;
            let count = io::csv_export::export_csv(schedule.tasks(), &output)?;
            info!(count, path = %output.display(), "exported CSV");
            Ok(())
        }
        Command::ImportCsv { csv, output } => {
            let (tasks, skipped) = io::csv_import::import_csv(&csv)?;
            let schedule = Schedule::from_tasks(tasks, &config)?;
            info!(imported = schedule.len(), skipped, "imported CSV");
            save(&schedule, &output)
        }
    }
}

fn load(path: &Path, config: &SchedulerConfig) -> Result<Schedule> {
    io::file::load_schedule(path, config).with_context(|| format!("loading {}", path.display()))
}

fn save(schedule: &Schedule, path: &Path) -> Result<()> {
    io::file::save_schedule(schedule, path).with_context(|| format!("writing {}", path.display()))?;
    info!(tasks = schedule.len(), path = %path.display(), "schedule saved");
    Ok(())
}

fn apply(file: &Path, output: Option<PathBuf>, change: TaskChange, config: &SchedulerConfig) -> Result<()> {
    let schedule = load(file, config)?;
    let next = schedule.apply(change, config)?;
    save(&next, output.as_deref().unwrap_or(file))
}

/// Report every problem in a task list instead of stopping at the first.
fn check(file: &Path) -> Result<()> {
    let tasks = io::file::load_tasks(file).with_context(|| format!("loading {}", file.display()))?;
    let problems = schedule::audit(&tasks);

    for problem in &problems {
        match problem {
            SchedulingError::CircularDependency { cycle } => {
                let names: Vec<&str> = cycle.iter().map(|id| name_of(&tasks, *id)).collect();
                println!("cycle: {}", names.join(" -> "));
            }
            other => println!("invalid: {other}"),
        }
    }

    for warning in schedule::dangling_dependencies(&tasks) {
        warn!("{warning}");
        println!("warning: {warning}");
    }

    if !problems.is_empty() {
        bail!("{} problem(s) found in {}", problems.len(), file.display());
    }
    println!("{}: {} tasks OK", file.display(), tasks.len());
    Ok(())
}

fn summary(schedule: &Schedule, config: &SchedulerConfig) -> Result<()> {
    for s in schedule.summaries(config)? {
        let path: Vec<&str> = s
            .critical_path
            .iter()
            .map(|id| name_of(schedule.tasks(), *id))
            .collect();
        println!("{} ({})", s.name, s.project);
        println!("  tasks: {} ({} completed)", s.total_tasks, s.completed_tasks);
        println!(
            "  end: {}  duration: {} days  progress: {}%",
            s.metrics.end_date.format("%Y-%m-%d"),
            s.metrics.duration,
            s.metrics.progress
        );
        println!("  critical path: {}", path.join(" -> "));
    }
    Ok(())
}

fn affected(schedule: &Schedule, id: TaskId) -> Result<()> {
    if schedule.get(id).is_none() {
        bail!(SchedulingError::TaskNotFound(id));
    }
    for task in schedule.affected_by(id) {
        println!("{}\t{}", task.id, task.name);
    }
    Ok(())
}

fn name_of(tasks: &[Task], id: TaskId) -> &str {
    tasks
        .iter()
        .find(|t| t.id == id)
        .map(|t| t.name.as_str())
        .unwrap_or("?")
}
