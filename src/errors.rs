//! Error types for the scheduling core and its file adapters.

use std::fmt;

use thiserror::Error;

use crate::model::TaskId;

/// A task record that breaks the entity rules.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("task {0} has an empty name")]
    EmptyName(TaskId),

    #[error("task {id} has a negative duration ({duration} days)")]
    NegativeDuration { id: TaskId, duration: i64 },

    #[error("unknown task type '{0}' (expected project, task or milestone)")]
    UnknownKind(String),

    #[error("task {id} has progress {progress}, expected 0..=100")]
    ProgressOutOfRange { id: TaskId, progress: u8 },

    #[error("project {0} cannot have a parent task")]
    ProjectWithParent(TaskId),

    #[error("task {0} must belong to a project")]
    MissingParent(TaskId),
}

/// The dependency graph handed to the topological sort contains a cycle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("dependency cycle involving task {task}")]
pub struct CycleError {
    pub task: TaskId,
}

/// Reasons a proposed change is rejected. The task list is left untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulingError {
    #[error("invalid task: {0}")]
    InvalidTask(#[from] ValidationError),

    #[error("circular dependency: {}", format_cycle(.cycle))]
    CircularDependency { cycle: Vec<TaskId> },

    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    #[error("a task with id {0} already exists")]
    DuplicateTask(TaskId),

    #[error("task {task} refers to {parent}, which is not a project")]
    UnknownParent { task: TaskId, parent: TaskId },

    #[error("dates of task {task} fall outside the supported calendar range")]
    DateOutOfRange { task: TaskId },
}

impl From<CycleError> for SchedulingError {
    fn from(err: CycleError) -> Self {
        SchedulingError::CircularDependency {
            cycle: vec![err.task],
        }
    }
}

fn format_cycle(cycle: &[TaskId]) -> String {
    cycle
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// A dependency that does not resolve to a task in the same project.
///
/// Not an error: propagation drops the edge and carries on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferentialWarning {
    pub task: TaskId,
    pub missing: TaskId,
}

impl fmt::Display for ReferentialWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "task {} depends on {}, which is not in the same project",
            self.task, self.missing
        )
    }
}

/// Failures while reading or writing schedule files.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV is missing required columns. Found headers: {found:?}. Need columns for: task name, start date.")]
    MissingColumns { found: Vec<String> },

    #[error("no valid tasks found in CSV ({skipped} rows skipped)")]
    NoTasks { skipped: usize },

    #[error(transparent)]
    Scheduling(#[from] SchedulingError),
}

/// Settings file could not be read or parsed.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read settings {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
