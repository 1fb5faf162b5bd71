use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ValidationError;

pub type TaskId = Uuid;

/// Discriminates projects, schedulable tasks and milestones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Project,
    Task,
    Milestone,
}

impl TaskKind {
    pub fn label(&self) -> &'static str {
        match self {
            TaskKind::Project => "project",
            TaskKind::Task => "task",
            TaskKind::Milestone => "milestone",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TaskKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "project" => Ok(TaskKind::Project),
            "task" => Ok(TaskKind::Task),
            "milestone" => Ok(TaskKind::Milestone),
            other => Err(ValidationError::UnknownKind(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Completed => "completed",
        }
    }

    /// Lenient parse used by the CSV importer.
    pub fn parse_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "todo" | "to do" | "not started" | "not-started" | "new" | "planned" => {
                Some(TaskStatus::Todo)
            }
            "in-progress" | "in progress" | "active" | "started" => Some(TaskStatus::InProgress),
            "completed" | "complete" | "done" | "finished" => Some(TaskStatus::Completed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TaskPriority {
    pub fn label(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        }
    }

    /// Lenient parse used by the CSV importer.
    pub fn parse_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Some(TaskPriority::Low),
            "medium" | "med" | "normal" => Some(TaskPriority::Medium),
            "high" | "critical" => Some(TaskPriority::High),
            _ => None,
        }
    }
}

/// A project, task or milestone in the plan.
///
/// Dates are stored as UTC instants and persisted as millisecond
/// timestamps. `start_date`, `end_date` and `duration` of projects and
/// scheduled children are derived by the engine; edits go through
/// [`crate::schedule::apply_task_change`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(rename = "type")]
    pub kind: TaskKind,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub start_date: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub end_date: DateTime<Utc>,
    /// Whole days. Always 0 for milestones.
    #[serde(default)]
    pub duration: i64,
    /// Percent complete, 0..=100.
    #[serde(default)]
    pub progress: u8,
    /// Display row ordering; no scheduling effect.
    #[serde(default)]
    pub order: i32,
    /// Tasks in the same project that must finish before this one starts.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub dependencies: BTreeSet<TaskId>,
    /// Owning project; `None` for projects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_task: Option<TaskId>,
    /// Days of float before the task delays its project.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slack: Option<i64>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: TaskPriority,
}

impl Task {
    /// Create a new item with sensible defaults.
    pub fn new(name: impl Into<String>, kind: TaskKind, start: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: String::new(),
            kind,
            start_date: start,
            end_date: start,
            duration: 0,
            progress: 0,
            order: 0,
            dependencies: BTreeSet::new(),
            parent_task: None,
            slack: None,
            status: TaskStatus::Todo,
            priority: TaskPriority::Medium,
        }
    }

    /// Create a root project starting at `start`.
    pub fn new_project(name: impl Into<String>, start: DateTime<Utc>) -> Self {
        Self::new(name, TaskKind::Project, start)
    }

    /// Create a task of `duration` days inside `project`.
    pub fn new_task(name: impl Into<String>, project: TaskId, duration: i64) -> Self {
        let mut task = Self::new(name, TaskKind::Task, DateTime::<Utc>::UNIX_EPOCH);
        task.parent_task = Some(project);
        task.duration = duration;
        task
    }

    /// Create a zero-duration milestone inside `project`.
    pub fn new_milestone(name: impl Into<String>, project: TaskId) -> Self {
        let mut task = Self::new(name, TaskKind::Milestone, DateTime::<Utc>::UNIX_EPOCH);
        task.parent_task = Some(project);
        task
    }

    pub fn with_dependencies(mut self, deps: impl IntoIterator<Item = TaskId>) -> Self {
        self.dependencies = deps.into_iter().collect();
        self
    }

    pub fn with_progress(mut self, progress: u8) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    pub fn is_project(&self) -> bool {
        self.kind == TaskKind::Project
    }

    pub fn is_milestone(&self) -> bool {
        self.kind == TaskKind::Milestone
    }

    /// Duration used for date arithmetic: milestones never take time.
    pub fn effective_duration(&self) -> i64 {
        if self.is_milestone() {
            0
        } else {
            self.duration.max(0)
        }
    }
}

/// Check a task against the entity rules.
pub fn validate_task(task: &Task) -> Result<(), ValidationError> {
    if task.name.trim().is_empty() {
        return Err(ValidationError::EmptyName(task.id));
    }
    if !task.is_milestone() && task.duration < 0 {
        return Err(ValidationError::NegativeDuration {
            id: task.id,
            duration: task.duration,
        });
    }
    if task.progress > 100 {
        return Err(ValidationError::ProgressOutOfRange {
            id: task.id,
            progress: task.progress,
        });
    }
    match (task.kind, task.parent_task) {
        (TaskKind::Project, Some(_)) => Err(ValidationError::ProjectWithParent(task.id)),
        (TaskKind::Task | TaskKind::Milestone, None) => {
            Err(ValidationError::MissingParent(task.id))
        }
        _ => Ok(()),
    }
}

/// Predicate form of [`validate_task`].
pub fn is_valid_task(task: &Task) -> bool {
    validate_task(task).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project() -> Task {
        Task::new_project("Launch", DateTime::<Utc>::UNIX_EPOCH)
    }

    #[test]
    fn factories_use_defaults() {
        let p = project();
        let t = Task::new_task("Design", p.id, 3);
        assert_eq!(t.progress, 0);
        assert_eq!(t.status, TaskStatus::Todo);
        assert_eq!(t.priority, TaskPriority::Medium);
        assert!(t.dependencies.is_empty());
        assert_eq!(t.parent_task, Some(p.id));
        assert!(is_valid_task(&t));
    }

    #[test]
    fn rejects_blank_name() {
        let p = project();
        let t = Task::new_task("   ", p.id, 1);
        assert_eq!(validate_task(&t), Err(ValidationError::EmptyName(t.id)));
    }

    #[test]
    fn rejects_negative_duration_except_for_milestones() {
        let p = project();
        let t = Task::new_task("Build", p.id, -2);
        assert!(matches!(
            validate_task(&t),
            Err(ValidationError::NegativeDuration { duration: -2, .. })
        ));

        let mut m = Task::new_milestone("Ship", p.id);
        m.duration = -2;
        assert!(is_valid_task(&m));
        assert_eq!(m.effective_duration(), 0);
    }

    #[test]
    fn rejects_unknown_kind_text() {
        assert_eq!(
            "epic".parse::<TaskKind>(),
            Err(ValidationError::UnknownKind("epic".into()))
        );
        assert_eq!(" Milestone ".parse::<TaskKind>(), Ok(TaskKind::Milestone));
    }

    #[test]
    fn enforces_parent_rules() {
        let p = project();
        let mut orphan = Task::new_task("Loose", p.id, 1);
        orphan.parent_task = None;
        assert_eq!(validate_task(&orphan), Err(ValidationError::MissingParent(orphan.id)));

        let mut nested = project();
        nested.parent_task = Some(p.id);
        assert_eq!(
            validate_task(&nested),
            Err(ValidationError::ProjectWithParent(nested.id))
        );
    }

    #[test]
    fn json_uses_original_field_names() {
        let p = project();
        let t = Task::new_task("Design", p.id, 5).with_progress(40);
        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(json["type"], "task");
        assert_eq!(json["parentTask"], p.id.to_string());
        assert_eq!(json["startDate"], 0);
        assert_eq!(json["status"], "todo");
        assert!(json.get("dependencies").is_none());

        let back: Task = serde_json::from_value(json).unwrap();
        assert_eq!(back, t);
    }
}
