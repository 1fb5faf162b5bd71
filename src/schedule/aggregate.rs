//! Project-level metrics derived from child tasks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::SchedulingError;
use crate::model::{Task, TaskId};
use crate::schedule::critical_path::critical_path;
use crate::schedule::graph::project_scope;

/// Whether milestones count towards a project's progress average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MilestoneProgress {
    #[default]
    Exclude,
    Include,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectMetrics {
    pub end_date: DateTime<Utc>,
    /// Whole days between the project start and `end_date`.
    pub duration: i64,
    pub progress: u8,
}

/// Aggregate with milestones left out of the progress average.
pub fn aggregate(project: &Task, children: &[Task]) -> ProjectMetrics {
    aggregate_with(project, children, MilestoneProgress::Exclude)
}

pub fn aggregate_with(project: &Task, children: &[Task], policy: MilestoneProgress) -> ProjectMetrics {
    let end_date = children
        .iter()
        .map(|t| t.end_date)
        .max()
        .unwrap_or(project.start_date);
    let duration = (end_date - project.start_date).num_days();

    let weighted: Vec<u32> = children
        .iter()
        .filter(|t| policy == MilestoneProgress::Include || !t.is_milestone())
        .map(|t| u32::from(t.progress.min(100)))
        .collect();

    // Mean rounded half-up.
    let progress = match weighted.len() as u32 {
        0 => 0,
        n => ((weighted.iter().sum::<u32>() * 2 + n) / (2 * n)) as u8,
    };

    ProjectMetrics {
        end_date,
        duration,
        progress,
    }
}

/// Dashboard view of a single project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSummary {
    pub project: TaskId,
    pub name: String,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub metrics: ProjectMetrics,
    pub critical_path: Vec<TaskId>,
}

pub fn summarize(
    project: &Task,
    tasks: &[Task],
    policy: MilestoneProgress,
) -> Result<ProjectSummary, SchedulingError> {
    let children = project_scope(tasks, project.id);
    let metrics = aggregate_with(project, &children, policy);
    let path = critical_path(metrics.end_date, &children)?;

    Ok(ProjectSummary {
        project: project.id,
        name: project.name.clone(),
        total_tasks: children.len(),
        completed_tasks: children.iter().filter(|t| t.progress >= 100).count(),
        metrics,
        critical_path: path.tasks,
    })
}
