//! Backward pass: slack per task and the critical path of a project.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};

use crate::errors::SchedulingError;
use crate::model::{Task, TaskId};
use crate::schedule::graph::topological_order;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CriticalPath {
    /// Zero-slack chain ending at the project end, earliest task first.
    pub tasks: Vec<TaskId>,
    /// Days each task can slip without moving the project end.
    pub slack: HashMap<TaskId, i64>,
}

impl CriticalPath {
    pub fn is_critical(&self, id: TaskId) -> bool {
        self.slack.get(&id) == Some(&0)
    }
}

/// Compute slack for already-propagated `tasks` of a project ending at
/// `project_end`.
pub fn critical_path(
    project_end: DateTime<Utc>,
    tasks: &[Task],
) -> Result<CriticalPath, SchedulingError> {
    let order = topological_order(tasks)?;
    let in_scope: HashSet<TaskId> = tasks.iter().map(|t| t.id).collect();

    let mut dependents: HashMap<TaskId, Vec<TaskId>> = HashMap::new();
    for task in &order {
        for dep in task.dependencies.iter().filter(|d| in_scope.contains(*d)) {
            dependents.entry(*dep).or_default().push(task.id);
        }
    }

    let mut latest_start: HashMap<TaskId, DateTime<Utc>> = HashMap::with_capacity(tasks.len());
    let mut slack: HashMap<TaskId, i64> = HashMap::with_capacity(tasks.len());

    for task in order.iter().rev() {
        let latest_finish = dependents
            .get(&task.id)
            .into_iter()
            .flatten()
            .filter_map(|id| latest_start.get(id))
            .min()
            .copied()
            .unwrap_or(project_end);
        let start = Duration::try_days(task.effective_duration())
            .and_then(|days| latest_finish.checked_sub_signed(days))
            .ok_or(SchedulingError::DateOutOfRange { task: task.id })?;
        latest_start.insert(task.id, start);
        slack.insert(task.id, (start - task.start_date).num_days().max(0));
    }

    let by_id: HashMap<TaskId, &Task> = tasks.iter().map(|t| (t.id, t)).collect();
    let critical = |t: &Task| slack.get(&t.id) == Some(&0);

    let mut path = Vec::new();
    let mut current = tasks
        .iter()
        .find(|t| critical(*t) && t.end_date == project_end);

    while let Some(task) = current {
        path.push(task.id);
        current = task
            .dependencies
            .iter()
            .filter_map(|dep| by_id.get(dep).copied())
            .find(|dep| critical(*dep) && dep.end_date == task.start_date);
    }
    path.reverse();

    Ok(CriticalPath { tasks: path, slack })
}
