use serde::Serialize;

use super::task::{Task, TaskId};
use crate::config::SchedulerConfig;
use crate::errors::SchedulingError;
use crate::schedule::{self, ProjectSummary, TaskChange};

/// A consistent task list.
///
/// The tasks can be read but not edited in place: a `Schedule` is only
/// built by [`Schedule::from_tasks`] and changed by [`Schedule::apply`],
/// both of which run validation, propagation and aggregation. Serializes
/// as the flat JSON task list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Schedule {
    tasks: Vec<Task>,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate `tasks` and recompute every project.
    pub fn from_tasks(tasks: Vec<Task>, config: &SchedulerConfig) -> Result<Self, SchedulingError> {
        let tasks = schedule::reschedule(&tasks, config)?;
        Ok(Self { tasks })
    }

    /// Return the schedule with `change` applied, or the reason it was
    /// rejected. `self` is never modified.
    pub fn apply(&self, change: TaskChange, config: &SchedulerConfig) -> Result<Self, SchedulingError> {
        let tasks = schedule::apply_task_change_with(&self.tasks, change, config)?;
        Ok(Self { tasks })
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn into_tasks(self) -> Vec<Task> {
        self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn projects(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(|t| t.is_project())
    }

    /// Children of `project`, sorted by display order.
    pub fn children(&self, project: TaskId) -> Vec<&Task> {
        let mut children: Vec<&Task> = self
            .tasks
            .iter()
            .filter(|t| t.parent_task == Some(project))
            .collect();
        children.sort_by_key(|t| t.order);
        children
    }

    /// Tasks whose dates move when `id` moves.
    pub fn affected_by(&self, id: TaskId) -> Vec<&Task> {
        schedule::dependents_of(&self.tasks, id)
            .into_iter()
            .filter_map(|dep| self.get(dep))
            .collect()
    }

    pub fn summaries(&self, config: &SchedulerConfig) -> Result<Vec<ProjectSummary>, SchedulingError> {
        self.projects()
            .map(|p| schedule::summarize(p, &self.tasks, config.milestone_progress))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn apply_leaves_original_untouched() {
        let cfg = SchedulerConfig::default();
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let p = Task::new_project("P", start);
        let base = Schedule::from_tasks(vec![p.clone()], &cfg).unwrap();

        let t = Task::new_task("T", p.id, 3);
        let next = base.apply(TaskChange::Add(t.clone()), &cfg).unwrap();

        assert_eq!(base.len(), 1);
        assert_eq!(next.len(), 2);
        assert_eq!(next.get(p.id).unwrap().duration, 3);
        assert_eq!(next.children(p.id)[0].id, t.id);
        assert_eq!(next.projects().count(), 1);
    }

    #[test]
    fn serializes_as_flat_list() {
        let cfg = SchedulerConfig::default();
        let p = Task::new_project("P", Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
        let s = Schedule::from_tasks(vec![p], &cfg).unwrap();
        let json = serde_json::to_value(&s).unwrap();
        assert!(json.is_array());
        assert_eq!(json.as_array().unwrap().len(), 1);
    }
}
