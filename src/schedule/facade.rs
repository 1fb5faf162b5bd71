//! The single path by which a task list changes.
//!
//! Every call validates the proposed change against the current list,
//! applies it to a copy, re-propagates the affected projects and merges
//! the aggregated metrics back into the project rows. On any error the
//! input is left exactly as it was.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::SchedulerConfig;
use crate::errors::SchedulingError;
use crate::model::{validate_task, Task, TaskId};
use crate::schedule::aggregate::aggregate_with;
use crate::schedule::critical_path::critical_path;
use crate::schedule::graph::{dangling_dependencies, dependents_of, find_cycle, project_scope};
use crate::schedule::propagate::propagate;

/// A proposed edit, serialized as `{"type": "add", "task": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "task", rename_all = "lowercase")]
pub enum TaskChange {
    Add(Task),
    Update(Task),
    Delete(TaskId),
}

/// Apply `change` with the default settings.
pub fn apply_task_change(tasks: &[Task], change: TaskChange) -> Result<Vec<Task>, SchedulingError> {
    apply_task_change_with(tasks, change, &SchedulerConfig::default())
}

pub fn apply_task_change_with(
    tasks: &[Task],
    change: TaskChange,
    config: &SchedulerConfig,
) -> Result<Vec<Task>, SchedulingError> {
    let (mut next, touched) = match change {
        TaskChange::Add(task) => add(tasks, task)?,
        TaskChange::Update(task) => update(tasks, task)?,
        TaskChange::Delete(id) => delete(tasks, id)?,
    };

    for project in touched {
        reschedule_project(&mut next, project, config)?;
    }
    Ok(next)
}

/// Every reason `tasks` would be refused by [`reschedule`], in the order
/// they are checked: per-task problems first, then cycles per project.
pub fn audit(tasks: &[Task]) -> Vec<SchedulingError> {
    let mut problems = Vec::new();
    let mut seen = HashSet::with_capacity(tasks.len());
    for task in tasks {
        if !seen.insert(task.id) {
            problems.push(SchedulingError::DuplicateTask(task.id));
        }
        if let Err(e) = validate_task(task) {
            problems.push(e.into());
        }
        if let Err(e) = check_parent(tasks, task) {
            problems.push(e);
        }
    }

    for project in tasks.iter().filter(|t| t.is_project()) {
        let scope = project_scope(tasks, project.id);
        if let Some(cycle) = find_cycle(&scope, None) {
            problems.push(SchedulingError::CircularDependency { cycle });
        }
    }
    problems
}

/// Validate a whole task list and recompute every project.
///
/// Used for data that did not arrive through [`apply_task_change`],
/// such as a file loaded from disk.
pub fn reschedule(tasks: &[Task], config: &SchedulerConfig) -> Result<Vec<Task>, SchedulingError> {
    if let Some(problem) = audit(tasks).into_iter().next() {
        return Err(problem);
    }

    let dangling = dangling_dependencies(tasks);
    if !dangling.is_empty() {
        warn!(count = dangling.len(), "task list has dependencies outside their project");
    }

    let projects: Vec<TaskId> = tasks.iter().filter(|t| t.is_project()).map(|t| t.id).collect();
    let mut next = tasks.to_vec();
    for project in projects {
        reschedule_project(&mut next, project, config)?;
    }
    Ok(next)
}

/// Validation shared by add and update. Returns the normalized task.
fn prepare(tasks: &[Task], mut task: Task) -> Result<Task, SchedulingError> {
    validate_task(&task)?;
    if task.is_milestone() {
        task.duration = 0;
    }
    task.end_date = task.end_date.max(task.start_date);
    check_parent(tasks, &task)?;

    let scope: Vec<Task> = tasks
        .iter()
        .filter(|t| t.parent_task == task.parent_task)
        .cloned()
        .collect();
    if let Some(cycle) = find_cycle(&scope, Some(&task)) {
        return Err(SchedulingError::CircularDependency { cycle });
    }
    Ok(task)
}

fn check_parent(tasks: &[Task], task: &Task) -> Result<(), SchedulingError> {
    let Some(parent) = task.parent_task else {
        return Ok(());
    };
    if tasks.iter().any(|t| t.id == parent && t.is_project()) {
        Ok(())
    } else {
        Err(SchedulingError::UnknownParent {
            task: task.id,
            parent,
        })
    }
}

/// Project ids to recompute after `task` changed.
fn owning_projects(task: &Task) -> Vec<TaskId> {
    match task.parent_task {
        Some(parent) => vec![parent],
        None if task.is_project() => vec![task.id],
        None => Vec::new(),
    }
}

fn add(tasks: &[Task], task: Task) -> Result<(Vec<Task>, Vec<TaskId>), SchedulingError> {
    if tasks.iter().any(|t| t.id == task.id) {
        return Err(SchedulingError::DuplicateTask(task.id));
    }
    let task = prepare(tasks, task)?;
    info!(task = %task.id, name = %task.name, kind = %task.kind, "adding task");

    let touched = owning_projects(&task);
    let mut next = tasks.to_vec();
    next.push(task);
    Ok((next, touched))
}

fn update(tasks: &[Task], task: Task) -> Result<(Vec<Task>, Vec<TaskId>), SchedulingError> {
    let index = tasks
        .iter()
        .position(|t| t.id == task.id)
        .ok_or(SchedulingError::TaskNotFound(task.id))?;
    let task = prepare(tasks, task)?;

    let mut next = tasks.to_vec();
    let previous = std::mem::replace(&mut next[index], task.clone());

    // Children must still hang off a project.
    if previous.is_project() && !task.is_project() {
        if let Some(child) = next.iter().find(|t| t.parent_task == Some(task.id)) {
            return Err(SchedulingError::UnknownParent {
                task: child.id,
                parent: task.id,
            });
        }
    }

    let affected = dependents_of(&next, task.id);
    info!(
        task = %task.id,
        name = %task.name,
        affected = affected.len(),
        "updating task"
    );

    let mut touched = owning_projects(&previous);
    for project in owning_projects(&task) {
        if !touched.contains(&project) {
            touched.push(project);
        }
    }
    Ok((next, touched))
}

fn delete(tasks: &[Task], id: TaskId) -> Result<(Vec<Task>, Vec<TaskId>), SchedulingError> {
    let target = tasks
        .iter()
        .find(|t| t.id == id)
        .ok_or(SchedulingError::TaskNotFound(id))?;

    // Collect descendants with a worklist rather than recursion.
    let mut doomed: HashSet<TaskId> = HashSet::from([id]);
    let mut pending = vec![id];
    while let Some(current) = pending.pop() {
        for child in tasks.iter().filter(|t| t.parent_task == Some(current)) {
            if doomed.insert(child.id) {
                pending.push(child.id);
            }
        }
    }
    info!(task = %id, name = %target.name, removed = doomed.len(), "deleting task");

    let next: Vec<Task> = tasks
        .iter()
        .filter(|t| !doomed.contains(&t.id))
        .cloned()
        .map(|mut t| {
            t.dependencies.retain(|dep| !doomed.contains(dep));
            t
        })
        .collect();

    let touched = target
        .parent_task
        .filter(|parent| !doomed.contains(parent))
        .into_iter()
        .collect();
    Ok((next, touched))
}

/// Propagate dates inside `project` and fold the result into its row.
fn reschedule_project(
    tasks: &mut [Task],
    project: TaskId,
    config: &SchedulerConfig,
) -> Result<(), SchedulingError> {
    let Some(index) = tasks.iter().position(|t| t.id == project && t.is_project()) else {
        return Ok(());
    };
    let owner = tasks[index].clone();

    let children = project_scope(tasks, project);
    let mut scheduled = propagate(owner.start_date, &children)?;
    let metrics = aggregate_with(&owner, &scheduled, config.milestone_progress);

    if config.compute_slack {
        let path = critical_path(metrics.end_date, &scheduled)?;
        for task in &mut scheduled {
            task.slack = path.slack.get(&task.id).copied();
        }
    }

    let mut updates: HashMap<TaskId, Task> = scheduled.into_iter().map(|t| (t.id, t)).collect();
    for task in tasks.iter_mut() {
        if let Some(next) = updates.remove(&task.id) {
            *task = next;
        }
    }

    let row = &mut tasks[index];
    row.end_date = metrics.end_date;
    row.duration = metrics.duration;
    row.progress = metrics.progress;
    debug!(
        project = %project,
        end = %metrics.end_date,
        duration = metrics.duration,
        progress = metrics.progress,
        "project recomputed"
    );
    Ok(())
}
