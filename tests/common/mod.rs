#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use gantt_scheduler::model::{Task, TaskId};
use gantt_scheduler::schedule::{apply_task_change, TaskChange};

/// Midnight UTC on the given day of January 2024.
pub fn jan(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap()
}

pub fn find(tasks: &[Task], id: TaskId) -> &Task {
    tasks
        .iter()
        .find(|t| t.id == id)
        .unwrap_or_else(|| panic!("task {id} missing"))
}

/// Add every task in order through the facade.
pub fn build(tasks: impl IntoIterator<Item = Task>) -> Vec<Task> {
    tasks.into_iter().fold(Vec::new(), |acc, task| {
        apply_task_change(&acc, TaskChange::Add(task)).expect("valid task")
    })
}

/// Project P starting 2024-01-01 with A (5 days) and B (3 days, after A).
pub struct ScenarioOne {
    pub project: Task,
    pub a: Task,
    pub b: Task,
    pub tasks: Vec<Task>,
}

pub fn scenario_one() -> ScenarioOne {
    let project = Task::new_project("P", jan(1));
    let a = Task::new_task("A", project.id, 5);
    let b = Task::new_task("B", project.id, 3).with_dependencies([a.id]);
    let tasks = build([project.clone(), a.clone(), b.clone()]);
    ScenarioOne {
        project,
        a,
        b,
        tasks,
    }
}
