use std::collections::HashMap;

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use gantt_scheduler::config::SchedulerConfig;
use gantt_scheduler::model::{Task, TaskId, TaskKind};
use gantt_scheduler::schedule::{apply_task_change, detect_cycle, reschedule, TaskChange};

#[derive(Debug, Clone)]
struct Draft {
    duration: i64,
    progress: u8,
    milestone: bool,
    deps: Vec<usize>,
}

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

// Acyclic by construction: task i may only depend on tasks 0..i.
fn plan_drafts(max_tasks: usize) -> impl Strategy<Value = Vec<Draft>> {
    proptest::collection::vec(
        (
            0..15i64,
            0..=100u8,
            proptest::bool::weighted(0.2),
            proptest::collection::vec(any::<usize>(), 0..3),
        ),
        1..=max_tasks,
    )
    .prop_map(|raw| {
        raw.into_iter()
            .enumerate()
            .map(|(i, (duration, progress, milestone, deps))| Draft {
                duration,
                progress,
                milestone,
                deps: if i == 0 { Vec::new() } else { deps.into_iter().map(|d| d % i).collect() },
            })
            .collect()
    })
}

fn materialize(drafts: &[Draft]) -> (Task, Vec<Task>) {
    let project = Task::new_project("P", start());
    let mut ids: Vec<TaskId> = Vec::new();
    let mut tasks = vec![project.clone()];
    for (i, draft) in drafts.iter().enumerate() {
        let mut task = if draft.milestone {
            Task::new_milestone(format!("M{i}"), project.id)
        } else {
            Task::new_task(format!("T{i}"), project.id, draft.duration)
        };
        task = task
            .with_progress(draft.progress)
            .with_dependencies(draft.deps.iter().map(|d| ids[*d]));
        ids.push(task.id);
        tasks.push(task);
    }
    (project, tasks)
}

proptest! {
    #[test]
    fn rescheduled_plans_hold_every_invariant(drafts in plan_drafts(12)) {
        let (project, tasks) = materialize(&drafts);
        let out = reschedule(&tasks, &SchedulerConfig::default()).unwrap();

        prop_assert!(!detect_cycle(&out, None));

        let by_id: HashMap<TaskId, &Task> = out.iter().map(|t| (t.id, t)).collect();
        let children: Vec<&Task> = out.iter().filter(|t| t.parent_task == Some(project.id)).collect();

        for task in &children {
            prop_assert!(task.end_date >= task.start_date);
            prop_assert_eq!(task.end_date, task.start_date + Duration::days(task.duration));
            if task.kind == TaskKind::Milestone {
                prop_assert_eq!(task.duration, 0);
            }
            let latest_dep = task.dependencies.iter().map(|d| by_id[d].end_date).max();
            prop_assert_eq!(task.start_date, latest_dep.unwrap_or(project.start_date));
        }

        let row = by_id[&project.id];
        let expected_end = children.iter().map(|t| t.end_date).max().unwrap_or(project.start_date);
        prop_assert_eq!(row.end_date, expected_end);

        let worked: Vec<u32> = children.iter().filter(|t| t.kind != TaskKind::Milestone).map(|t| t.progress as u32).collect();
        let expected = if worked.is_empty() {
            0
        } else {
            (worked.iter().sum::<u32>() as f64 / worked.len() as f64).round() as u8
        };
        prop_assert_eq!(row.progress, expected);
    }

    #[test]
    fn rescheduling_twice_changes_nothing(drafts in plan_drafts(12)) {
        let (_, tasks) = materialize(&drafts);
        let cfg = SchedulerConfig::default();
        let once = reschedule(&tasks, &cfg).unwrap();
        let twice = reschedule(&once, &cfg).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn accepted_edges_never_form_cycles(drafts in plan_drafts(10), from in any::<usize>(), to in any::<usize>()) {
        let (_, tasks) = materialize(&drafts);
        let tasks = reschedule(&tasks, &SchedulerConfig::default()).unwrap();
        let n = drafts.len();
        let mut edited = tasks[1 + from % n].clone();
        edited.dependencies.insert(tasks[1 + to % n].id);

        match apply_task_change(&tasks, TaskChange::Update(edited)) {
            Ok(next) => prop_assert!(!detect_cycle(&next, None)),
            Err(_) => prop_assert!(!detect_cycle(&tasks, None)),
        }
    }

    #[test]
    fn delete_cascades_completely(drafts in plan_drafts(10), victim in any::<usize>()) {
        let (_, tasks) = materialize(&drafts);
        let tasks = reschedule(&tasks, &SchedulerConfig::default()).unwrap();
        let id = tasks[1 + victim % drafts.len()].id;

        let next = apply_task_change(&tasks, TaskChange::Delete(id)).unwrap();
        prop_assert_eq!(next.len(), tasks.len() - 1);
        prop_assert!(next.iter().all(|t| t.id != id && !t.dependencies.contains(&id)));
    }
}
