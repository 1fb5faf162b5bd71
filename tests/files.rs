mod common;

use common::{find, jan, scenario_one};
use gantt_scheduler::cli::{CliArgs, Command};
use gantt_scheduler::config::SchedulerConfig;
use gantt_scheduler::errors::StoreError;
use gantt_scheduler::io::{csv_export, csv_import, file};
use gantt_scheduler::model::{Schedule, Task};
use gantt_scheduler::{run, SchedulingError};

#[test]
fn json_round_trip_preserves_schedule() {
    let cfg = SchedulerConfig::default();
    let s = scenario_one();
    let schedule = Schedule::from_tasks(s.tasks.clone(), &cfg).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plan.json");
    file::save_schedule(&schedule, &path).unwrap();

    let loaded = file::load_schedule(&path, &cfg).unwrap();
    assert_eq!(loaded, schedule);

    let raw: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw[0]["type"], "project");
    assert_eq!(raw[0]["startDate"], jan(1).timestamp_millis());
}

#[test]
fn loading_recomputes_stale_dates() {
    let cfg = SchedulerConfig::default();
    let s = scenario_one();
    let mut stale = s.tasks.clone();
    for task in &mut stale {
        task.start_date = jan(20);
        task.end_date = jan(20);
    }
    stale[0].start_date = jan(1);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stale.json");
    std::fs::write(&path, serde_json::to_string(&stale).unwrap()).unwrap();

    let loaded = file::load_schedule(&path, &cfg).unwrap();
    assert_eq!(find(loaded.tasks(), s.b.id).end_date, jan(9));
    assert_eq!(find(loaded.tasks(), s.project.id).end_date, jan(9));
}

#[test]
fn loading_a_cyclic_file_fails() {
    let cfg = SchedulerConfig::default();
    let s = scenario_one();
    let mut tasks = s.tasks.clone();
    tasks
        .iter_mut()
        .find(|t| t.id == s.a.id)
        .unwrap()
        .dependencies
        .insert(s.b.id);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cyclic.json");
    std::fs::write(&path, serde_json::to_string(&tasks).unwrap()).unwrap();

    let err = file::load_schedule(&path, &cfg).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Scheduling(SchedulingError::CircularDependency { .. })
    ));
}

#[test]
fn csv_export_then_import_keeps_structure() {
    let cfg = SchedulerConfig::default();
    let s = scenario_one();
    let schedule = Schedule::from_tasks(s.tasks.clone(), &cfg).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plan.csv");
    let written = csv_export::export_csv(schedule.tasks(), &path).unwrap();
    assert_eq!(written, 3);

    let (tasks, skipped) = csv_import::import_csv(&path).unwrap();
    assert_eq!(skipped, 0);
    let imported = Schedule::from_tasks(tasks, &cfg).unwrap();

    let b = find(imported.tasks(), s.b.id);
    assert!(b.dependencies.contains(&s.a.id));
    assert_eq!((b.start_date, b.end_date), (jan(6), jan(9)));
    assert_eq!(find(imported.tasks(), s.project.id).duration, 8);
}

fn check_args(dir: &std::path::Path, file: std::path::PathBuf) -> CliArgs {
    CliArgs {
        config: Some(dir.join("settings.json")),
        log_level: None,
        command: Command::Check { file },
    }
}

#[test]
fn check_agrees_with_loading() {
    let cfg = SchedulerConfig::default();
    let s = scenario_one();
    let dir = tempfile::tempdir().unwrap();

    let clean = dir.path().join("clean.json");
    std::fs::write(&clean, serde_json::to_string(&s.tasks).unwrap()).unwrap();
    assert!(run(check_args(dir.path(), clean)).is_ok());

    let mut duplicated = s.tasks.clone();
    duplicated.push(s.a.clone());
    let dup = dir.path().join("duplicate.json");
    std::fs::write(&dup, serde_json::to_string(&duplicated).unwrap()).unwrap();
    assert!(file::load_schedule(&dup, &cfg).is_err());
    assert!(run(check_args(dir.path(), dup)).is_err());

    let mut misparented = s.tasks.clone();
    misparented.push(Task::new_task("Under A", s.a.id, 1));
    let bad_parent = dir.path().join("bad_parent.json");
    std::fs::write(&bad_parent, serde_json::to_string(&misparented).unwrap()).unwrap();
    assert!(file::load_schedule(&bad_parent, &cfg).is_err());
    assert!(run(check_args(dir.path(), bad_parent)).is_err());
}
