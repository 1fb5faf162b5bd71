use std::path::Path;

use crate::config::SchedulerConfig;
use crate::errors::StoreError;
use crate::model::{Schedule, Task};

/// Save a schedule as a pretty-printed JSON task list.
pub fn save_schedule(schedule: &Schedule, path: &Path) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(schedule)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Read a JSON task list without validating it.
pub fn load_tasks(path: &Path) -> Result<Vec<Task>, StoreError> {
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

/// Load a schedule from a JSON file, validating and rescheduling it.
pub fn load_schedule(path: &Path, config: &SchedulerConfig) -> Result<Schedule, StoreError> {
    let tasks = load_tasks(path)?;
    Ok(Schedule::from_tasks(tasks, config)?)
}
