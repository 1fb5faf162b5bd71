//! Forward date propagation over one project's tasks.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use crate::errors::{ReferentialWarning, SchedulingError};
use crate::model::{Task, TaskId};
use crate::schedule::graph::topological_order;

/// Recompute `start_date`/`end_date` for every task of a project.
///
/// Tasks without dependencies start with the project; the rest start
/// when their latest dependency ends. Dependencies that are not in
/// `tasks` are skipped with a warning. Every other field is returned
/// as given, except that milestone durations are forced to zero.
///
/// Fails with [`SchedulingError::DateOutOfRange`] when an end date would
/// leave the representable calendar.
pub fn propagate(project_start: DateTime<Utc>, tasks: &[Task]) -> Result<Vec<Task>, SchedulingError> {
    let order = topological_order(tasks)?;
    let mut dates: HashMap<TaskId, (DateTime<Utc>, DateTime<Utc>)> =
        HashMap::with_capacity(tasks.len());

    for task in order {
        let mut start: Option<DateTime<Utc>> = None;
        for dep in &task.dependencies {
            match dates.get(dep) {
                Some(&(_, dep_end)) => {
                    start = Some(start.map_or(dep_end, |s| s.max(dep_end)));
                }
                None => {
                    let warning = ReferentialWarning {
                        task: task.id,
                        missing: *dep,
                    };
                    warn!(task = %task.id, missing = %dep, "{warning}; ignoring edge");
                }
            }
        }

        let start = start.unwrap_or(project_start);
        let end = Duration::try_days(task.effective_duration())
            .and_then(|days| start.checked_add_signed(days))
            .ok_or(SchedulingError::DateOutOfRange { task: task.id })?;
        debug!(task = %task.id, name = %task.name, %start, %end, "scheduled");
        dates.insert(task.id, (start, end));
    }

    Ok(tasks
        .iter()
        .map(|task| {
            let mut scheduled = task.clone();
            if let Some(&(start, end)) = dates.get(&task.id) {
                scheduled.start_date = start;
                scheduled.end_date = end;
            }
            if scheduled.is_milestone() {
                scheduled.duration = 0;
            }
            scheduled
        })
        .collect())
}
