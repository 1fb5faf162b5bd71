use std::path::Path;

use crate::errors::StoreError;
use crate::model::Task;

pub const HEADERS: [&str; 11] = [
    "ID",
    "Name",
    "Type",
    "Parent",
    "Start Date",
    "End Date",
    "Duration",
    "Progress",
    "Status",
    "Priority",
    "Dependencies",
];

/// Export tasks to a comma-delimited CSV file readable by the importer.
///
/// Dates are formatted as YYYY-MM-DD, dependencies as `;`-joined ids.
/// Returns the number of tasks written.
pub fn export_csv(tasks: &[Task], path: &Path) -> Result<usize, StoreError> {
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_path(path)?;
    write_tasks(&mut wtr, tasks)?;
    Ok(tasks.len())
}

/// Same as [`export_csv`] but into any writer.
pub fn write_tasks<W: std::io::Write>(wtr: &mut csv::Writer<W>, tasks: &[Task]) -> Result<(), StoreError> {
    wtr.write_record(HEADERS)?;

    for task in tasks {
        let dependencies = task
            .dependencies
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(";");
        wtr.write_record([
            task.id.to_string(),
            task.name.clone(),
            task.kind.label().to_string(),
            task.parent_task.map(|p| p.to_string()).unwrap_or_default(),
            task.start_date.format("%Y-%m-%d").to_string(),
            task.end_date.format("%Y-%m-%d").to_string(),
            task.duration.to_string(),
            task.progress.to_string(),
            task.status.label().to_string(),
            task.priority.label().to_string(),
            dependencies,
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
