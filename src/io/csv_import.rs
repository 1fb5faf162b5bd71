use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use tracing::warn;
use uuid::Uuid;

use crate::errors::StoreError;
use crate::model::{Task, TaskId, TaskKind, TaskPriority, TaskStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Column {
    Id,
    Name,
    Kind,
    Parent,
    Start,
    End,
    Duration,
    Progress,
    Status,
    Priority,
    Description,
    Dependencies,
    Order,
}

/// Try parsing a date string with several common formats.
fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    for fmt in &["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d.and_time(NaiveTime::MIN).and_utc());
        }
    }
    DateTime::parse_from_rfc3339(s).ok().map(|d| d.with_timezone(&Utc))
}

/// Detect delimiter by checking the first line for common separators.
fn detect_delimiter(first_line: &str) -> u8 {
    let semicolons = first_line.matches(';').count();
    let commas = first_line.matches(',').count();
    let tabs = first_line.matches('\t').count();

    if semicolons > commas && semicolons >= tabs {
        b';'
    } else if tabs > commas {
        b'\t'
    } else {
        b','
    }
}

/// Normalize a header string to a canonical column key.
fn normalize_header(h: &str) -> String {
    h.trim().to_lowercase().replace([' ', '-', '_'], "")
}

fn header_to_column(normalized: &str) -> Option<Column> {
    match normalized {
        "id" | "taskid" | "uuid" => Some(Column::Id),

        "name" | "task" | "tasklabel" | "taskname" | "label" | "title" | "activity" => {
            Some(Column::Name)
        }

        "type" | "kind" | "tasktype" => Some(Column::Kind),

        "parent" | "parenttask" | "parentname" | "project" | "subtaskof" => Some(Column::Parent),

        "start" | "startdate" | "from" | "begin" | "begindate" => Some(Column::Start),

        "end" | "enddate" | "to" | "finish" | "finishdate" | "due" | "duedate" => Some(Column::End),

        "duration" | "days" | "durationdays" => Some(Column::Duration),

        "progress" | "percent" | "complete" | "percentcomplete" => Some(Column::Progress),

        "status" | "state" | "stage" => Some(Column::Status),

        "priority" | "pri" | "importance" => Some(Column::Priority),

        "description" | "notes" | "note" | "details" | "comment" | "comments" => {
            Some(Column::Description)
        }

        "dependencies" | "dependson" | "after" | "predecessors" | "deps" => {
            Some(Column::Dependencies)
        }

        "order" | "row" | "position" => Some(Column::Order),

        _ => None,
    }
}

/// A parsed row whose references are still raw text.
struct PendingTask {
    task: Task,
    parent: Option<String>,
    dependencies: Vec<String>,
}

/// Import tasks from a CSV file.
///
/// Auto-detects delimiter (comma, semicolon, tab) and matches column
/// headers flexibly. Parent and dependency cells may hold ids or task
/// names. Returns `(tasks, skipped_count)`; the tasks still need to go
/// through [`crate::model::Schedule::from_tasks`].
pub fn import_csv(path: &Path) -> Result<(Vec<Task>, usize), StoreError> {
    let content = std::fs::read_to_string(path)?;
    import_csv_str(&content)
}

pub fn import_csv_str(content: &str) -> Result<(Vec<Task>, usize), StoreError> {
    let first_line = content.lines().next().unwrap_or("");
    let delimiter = detect_delimiter(first_line);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();
    let columns: Vec<Option<Column>> = headers
        .iter()
        .map(|h| header_to_column(&normalize_header(h)))
        .collect();

    let has = |col: Column| columns.iter().any(|c| *c == Some(col));
    if !has(Column::Name) || !has(Column::Start) {
        return Err(StoreError::MissingColumns {
            found: headers.iter().map(str::to_string).collect(),
        });
    }

    let mut pending: Vec<PendingTask> = Vec::new();
    let mut skipped = 0usize;

    for (i, result) in reader.records().enumerate() {
        let line = i + 2;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!(line, error = %e, "skipping CSV row");
                skipped += 1;
                continue;
            }
        };

        let mut cells: HashMap<Column, &str> = HashMap::new();
        for (idx, field) in record.iter().enumerate() {
            if let Some(Some(col)) = columns.get(idx) {
                cells.insert(*col, field.trim());
            }
        }
        let cell = |col: Column| cells.get(&col).copied().filter(|s| !s.is_empty());

        let Some(name) = cell(Column::Name) else {
            skipped += 1;
            continue;
        };

        let Some(start) = cell(Column::Start).and_then(parse_date) else {
            warn!(line, value = cell(Column::Start).unwrap_or(""), "skipping row: invalid start date");
            skipped += 1;
            continue;
        };

        let kind = match cell(Column::Kind).map(str::parse::<TaskKind>) {
            None => TaskKind::Task,
            Some(Ok(kind)) => kind,
            Some(Err(e)) => {
                warn!(line, error = %e, "skipping row");
                skipped += 1;
                continue;
            }
        };

        let end = cell(Column::End).and_then(parse_date);
        let duration = cell(Column::Duration)
            .and_then(|s| s.parse::<i64>().ok())
            .or_else(|| end.map(|e| (e - start).num_days().max(0)))
            .unwrap_or(0);

        let status = cell(Column::Status).and_then(TaskStatus::parse_loose);
        let progress = cell(Column::Progress)
            .and_then(|s| s.trim_end_matches('%').trim().parse::<f64>().ok())
            .map(|p| p.clamp(0.0, 100.0).round() as u8)
            .unwrap_or(match status {
                Some(TaskStatus::Completed) => 100,
                _ => 0,
            });

        let mut task = Task::new(name, kind, start);
        if let Some(id) = cell(Column::Id).and_then(|s| Uuid::parse_str(s).ok()) {
            task.id = id;
        }
        task.end_date = end.unwrap_or(start).max(start);
        task.duration = duration;
        task.progress = progress;
        task.status = status.unwrap_or_default();
        task.priority = cell(Column::Priority)
            .and_then(TaskPriority::parse_loose)
            .unwrap_or_default();
        task.description = cell(Column::Description).unwrap_or_default().to_string();
        task.order = cell(Column::Order)
            .and_then(|s| s.parse().ok())
            .unwrap_or(pending.len() as i32);

        pending.push(PendingTask {
            task,
            parent: cell(Column::Parent).map(str::to_string),
            dependencies: cell(Column::Dependencies)
                .map(|s| {
                    s.split(';')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        });
    }

    // Second pass: resolve references by id, then by name.
    let mut by_name: HashMap<String, TaskId> = HashMap::new();
    for p in &pending {
        by_name.entry(p.task.name.to_lowercase()).or_insert(p.task.id);
    }
    let ids: Vec<TaskId> = pending.iter().map(|p| p.task.id).collect();
    let resolve = |reference: &str| -> Option<TaskId> {
        Uuid::parse_str(reference)
            .ok()
            .filter(|id| ids.contains(id))
            .or_else(|| by_name.get(&reference.to_lowercase()).copied())
    };

    let mut tasks = Vec::with_capacity(pending.len());
    for PendingTask {
        mut task,
        parent,
        dependencies,
    } in pending
    {
        if let Some(reference) = parent.filter(|_| !task.is_project()) {
            match resolve(&reference) {
                Some(pid) if pid != task.id => task.parent_task = Some(pid),
                _ => warn!(task = %task.name, parent = %reference, "parent task not found"),
            }
        }

        if !task.is_project() && task.parent_task.is_none() {
            warn!(task = %task.name, "skipping task without a project");
            skipped += 1;
            continue;
        }

        for reference in dependencies {
            match resolve(&reference) {
                Some(dep) => {
                    task.dependencies.insert(dep);
                }
                None => warn!(task = %task.name, dependency = %reference, "dependency not found"),
            }
        }
        tasks.push(task);
    }

    if tasks.is_empty() {
        return Err(StoreError::NoTasks { skipped });
    }

    Ok((tasks, skipped))
}
