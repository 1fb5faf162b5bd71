//! The scheduling engine.
//!
//! - [`graph`] analyses dependency edges: cycles, topological order,
//!   transitive dependents and dangling references.
//! - [`propagate`] recomputes task dates inside one project.
//! - [`aggregate`] derives a project's end date, duration and progress.
//! - [`critical_path`] computes slack and the critical chain.
//! - [`facade`] is the only way a task list gets changed.

pub mod aggregate;
pub mod critical_path;
pub mod facade;
pub mod graph;
pub mod propagate;

pub use aggregate::{aggregate, aggregate_with, summarize, MilestoneProgress, ProjectMetrics, ProjectSummary};
pub use critical_path::{critical_path, CriticalPath};
pub use facade::{apply_task_change, apply_task_change_with, audit, reschedule, TaskChange};
pub use graph::{
    dangling_dependencies, dependents_of, detect_cycle, find_cycle, project_scope, topological_order,
};
pub use propagate::propagate;
