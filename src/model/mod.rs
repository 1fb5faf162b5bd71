pub mod schedule;
pub mod task;

pub use schedule::Schedule;
pub use task::{is_valid_task, validate_task, Task, TaskId, TaskKind, TaskPriority, TaskStatus};
