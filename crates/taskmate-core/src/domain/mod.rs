//! Domain model (IDs, tasks, subtasks, board, errors, analytics, ...).

pub mod board;
pub mod calendar;
pub mod errors;
pub mod events;
pub mod ids;
pub mod session;
pub mod state;
pub mod stats;
pub mod subtask;
pub mod task;

pub use board::{Board, Column};
pub use errors::{StoreError, TaskMateError};
pub use events::{Notification, NotificationLevel};
pub use ids::{LocalKey, SubtaskId, SubtaskKey, TaskId, UserId};
pub use session::Session;
pub use state::{Priority, TaskStatus, UnknownStatus};
pub use stats::TaskStats;
pub use subtask::{NewSubtask, Subtask, SubtaskChanges, SubtaskRecord};
pub use task::{NewTask, Task, TaskChanges, TaskDraft, TaskPatch};
