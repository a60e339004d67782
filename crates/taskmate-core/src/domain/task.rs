//! Task model: the stored row, the create draft, and the edit patch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{TaskId, UserId};
use super::state::{Priority, TaskStatus};
use super::subtask::Subtask;

/// A user-owned unit of work.
///
/// `subtasks` is not part of the task row; loaders attach it after a join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: TaskStatus,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtasks: Option<Vec<Subtask>>,
}

impl Task {
    /// Subtasks currently attached (empty when none were loaded).
    pub fn subtasks(&self) -> &[Subtask] {
        self.subtasks.as_deref().unwrap_or(&[])
    }

    /// Next `updated_at` value: never earlier than the current one.
    pub fn next_updated_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.max(self.updated_at)
    }
}

/// Insert payload for a task row. The store assigns the identifier and
/// timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub user_id: UserId,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: Option<Priority>,
    pub tags: Vec<String>,
}

/// Column values to overwrite on a task row. `None` leaves a column alone.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub priority: Option<Option<Priority>>,
    pub tags: Option<Option<Vec<String>>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl TaskChanges {
    /// Status-only change used by moves.
    pub fn status(status: TaskStatus, updated_at: DateTime<Utc>) -> Self {
        Self {
            status: Some(status),
            updated_at: Some(updated_at),
            ..Self::default()
        }
    }
}

/// Form contents for a new task.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    /// Falls back to the column the dialog was opened for.
    pub status: Option<TaskStatus>,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: Option<Priority>,
    pub tags: Vec<String>,
    pub subtasks: Vec<Subtask>,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_subtasks(mut self, subtasks: Vec<Subtask>) -> Self {
        self.subtasks = subtasks;
        self
    }
}

/// Partial edit of an existing task.
///
/// Outer `None` means "unchanged"; for nullable columns `Some(None)` clears
/// the value. `subtasks`, when present, is the desired final list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub priority: Option<Option<Priority>>,
    pub tags: Option<Option<Vec<String>>>,
    pub subtasks: Option<Vec<Subtask>>,
}

impl TaskPatch {
    pub fn description(description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..Self::default()
        }
    }

    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn with_subtasks(mut self, subtasks: Vec<Subtask>) -> Self {
        self.subtasks = Some(subtasks);
        self
    }

    /// Row columns to write for this patch.
    pub fn to_changes(&self, updated_at: DateTime<Utc>) -> TaskChanges {
        TaskChanges {
            title: self.title.clone(),
            description: self.description.clone(),
            status: self.status,
            due_date: self.due_date,
            priority: self.priority,
            tags: self.tags.clone(),
            updated_at: Some(updated_at),
        }
    }

    /// Merge this patch into `task`. Fields the patch leaves out are kept as-is.
    pub fn apply_to(&self, task: &Task, updated_at: DateTime<Utc>) -> Task {
        let mut next = task.clone();
        if let Some(title) = &self.title {
            next.title = title.clone();
        }
        if let Some(description) = &self.description {
            next.description = description.clone();
        }
        if let Some(status) = self.status {
            next.status = status;
        }
        if let Some(due_date) = self.due_date {
            next.due_date = due_date;
        }
        if let Some(priority) = self.priority {
            next.priority = priority;
        }
        if let Some(tags) = &self.tags {
            next.tags = tags.clone();
        }
        if let Some(subtasks) = &self.subtasks {
            next.subtasks = Some(subtasks.clone());
        }
        next.updated_at = updated_at;
        next
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::{at, task};
    use super::*;

    #[test]
    fn description_patch_keeps_other_fields() {
        let mut original = task("t-1", TaskStatus::Progress);
        original.due_date = Some(at(20));
        original.tags = Some(vec!["ops".to_string(), "ops".to_string()]);
        original.priority = Some(Priority::High);

        let edited = TaskPatch::description("new words").apply_to(&original, at(9));

        assert_eq!(edited.title, original.title);
        assert_eq!(edited.status, original.status);
        assert_eq!(edited.due_date, original.due_date);
        assert_eq!(edited.tags, original.tags);
        assert_eq!(edited.priority, original.priority);
        assert_eq!(edited.description, "new words");
        assert_eq!(edited.updated_at, at(9));
    }

    #[test]
    fn nullable_fields_can_be_cleared() {
        let mut original = task("t-1", TaskStatus::Todo);
        original.due_date = Some(at(20));
        let patch = TaskPatch {
            due_date: Some(None),
            ..TaskPatch::default()
        };
        assert_eq!(patch.apply_to(&original, at(9)).due_date, None);
    }

    #[test]
    fn changes_only_carry_patched_columns() {
        let changes = TaskPatch::title("renamed").to_changes(at(9));
        assert_eq!(changes.title.as_deref(), Some("renamed"));
        assert_eq!(changes.status, None);
        assert_eq!(changes.tags, None);
        assert_eq!(changes.updated_at, Some(at(9)));
    }

    #[test]
    fn updated_at_never_goes_backwards() {
        let t = task("t-1", TaskStatus::Todo);
        assert_eq!(t.next_updated_at(at(7)), at(8));
        assert_eq!(t.next_updated_at(at(10)), at(10));
    }

    #[test]
    fn task_row_deserializes_without_optional_columns() {
        let json = r#"{
            "id": "t-1",
            "title": "Write spec",
            "status": "todo",
            "user_id": "user-1",
            "created_at": "2024-05-01T08:00:00Z",
            "updated_at": "2024-05-01T08:00:00Z"
        }"#;
        let t: Task = serde_json::from_str(json).unwrap();
        assert_eq!(t.status, TaskStatus::Todo);
        assert!(t.subtasks().is_empty());
        assert_eq!(t.tags, None);
    }
}
