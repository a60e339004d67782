//! Subtasks: checklist items owned by exactly one task.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{LocalKey, SubtaskId, SubtaskKey, TaskId};

/// A subtask as held by the board and by edit sessions.
///
/// Items added during an edit session carry a pending key until the next full
/// load replaces them with stored rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    pub key: SubtaskKey,
    pub title: String,
    pub completed: bool,
}

impl Subtask {
    pub fn pending(local_key: LocalKey, title: impl Into<String>) -> Self {
        Self {
            key: SubtaskKey::Pending { local_key },
            title: title.into(),
            completed: false,
        }
    }

    pub fn persisted(id: SubtaskId, title: impl Into<String>, completed: bool) -> Self {
        Self {
            key: SubtaskKey::Persisted { id },
            title: title.into(),
            completed,
        }
    }
}

/// A stored subtask row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtaskRecord {
    pub id: SubtaskId,
    pub task_id: TaskId,
    pub title: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SubtaskRecord> for Subtask {
    fn from(record: SubtaskRecord) -> Self {
        Subtask::persisted(record.id, record.title, record.completed)
    }
}

/// Insert payload for a subtask row. Carries no identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubtask {
    pub task_id: TaskId,
    pub title: String,
    pub completed: bool,
}

/// Update payload for a subtask row, keyed by its identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtaskChanges {
    pub title: String,
    pub completed: bool,
    pub updated_at: DateTime<Utc>,
}

/// `true` when every subtask is done. An empty list always passes.
pub fn all_completed(subtasks: &[Subtask]) -> bool {
    subtasks.iter().all(|s| s.completed)
}
