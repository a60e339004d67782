//! Drag-and-drop between columns.
//!
//! A gesture is `start` followed by exactly one `end` or `cancel`. The
//! controller is back to idle afterwards whatever the outcome.

use std::sync::Arc;

use tracing::debug;

use crate::domain::subtask::all_completed;
use crate::domain::{Notification, Task, TaskMateError, TaskStatus};

use super::mutation::{INCOMPLETE_SUBTASKS, TaskMutationService};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    /// Snapshot of the task taken when the gesture began.
    Dragging { task: Task },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// Released outside any column, or no gesture was active.
    NoTarget,
    /// Released over the column the task already sits in.
    SameColumn,
    Moved(Task),
}

pub struct DragController {
    service: Arc<TaskMutationService>,
    state: DragState,
}

impl DragController {
    pub fn new(service: Arc<TaskMutationService>) -> Self {
        Self {
            service,
            state: DragState::Idle,
        }
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    /// The task being dragged, for the overlay card.
    pub fn active(&self) -> Option<&Task> {
        match &self.state {
            DragState::Dragging { task } => Some(task),
            DragState::Idle => None,
        }
    }

    pub fn start(&mut self, task: Task) {
        debug!(task_id = %task.id, "drag started");
        self.state = DragState::Dragging { task };
    }

    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
    }

    /// Release over the drop target identified by `over` (a column identifier,
    /// or anything else the pointer happened to be over).
    pub async fn end(&mut self, over: Option<&str>) -> Result<DropOutcome, TaskMateError> {
        let target = over.and_then(|id| id.parse::<TaskStatus>().ok());
        self.drop_on(target).await
    }

    /// Release over `target`, `None` meaning no column.
    pub async fn drop_on(
        &mut self,
        target: Option<TaskStatus>,
    ) -> Result<DropOutcome, TaskMateError> {
        let DragState::Dragging { task } = std::mem::take(&mut self.state) else {
            return Ok(DropOutcome::NoTarget);
        };
        let Some(target) = target else {
            return Ok(DropOutcome::NoTarget);
        };
        if target == task.status {
            return Ok(DropOutcome::SameColumn);
        }
        if target == TaskStatus::Completed && !all_completed(task.subtasks()) {
            debug!(task_id = %task.id, "drop rejected by open subtasks");
            self.service
                .notifier()
                .notify(Notification::failure("Cannot complete task", INCOMPLETE_SUBTASKS));
            return Err(TaskMateError::BusinessRule(INCOMPLETE_SUBTASKS.to_string()));
        }

        match self.service.move_task(&task.id, task.status, target).await? {
            Some(moved) => Ok(DropOutcome::Moved(moved)),
            None => Ok(DropOutcome::SameColumn),
        }
    }
}
