//! TaskMutationService - ボードを変更する唯一の入口
//!
//! # 不変条件
//! - ローカル検証（タイトル必須・完了条件）はストア呼び出しの前に行う
//! - ボードはストアへの書き込みがすべて成功した後にだけ更新する
//! - 成功・失敗のどちらでも通知を 1 件出す

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::domain::subtask::all_completed;
use crate::domain::{
    Board, NewTask, Notification, Session, Subtask, Task, TaskChanges, TaskDraft, TaskId,
    TaskMateError, TaskPatch, TaskStatus,
};
use crate::ports::{Clock, Notifier, TaskStore};

use super::board_state::BoardState;
use super::reconciler::SubtaskReconciler;

pub const TITLE_REQUIRED: &str = "Title is required";
pub const INCOMPLETE_SUBTASKS: &str =
    "All subtasks must be completed before marking the task as completed.";

pub struct TaskMutationService {
    store: Arc<dyn TaskStore>,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn Notifier>,
    session: Session,
    board: BoardState,
    reconciler: SubtaskReconciler,
}

impl TaskMutationService {
    pub fn new(
        store: Arc<dyn TaskStore>,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn Notifier>,
        session: Session,
        board: BoardState,
        reconciler: SubtaskReconciler,
    ) -> Self {
        Self {
            store,
            clock,
            notifier,
            session,
            board,
            reconciler,
        }
    }

    pub fn board(&self) -> &BoardState {
        &self.board
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    /// Create a task in `column` (or in `draft.status` when set) and store its
    /// subtasks. The new task goes to the top of its column.
    pub async fn create(&self, column: TaskStatus, draft: TaskDraft) -> Result<Task, TaskMateError> {
        const FAILED: &str = "Error saving task";

        let owner = match self.session.user_id() {
            Ok(owner) => owner.clone(),
            Err(e) => return Err(self.reject(FAILED, e)),
        };
        let title = draft.title.trim();
        if title.is_empty() {
            return Err(self.invalid());
        }
        let status = draft.status.unwrap_or(column);
        if status == TaskStatus::Completed && !all_completed(&draft.subtasks) {
            return Err(self.incomplete());
        }

        let row = NewTask {
            title: title.to_string(),
            description: draft.description.trim().to_string(),
            status,
            user_id: owner,
            due_date: draft.due_date,
            priority: draft.priority,
            tags: draft.tags,
        };
        let mut task = self
            .store
            .insert_task(row)
            .await
            .map_err(|e| self.failed(FAILED, "Failed to save task", TaskMateError::remote(e, 0)))?;

        if !draft.subtasks.is_empty() {
            self.reconciler
                .reconcile(&task.id, &draft.subtasks)
                .await
                .map_err(|e| self.failed(FAILED, "Failed to save task", e.after_writes(1)))?;
        }
        task.subtasks = Some(draft.subtasks);

        self.board
            .apply(|board| board.with_task_prepended(task.clone()));
        info!(task_id = %task.id, status = %task.status, "task created");
        self.notifier.notify(Notification::success(
            "Task created",
            "Your new task has been added",
        ));
        Ok(task)
    }

    /// Apply `patch` to a task on the board. When the patch carries subtasks
    /// they replace the stored ones.
    pub async fn update(&self, task_id: &TaskId, patch: TaskPatch) -> Result<Task, TaskMateError> {
        const FAILED: &str = "Error saving task";

        let Some(current) = self.board.find_task(task_id) else {
            return Err(self.reject(FAILED, TaskMateError::TaskNotFound(task_id.clone())));
        };

        let mut patch = patch;
        if let Some(title) = patch.title.as_mut() {
            let trimmed = title.trim();
            if trimmed.is_empty() {
                return Err(self.invalid());
            }
            *title = trimmed.to_string();
        }
        if let Some(description) = patch.description.as_mut() {
            *description = description.trim().to_string();
        }
        let status = patch.status.unwrap_or(current.status);
        let subtasks: &[Subtask] = patch.subtasks.as_deref().unwrap_or(current.subtasks());
        if status == TaskStatus::Completed && !all_completed(subtasks) {
            return Err(self.incomplete());
        }

        let updated_at = current.next_updated_at(self.clock.now());
        self.store
            .update_task(task_id, patch.to_changes(updated_at))
            .await
            .map_err(|e| self.failed(FAILED, "Failed to update task", TaskMateError::remote(e, 0)))?;

        if let Some(desired) = &patch.subtasks {
            self.reconciler
                .reconcile(task_id, desired)
                .await
                .map_err(|e| self.failed(FAILED, "Failed to update task", e.after_writes(1)))?;
        }

        let mut replaced = None;
        self.board.apply(|board| match board.find_task(task_id) {
            Some(latest) => {
                let next = patch.apply_to(latest, updated_at);
                replaced = Some(next.clone());
                board.with_task_replaced(next)
            }
            None => board.clone(),
        });
        let updated = match replaced {
            Some(task) => task,
            None => {
                debug!(task_id = %task_id, "task left the board while saving");
                patch.apply_to(&current, updated_at)
            }
        };
        info!(task_id = %task_id, status = %updated.status, "task updated");
        self.notifier.notify(Notification::success(
            "Task updated",
            "Your changes have been saved",
        ));
        Ok(updated)
    }

    /// Move a task between columns. Same-column moves do nothing and return
    /// `None`.
    pub async fn move_task(
        &self,
        task_id: &TaskId,
        from: TaskStatus,
        to: TaskStatus,
    ) -> Result<Option<Task>, TaskMateError> {
        const FAILED: &str = "Error updating task";

        if from == to {
            return Ok(None);
        }
        let Some(current) = self.board.find_task(task_id) else {
            return Err(self.reject(FAILED, TaskMateError::TaskNotFound(task_id.clone())));
        };
        if to == TaskStatus::Completed && !all_completed(current.subtasks()) {
            return Err(self.incomplete());
        }

        let updated_at = current.next_updated_at(self.clock.now());
        self.store
            .update_task(task_id, TaskChanges::status(to, updated_at))
            .await
            .map_err(|e| {
                self.failed(
                    FAILED,
                    "Failed to update task status",
                    TaskMateError::remote(e, 0),
                )
            })?;

        let mut placed = None;
        self.board.apply(|board| match board.find_task(task_id) {
            Some(latest) => {
                let next = Task {
                    status: to,
                    updated_at,
                    ..latest.clone()
                };
                placed = Some(next.clone());
                board.with_task_removed(task_id).with_task_prepended(next)
            }
            None => board.clone(),
        });
        let moved = match placed {
            Some(task) => task,
            None => {
                debug!(task_id = %task_id, "task left the board while moving");
                Task {
                    status: to,
                    updated_at,
                    ..current
                }
            }
        };
        info!(task_id = %task_id, from = %from, to = %to, "task moved");
        self.notifier.notify(Notification::success(
            "Task moved",
            format!("\"{}\" moved to {}", moved.title, to.title()),
        ));
        Ok(Some(moved))
    }

    /// Delete a task and its subtasks. Tasks missing from the board are still
    /// deleted remotely.
    pub async fn delete(&self, task_id: &TaskId) -> Result<(), TaskMateError> {
        const FAILED: &str = "Error deleting task";
        const FALLBACK: &str = "Failed to delete task";

        self.store
            .delete_subtasks_of(task_id)
            .await
            .map_err(|e| self.failed(FAILED, FALLBACK, TaskMateError::remote(e, 0)))?;
        self.store
            .delete_task(task_id)
            .await
            .map_err(|e| self.failed(FAILED, FALLBACK, TaskMateError::remote(e, 1)))?;

        self.board.apply(|board| board.with_task_removed(task_id));
        info!(task_id = %task_id, "task deleted");
        self.notifier.notify(Notification::success(
            "Task deleted",
            "The task has been deleted successfully",
        ));
        Ok(())
    }

    /// Replace the whole board after a full load.
    pub(crate) fn replace_board(&self, board: Board) {
        self.board.replace(board);
    }

    fn invalid(&self) -> TaskMateError {
        warn!("rejected task without a title");
        self.notifier
            .notify(Notification::failure_title(TITLE_REQUIRED));
        TaskMateError::Validation(TITLE_REQUIRED.to_string())
    }

    fn incomplete(&self) -> TaskMateError {
        warn!("rejected completion with open subtasks");
        self.notifier
            .notify(Notification::failure("Cannot complete task", INCOMPLETE_SUBTASKS));
        TaskMateError::BusinessRule(INCOMPLETE_SUBTASKS.to_string())
    }

    fn reject(&self, title: &str, err: TaskMateError) -> TaskMateError {
        warn!(error = %err, "{title}");
        self.notifier
            .notify(Notification::failure(title, err.to_string()));
        err
    }

    fn failed(&self, title: &str, fallback: &str, err: TaskMateError) -> TaskMateError {
        error!(error = %err, "{title}");
        self.notifier
            .notify(Notification::failure(title, err.user_message(fallback)));
        err
    }
}
