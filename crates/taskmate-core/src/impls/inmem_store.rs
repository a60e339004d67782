//! InMemoryTaskStore - 開発・テスト用の TaskStore
//!
//! # 学習ポイント
//! - tokio::sync::Mutex で状態を 1 か所に閉じ込める
//! - 外部キー制約と ON DELETE CASCADE の再現
//! - 呼び出しログと失敗注入（テストで「リモート書き込みが発生しなかった」ことを検証する）

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::domain::{
    NewSubtask, NewTask, StoreError, SubtaskChanges, SubtaskId, SubtaskRecord, Task, TaskChanges,
    TaskId, UserId,
};
use crate::ports::{Clock, IdGenerator, SystemClock, TaskStore, UlidGenerator};

/// One kind of remote call, as recorded in the call log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    ListTasks,
    ListTasksDueBetween,
    ListTasksWithoutDueDate,
    ListSubtasks,
    SubtaskIds,
    InsertTask,
    UpdateTask,
    DeleteTask,
    DeleteSubtasksOf,
    DeleteSubtasks,
    InsertSubtask,
    UpdateSubtask,
}

impl StoreOp {
    pub fn is_write(&self) -> bool {
        !matches!(
            self,
            StoreOp::ListTasks
                | StoreOp::ListTasksDueBetween
                | StoreOp::ListTasksWithoutDueDate
                | StoreOp::ListSubtasks
                | StoreOp::SubtaskIds
        )
    }
}

/// In-memory store state.
#[derive(Default)]
struct InMemoryStoreState {
    /// Task rows in insertion order.
    tasks: Vec<Task>,

    /// Subtask rows in insertion order.
    subtasks: Vec<SubtaskRecord>,

    /// Every call that reached the store, failed ones included.
    calls: Vec<StoreOp>,

    /// Injected failures, consumed first-in first-out per matching op.
    failures: VecDeque<(StoreOp, StoreError)>,
}

impl InMemoryStoreState {
    /// Record the call and pop an injected failure for it, if any.
    fn enter(&mut self, op: StoreOp) -> Result<(), StoreError> {
        self.calls.push(op);
        match self.failures.iter().position(|(o, _)| *o == op) {
            Some(i) => match self.failures.remove(i) {
                Some((_, err)) => Err(err),
                None => Ok(()),
            },
            None => Ok(()),
        }
    }

    fn task_exists(&self, id: &TaskId) -> bool {
        self.tasks.iter().any(|t| &t.id == id)
    }

    /// Newest first; later inserts win ties.
    fn owned_tasks(&self, owner: &UserId, keep: impl Fn(&Task) -> bool) -> Vec<Task> {
        let mut rows: Vec<Task> = self
            .tasks
            .iter()
            .rev()
            .filter(|t| &t.user_id == owner && keep(t))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows
    }
}

/// Development store backed by plain vectors.
///
/// # 使用例
/// ```ignore
/// let store = InMemoryTaskStore::new();
/// store.fail_next(StoreOp::UpdateTask, StoreError::Transport("offline".into())).await;
/// ```
pub struct InMemoryTaskStore {
    state: Arc<Mutex<InMemoryStoreState>>,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Stamp rows with `clock` instead of the wall clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Arc::new(Mutex::new(InMemoryStoreState::default())),
            ids: Arc::new(UlidGenerator::new(Arc::clone(&clock))),
            clock,
        }
    }

    /// Make the next call of kind `op` fail with `err`.
    pub async fn fail_next(&self, op: StoreOp, err: StoreError) {
        self.state.lock().await.failures.push_back((op, err));
    }

    /// All calls received so far, in order.
    pub async fn calls(&self) -> Vec<StoreOp> {
        self.state.lock().await.calls.clone()
    }

    pub async fn write_count(&self) -> usize {
        self.state
            .lock()
            .await
            .calls
            .iter()
            .filter(|op| op.is_write())
            .count()
    }

    pub async fn clear_calls(&self) {
        self.state.lock().await.calls.clear();
    }

    /// Direct read of a task row, bypassing the call log.
    pub async fn task(&self, id: &TaskId) -> Option<Task> {
        let state = self.state.lock().await;
        state.tasks.iter().find(|t| &t.id == id).cloned()
    }

    /// Direct read of a task's subtask rows, bypassing the call log.
    pub async fn subtasks_of(&self, task_id: &TaskId) -> Vec<SubtaskRecord> {
        let state = self.state.lock().await;
        state
            .subtasks
            .iter()
            .filter(|s| &s.task_id == task_id)
            .cloned()
            .collect()
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}

impl Default for InMemoryTaskStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn list_tasks(&self, owner: &UserId) -> Result<Vec<Task>, StoreError> {
        let mut state = self.state.lock().await;
        state.enter(StoreOp::ListTasks)?;
        Ok(state.owned_tasks(owner, |_| true))
    }

    async fn list_tasks_due_between(
        &self,
        owner: &UserId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Task>, StoreError> {
        let mut state = self.state.lock().await;
        state.enter(StoreOp::ListTasksDueBetween)?;
        Ok(state.owned_tasks(owner, |t| {
            t.due_date.is_some_and(|due| start <= due && due <= end)
        }))
    }

    async fn list_tasks_without_due_date(&self, owner: &UserId) -> Result<Vec<Task>, StoreError> {
        let mut state = self.state.lock().await;
        state.enter(StoreOp::ListTasksWithoutDueDate)?;
        Ok(state.owned_tasks(owner, |t| t.due_date.is_none()))
    }

    async fn list_subtasks(&self, task_ids: &[TaskId]) -> Result<Vec<SubtaskRecord>, StoreError> {
        let mut state = self.state.lock().await;
        state.enter(StoreOp::ListSubtasks)?;
        Ok(state
            .subtasks
            .iter()
            .filter(|s| task_ids.contains(&s.task_id))
            .cloned()
            .collect())
    }

    async fn subtask_ids(&self, task_id: &TaskId) -> Result<Vec<SubtaskId>, StoreError> {
        let mut state = self.state.lock().await;
        state.enter(StoreOp::SubtaskIds)?;
        Ok(state
            .subtasks
            .iter()
            .filter(|s| &s.task_id == task_id)
            .map(|s| s.id.clone())
            .collect())
    }

    async fn insert_task(&self, task: NewTask) -> Result<Task, StoreError> {
        let now = self.now();
        let mut state = self.state.lock().await;
        state.enter(StoreOp::InsertTask)?;
        if task.title.trim().is_empty() {
            return Err(StoreError::Constraint(
                "tasks.title must not be empty".to_string(),
            ));
        }
        let row = Task {
            id: self.ids.generate_task_id(),
            title: task.title,
            description: task.description,
            status: task.status,
            user_id: task.user_id,
            created_at: now,
            updated_at: now,
            due_date: task.due_date,
            priority: task.priority,
            tags: Some(task.tags),
            subtasks: None,
        };
        state.tasks.push(row.clone());
        Ok(row)
    }

    /// Zero matching rows is not an error, same as `update ... where id = ?`.
    async fn update_task(&self, id: &TaskId, changes: TaskChanges) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        state.enter(StoreOp::UpdateTask)?;
        let Some(row) = state.tasks.iter_mut().find(|t| &t.id == id) else {
            return Ok(());
        };
        if let Some(title) = changes.title {
            if title.trim().is_empty() {
                return Err(StoreError::Constraint(
                    "tasks.title must not be empty".to_string(),
                ));
            }
            row.title = title;
        }
        if let Some(description) = changes.description {
            row.description = description;
        }
        if let Some(status) = changes.status {
            row.status = status;
        }
        if let Some(due_date) = changes.due_date {
            row.due_date = due_date;
        }
        if let Some(priority) = changes.priority {
            row.priority = priority;
        }
        if let Some(tags) = changes.tags {
            row.tags = tags;
        }
        if let Some(updated_at) = changes.updated_at {
            row.updated_at = updated_at;
        }
        Ok(())
    }

    async fn delete_task(&self, id: &TaskId) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        state.enter(StoreOp::DeleteTask)?;
        state.tasks.retain(|t| &t.id != id);
        // ON DELETE CASCADE
        state.subtasks.retain(|s| &s.task_id != id);
        Ok(())
    }

    async fn delete_subtasks_of(&self, task_id: &TaskId) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        state.enter(StoreOp::DeleteSubtasksOf)?;
        state.subtasks.retain(|s| &s.task_id != task_id);
        Ok(())
    }

    async fn delete_subtasks(&self, ids: &[SubtaskId]) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        state.enter(StoreOp::DeleteSubtasks)?;
        state.subtasks.retain(|s| !ids.contains(&s.id));
        Ok(())
    }

    async fn insert_subtask(&self, subtask: NewSubtask) -> Result<SubtaskRecord, StoreError> {
        let now = self.now();
        let mut state = self.state.lock().await;
        state.enter(StoreOp::InsertSubtask)?;
        if !state.task_exists(&subtask.task_id) {
            return Err(StoreError::Constraint(format!(
                "subtasks.task_id {} violates foreign key constraint",
                subtask.task_id
            )));
        }
        let row = SubtaskRecord {
            id: self.ids.generate_subtask_id(),
            task_id: subtask.task_id,
            title: subtask.title,
            completed: subtask.completed,
            created_at: now,
            updated_at: now,
        };
        state.subtasks.push(row.clone());
        Ok(row)
    }

    async fn update_subtask(
        &self,
        id: &SubtaskId,
        changes: SubtaskChanges,
    ) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        state.enter(StoreOp::UpdateSubtask)?;
        if let Some(row) = state.subtasks.iter_mut().find(|s| &s.id == id) {
            row.title = changes.title;
            row.completed = changes.completed;
            row.updated_at = changes.updated_at;
        }
        Ok(())
    }
}
