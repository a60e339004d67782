//! TaskStore port - ホスト型リレーショナルストアの論理契約
//!
//! tasks / subtasks の 2 テーブルに対する select / insert / update / delete を
//! そのままメソッドにしたものです。ワイヤプロトコルは扱いません。
//!
//! # 設計原則
//! - 1 メソッド = 1 リモート呼び出し（トランザクションで束ねない）
//! - どの呼び出しも `StoreError` で失敗しうる。部分成功は仮定しない
//! - subtasks.task_id は tasks.id への外部キーで、親削除時に cascade される

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    NewSubtask, NewTask, StoreError, SubtaskChanges, SubtaskId, SubtaskRecord, Task, TaskChanges,
    TaskId, UserId,
};

#[async_trait]
pub trait TaskStore: Send + Sync {
    /// `select * from tasks where user_id = ? order by created_at desc`
    async fn list_tasks(&self, owner: &UserId) -> Result<Vec<Task>, StoreError>;

    /// `select * from tasks where user_id = ? and due_date between ? and ?`
    async fn list_tasks_due_between(
        &self,
        owner: &UserId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Task>, StoreError>;

    /// `select * from tasks where user_id = ? and due_date is null`
    async fn list_tasks_without_due_date(&self, owner: &UserId) -> Result<Vec<Task>, StoreError>;

    /// `select * from subtasks where task_id in (?)`
    async fn list_subtasks(&self, task_ids: &[TaskId]) -> Result<Vec<SubtaskRecord>, StoreError>;

    /// `select id from subtasks where task_id = ?`
    async fn subtask_ids(&self, task_id: &TaskId) -> Result<Vec<SubtaskId>, StoreError>;

    /// `insert into tasks (...) returning *`
    async fn insert_task(&self, task: NewTask) -> Result<Task, StoreError>;

    /// `update tasks set ... where id = ?`
    async fn update_task(&self, id: &TaskId, changes: TaskChanges) -> Result<(), StoreError>;

    /// `delete from tasks where id = ?`
    async fn delete_task(&self, id: &TaskId) -> Result<(), StoreError>;

    /// `delete from subtasks where task_id = ?`
    async fn delete_subtasks_of(&self, task_id: &TaskId) -> Result<(), StoreError>;

    /// `delete from subtasks where id in (?)`
    async fn delete_subtasks(&self, ids: &[SubtaskId]) -> Result<(), StoreError>;

    /// `insert into subtasks (...) returning *`
    async fn insert_subtask(&self, subtask: NewSubtask) -> Result<SubtaskRecord, StoreError>;

    /// `update subtasks set ... where id = ?`
    async fn update_subtask(
        &self,
        id: &SubtaskId,
        changes: SubtaskChanges,
    ) -> Result<(), StoreError>;
}
