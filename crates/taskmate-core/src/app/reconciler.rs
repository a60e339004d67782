//! SubtaskReconciler - 編集後のサブタスク一覧をストアに反映
//!
//! # フロー
//! 1. 保存済みサブタスクの id を取得
//! 2. 希望リストを「既存（Persisted）」と「新規（Pending）」に分割
//! 3. 希望リストにない保存済み id を一括削除（空なら呼ばない）
//! 4. 既存サブタスクを 1 件ずつ更新
//! 5. 新規サブタスクを 1 件ずつ挿入
//!
//! 最初の失敗で中断します。ロールバックはしません。

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{
    NewSubtask, Subtask, SubtaskChanges, SubtaskId, SubtaskKey, SubtaskRecord, TaskId,
    TaskMateError,
};
use crate::ports::{Clock, TaskStore};

/// How existing subtasks are written back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileMode {
    /// Every existing subtask is updated, changed or not.
    #[default]
    AlwaysWrite,
    /// Existing subtasks whose title and completion match the stored row are
    /// left alone.
    SkipUnchanged,
}

/// What one reconciliation sent to the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub deleted: usize,
    pub updated: usize,
    pub skipped: usize,
    pub inserted: usize,
}

impl ReconcileReport {
    /// Remote writes issued; the batched delete counts once.
    pub fn writes(&self) -> usize {
        usize::from(self.deleted > 0) + self.updated + self.inserted
    }
}

pub struct SubtaskReconciler {
    store: Arc<dyn TaskStore>,
    clock: Arc<dyn Clock>,
    mode: ReconcileMode,
}

impl SubtaskReconciler {
    pub fn new(store: Arc<dyn TaskStore>, clock: Arc<dyn Clock>, mode: ReconcileMode) -> Self {
        Self { store, clock, mode }
    }

    pub fn mode(&self) -> ReconcileMode {
        self.mode
    }

    /// Make the stored subtasks of `task_id` match `desired`.
    pub async fn reconcile(
        &self,
        task_id: &TaskId,
        desired: &[Subtask],
    ) -> Result<ReconcileReport, TaskMateError> {
        let stored = self.stored(task_id).await?;

        let mut existing = Vec::new();
        let mut fresh = Vec::new();
        for subtask in desired {
            match &subtask.key {
                SubtaskKey::Persisted { id } => existing.push((id, subtask)),
                SubtaskKey::Pending { .. } => fresh.push(subtask),
            }
        }

        let keep: HashSet<&SubtaskId> = existing.iter().map(|(id, _)| *id).collect();
        let doomed: Vec<SubtaskId> = stored
            .keys()
            .filter(|id| !keep.contains(id))
            .cloned()
            .collect();

        debug!(
            task_id = %task_id,
            delete = doomed.len(),
            update = existing.len(),
            insert = fresh.len(),
            mode = ?self.mode,
            "reconciling subtasks"
        );

        let mut report = ReconcileReport::default();

        if !doomed.is_empty() {
            self.store
                .delete_subtasks(&doomed)
                .await
                .map_err(|e| TaskMateError::remote(e, report.writes()))?;
            report.deleted = doomed.len();
        }

        for (id, subtask) in existing {
            if self.mode == ReconcileMode::SkipUnchanged
                && let Some(Some(row)) = stored.get(id)
                && row.title == subtask.title
                && row.completed == subtask.completed
            {
                report.skipped += 1;
                continue;
            }
            let changes = SubtaskChanges {
                title: subtask.title.clone(),
                completed: subtask.completed,
                updated_at: self.clock.now(),
            };
            self.store
                .update_subtask(id, changes)
                .await
                .map_err(|e| TaskMateError::remote(e, report.writes()))?;
            report.updated += 1;
        }

        for subtask in fresh {
            let row = NewSubtask {
                task_id: task_id.clone(),
                title: subtask.title.clone(),
                completed: subtask.completed,
            };
            self.store
                .insert_subtask(row)
                .await
                .map_err(|e| TaskMateError::remote(e, report.writes()))?;
            report.inserted += 1;
        }

        debug!(task_id = %task_id, writes = report.writes(), "subtasks reconciled");
        Ok(report)
    }

    /// Stored ids, with full rows when the mode needs them for comparison.
    async fn stored(
        &self,
        task_id: &TaskId,
    ) -> Result<HashMap<SubtaskId, Option<SubtaskRecord>>, TaskMateError> {
        match self.mode {
            ReconcileMode::AlwaysWrite => {
                let ids = self
                    .store
                    .subtask_ids(task_id)
                    .await
                    .map_err(TaskMateError::RemoteWrite)?;
                Ok(ids.into_iter().map(|id| (id, None)).collect())
            }
            ReconcileMode::SkipUnchanged => {
                let rows = self
                    .store
                    .list_subtasks(std::slice::from_ref(task_id))
                    .await
                    .map_err(TaskMateError::RemoteWrite)?;
                Ok(rows.into_iter().map(|r| (r.id.clone(), Some(r))).collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::task::fixtures::at;
    use crate::domain::{LocalKey, NewTask, StoreError, TaskStatus, UserId};
    use crate::impls::{InMemoryTaskStore, StoreOp};
    use crate::ports::FixedClock;
    use ulid::Ulid;

    struct Harness {
        store: Arc<InMemoryTaskStore>,
        clock: Arc<FixedClock>,
        task_id: TaskId,
    }

    impl Harness {
        async fn new() -> Self {
            let clock = Arc::new(FixedClock::new(at(8)));
            let store = Arc::new(InMemoryTaskStore::with_clock(clock.clone()));
            let task = store
                .insert_task(NewTask {
                    title: "Write spec".into(),
                    description: String::new(),
                    status: TaskStatus::Todo,
                    user_id: UserId::new("user-1"),
                    due_date: None,
                    priority: None,
                    tags: Vec::new(),
                })
                .await
                .unwrap();
            Self {
                store,
                clock,
                task_id: task.id,
            }
        }

        fn reconciler(&self, mode: ReconcileMode) -> SubtaskReconciler {
            SubtaskReconciler::new(self.store.clone(), self.clock.clone(), mode)
        }

        async fn seed(&self, title: &str, completed: bool) -> Subtask {
            let row = self
                .store
                .insert_subtask(NewSubtask {
                    task_id: self.task_id.clone(),
                    title: title.into(),
                    completed,
                })
                .await
                .unwrap();
            row.into()
        }
    }

    fn pending(title: &str) -> Subtask {
        Subtask::pending(LocalKey::from_ulid(Ulid::new()), title)
    }

    #[tokio::test]
    async fn empty_list_deletes_everything() {
        let h = Harness::new().await;
        h.seed("a", false).await;
        h.seed("b", true).await;
        h.store.clear_calls().await;

        let report = h
            .reconciler(ReconcileMode::AlwaysWrite)
            .reconcile(&h.task_id, &[])
            .await
            .unwrap();

        assert_eq!(report.deleted, 2);
        assert_eq!(report.writes(), 1);
        assert!(h.store.subtasks_of(&h.task_id).await.is_empty());
        assert_eq!(
            h.store.calls().await,
            vec![StoreOp::SubtaskIds, StoreOp::DeleteSubtasks]
        );
    }

    #[tokio::test]
    async fn nothing_to_delete_skips_the_delete_call() {
        let h = Harness::new().await;
        let kept = h.seed("a", false).await;
        h.store.clear_calls().await;

        h.reconciler(ReconcileMode::AlwaysWrite)
            .reconcile(&h.task_id, &[kept])
            .await
            .unwrap();

        assert!(!h.store.calls().await.contains(&StoreOp::DeleteSubtasks));
    }

    #[tokio::test]
    async fn mixed_list_deletes_updates_and_inserts() {
        let h = Harness::new().await;
        let mut kept = h.seed("keep", false).await;
        h.seed("drop", false).await;
        kept.completed = true;
        kept.title = "keep (done)".into();

        let report = h
            .reconciler(ReconcileMode::AlwaysWrite)
            .reconcile(&h.task_id, &[kept.clone(), pending("new")])
            .await
            .unwrap();

        assert_eq!(
            report,
            ReconcileReport {
                deleted: 1,
                updated: 1,
                skipped: 0,
                inserted: 1
            }
        );
        let rows = h.store.subtasks_of(&h.task_id).await;
        let titles: Vec<_> = rows.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["keep (done)", "new"]);
        assert!(rows[0].completed);
        assert!(!rows[1].completed);
    }

    #[tokio::test]
    async fn always_write_rewrites_unchanged_subtasks() {
        let h = Harness::new().await;
        let a = h.seed("a", false).await;
        let b = h.seed("b", true).await;
        let reconciler = h.reconciler(ReconcileMode::AlwaysWrite);
        reconciler
            .reconcile(&h.task_id, &[a.clone(), b.clone()])
            .await
            .unwrap();
        h.store.clear_calls().await;

        let report = reconciler.reconcile(&h.task_id, &[a, b]).await.unwrap();

        assert_eq!(report.updated, 2);
        assert_eq!(h.store.write_count().await, 2);
    }

    #[tokio::test]
    async fn skip_unchanged_issues_no_writes_the_second_time() {
        let h = Harness::new().await;
        let a = h.seed("a", false).await;
        let b = h.seed("b", true).await;
        let reconciler = h.reconciler(ReconcileMode::SkipUnchanged);
        reconciler
            .reconcile(&h.task_id, &[a.clone(), b.clone()])
            .await
            .unwrap();
        h.store.clear_calls().await;

        let report = reconciler.reconcile(&h.task_id, &[a, b]).await.unwrap();

        assert_eq!(report.skipped, 2);
        assert_eq!(h.store.write_count().await, 0);
    }

    #[tokio::test]
    async fn update_failure_reports_writes_already_done() {
        let h = Harness::new().await;
        let a = h.seed("a", false).await;
        h.seed("gone", false).await;
        h.store
            .fail_next(StoreOp::UpdateSubtask, StoreError::Transport("offline".into()))
            .await;

        let err = h
            .reconciler(ReconcileMode::AlwaysWrite)
            .reconcile(&h.task_id, &[a, pending("never")])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            TaskMateError::PartialReconciliation { completed_writes: 1, .. }
        ));
        assert!(!h.store.calls().await.contains(&StoreOp::InsertSubtask));
    }

    #[tokio::test]
    async fn first_read_failure_is_a_plain_remote_error() {
        let h = Harness::new().await;
        h.store
            .fail_next(StoreOp::SubtaskIds, StoreError::Transport("offline".into()))
            .await;

        let err = h
            .reconciler(ReconcileMode::AlwaysWrite)
            .reconcile(&h.task_id, &[pending("x")])
            .await
            .unwrap_err();

        assert!(matches!(err, TaskMateError::RemoteWrite(_)));
        assert_eq!(h.store.write_count().await, 0);
    }
}
