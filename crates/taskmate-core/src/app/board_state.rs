//! BoardState - ボードの単一の正本（UI が描画する値）
//!
//! `tokio::sync::watch` に Board の値を載せています。
//! - 変更は Board 全体の差し替え（列単位の copy-on-write）
//! - 描画側は `subscribe()` で変更通知を受け取る
//! - 書き込みはクレート内（ミューテーションサービス・ローダー）からのみ

use std::sync::Arc;

use tokio::sync::watch;

use crate::domain::{Board, Task, TaskId, TaskStatus};

#[derive(Clone)]
pub struct BoardState {
    tx: Arc<watch::Sender<Board>>,
}

impl BoardState {
    pub fn new(board: Board) -> Self {
        let (tx, _rx) = watch::channel(board);
        Self { tx: Arc::new(tx) }
    }

    /// Cheap copy of the current board (columns are shared).
    pub fn snapshot(&self) -> Board {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Board> {
        self.tx.subscribe()
    }

    pub fn find_task(&self, task_id: &TaskId) -> Option<Task> {
        self.tx.borrow().find_task(task_id).cloned()
    }

    pub fn owning_column(&self, task_id: &TaskId) -> Option<TaskStatus> {
        self.tx.borrow().find_task_owning_column(task_id)
    }

    /// Derive the next board from the latest one.
    pub(crate) fn apply(&self, next: impl FnOnce(&Board) -> Board) {
        self.tx.send_modify(|board| *board = next(board));
    }

    pub(crate) fn replace(&self, board: Board) {
        self.tx.send_replace(board);
    }
}

impl Default for BoardState {
    fn default() -> Self {
        Self::new(Board::empty())
    }
}
