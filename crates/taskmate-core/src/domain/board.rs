//! Board model: three status columns of tasks.
//!
//! The board is a value. Every `with_*` method returns a new board that shares
//! the untouched columns with the old one (`Arc`), so only the affected column
//! is copied.

use std::sync::Arc;

use serde::Serialize;

use super::ids::TaskId;
use super::state::TaskStatus;
use super::task::Task;

/// Tasks of one status, most recently affected first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub status: TaskStatus,
    pub title: &'static str,
    pub tasks: Vec<Task>,
}

impl Column {
    pub fn empty(status: TaskStatus) -> Self {
        Self {
            status,
            title: status.title(),
            tasks: Vec::new(),
        }
    }

    pub fn position(&self, task_id: &TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| &t.id == task_id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Exactly one column per [`TaskStatus`], in [`TaskStatus::ALL`] order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Board {
    columns: [Arc<Column>; 3],
}

impl Default for Board {
    fn default() -> Self {
        Self::empty()
    }
}

impl Board {
    pub fn empty() -> Self {
        Self {
            columns: TaskStatus::ALL.map(|s| Arc::new(Column::empty(s))),
        }
    }

    /// Group tasks by status, keeping their relative order.
    pub fn from_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        let mut columns = TaskStatus::ALL.map(Column::empty);
        for task in tasks {
            columns[task.status.index()].tasks.push(task);
        }
        Self {
            columns: columns.map(Arc::new),
        }
    }

    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().map(|c| c.as_ref())
    }

    pub fn find_column(&self, status: TaskStatus) -> &Column {
        &self.columns[status.index()]
    }

    /// Linear scan; does not trust the task's own status field.
    pub fn find_task_owning_column(&self, task_id: &TaskId) -> Option<TaskStatus> {
        self.columns()
            .find(|c| c.position(task_id).is_some())
            .map(|c| c.status)
    }

    pub fn find_task(&self, task_id: &TaskId) -> Option<&Task> {
        self.columns()
            .flat_map(|c| c.tasks.iter())
            .find(|t| &t.id == task_id)
    }

    pub fn task_count(&self) -> usize {
        self.columns().map(Column::len).sum()
    }

    /// Put `task` at the head of the column matching its status.
    pub fn with_task_prepended(&self, task: Task) -> Self {
        self.with_column(task.status, |column| column.tasks.insert(0, task))
    }

    /// Remove `task_id` from whichever column holds it.
    pub fn with_task_removed(&self, task_id: &TaskId) -> Self {
        match self.find_task_owning_column(task_id) {
            Some(status) => self.with_column(status, |column| {
                column.tasks.retain(|t| &t.id != task_id);
            }),
            None => self.clone(),
        }
    }

    /// Replace a task. Stays in place when the status is unchanged, otherwise
    /// leaves its old column and is prepended to the new one. A task no column
    /// holds is not added.
    pub fn with_task_replaced(&self, task: Task) -> Self {
        match self.find_task_owning_column(&task.id) {
            Some(status) if status == task.status => self.with_column(status, |column| {
                if let Some(i) = column.position(&task.id) {
                    column.tasks[i] = task;
                }
            }),
            Some(_) => self.with_task_removed(&task.id).with_task_prepended(task),
            None => self.clone(),
        }
    }

    fn with_column(&self, status: TaskStatus, edit: impl FnOnce(&mut Column)) -> Self {
        let mut columns = self.columns.clone();
        edit(Arc::make_mut(&mut columns[status.index()]));
        Self { columns }
    }

    /// `true` when every task sits in the column matching its status.
    pub fn is_consistent(&self) -> bool {
        self.columns()
            .all(|c| c.tasks.iter().all(|t| t.status == c.status))
    }

    #[cfg(test)]
    pub(crate) fn shares_column_with(&self, other: &Board, status: TaskStatus) -> bool {
        Arc::ptr_eq(&self.columns[status.index()], &other.columns[status.index()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::task::fixtures::task;

    fn ids(column: &Column) -> Vec<&str> {
        column.tasks.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn from_tasks_partitions_by_status() {
        let board = Board::from_tasks(vec![
            task("a", TaskStatus::Todo),
            task("b", TaskStatus::Completed),
            task("c", TaskStatus::Todo),
        ]);
        assert_eq!(ids(board.find_column(TaskStatus::Todo)), vec!["a", "c"]);
        assert!(board.find_column(TaskStatus::Progress).is_empty());
        assert_eq!(ids(board.find_column(TaskStatus::Completed)), vec!["b"]);
        assert!(board.is_consistent());
        assert_eq!(board.task_count(), 3);
    }

    #[test]
    fn columns_follow_status_order() {
        let board = Board::empty();
        let titles: Vec<_> = board.columns().map(|c| c.title).collect();
        assert_eq!(titles, vec!["To Do", "In Progress", "Completed"]);
    }

    #[test]
    fn prepend_puts_task_first_and_shares_other_columns() {
        let board = Board::from_tasks(vec![task("a", TaskStatus::Todo)]);
        let next = board.with_task_prepended(task("b", TaskStatus::Todo));

        assert_eq!(ids(next.find_column(TaskStatus::Todo)), vec!["b", "a"]);
        assert_eq!(ids(board.find_column(TaskStatus::Todo)), vec!["a"]);
        assert!(next.shares_column_with(&board, TaskStatus::Progress));
        assert!(next.shares_column_with(&board, TaskStatus::Completed));
        assert!(!next.shares_column_with(&board, TaskStatus::Todo));
    }

    #[test]
    fn owning_column_is_found_by_scan() {
        // status field drifted from the column it sits in
        let mut drifted = task("a", TaskStatus::Todo);
        let board = Board::from_tasks(vec![drifted.clone()]);
        drifted.status = TaskStatus::Completed;
        let board = board.with_column(TaskStatus::Todo, |c| c.tasks[0] = drifted);

        assert_eq!(
            board.find_task_owning_column(&TaskId::new("a")),
            Some(TaskStatus::Todo)
        );
        let removed = board.with_task_removed(&TaskId::new("a"));
        assert_eq!(removed.task_count(), 0);
    }

    #[test]
    fn replace_in_same_column_keeps_position() {
        let board = Board::from_tasks(vec![
            task("a", TaskStatus::Todo),
            task("b", TaskStatus::Todo),
        ]);
        let mut edited = task("b", TaskStatus::Todo);
        edited.title = "edited".to_string();

        let next = board.with_task_replaced(edited);
        let column = next.find_column(TaskStatus::Todo);
        assert_eq!(ids(column), vec!["a", "b"]);
        assert_eq!(column.tasks[1].title, "edited");
    }

    #[test]
    fn replace_with_new_status_moves_to_head_of_target() {
        let board = Board::from_tasks(vec![
            task("a", TaskStatus::Todo),
            task("b", TaskStatus::Progress),
        ]);
        let next = board.with_task_replaced(task("a", TaskStatus::Progress));

        assert!(next.find_column(TaskStatus::Todo).is_empty());
        assert_eq!(ids(next.find_column(TaskStatus::Progress)), vec!["a", "b"]);
        assert!(next.is_consistent());
    }

    #[test]
    fn replacing_unknown_task_is_a_noop() {
        let board = Board::from_tasks(vec![task("a", TaskStatus::Todo)]);
        let next = board.with_task_replaced(task("gone", TaskStatus::Progress));
        assert_eq!(next, board);
        assert!(next.find_task(&TaskId::new("gone")).is_none());
    }

    #[test]
    fn removing_unknown_task_is_a_noop() {
        let board = Board::from_tasks(vec![task("a", TaskStatus::Todo)]);
        let next = board.with_task_removed(&TaskId::new("zzz"));
        assert_eq!(next, board);
    }
}
