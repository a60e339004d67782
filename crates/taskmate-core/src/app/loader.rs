//! Read side: full board load, calendar month, analytics.
//!
//! A failed load raises one failure banner and leaves the board untouched.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::domain::calendar::month_bounds;
use crate::domain::{
    Board, Notification, Session, Subtask, Task, TaskId, TaskMateError, TaskStats,
};
use crate::ports::{Clock, Notifier, TaskStore};

pub struct BoardLoader {
    store: Arc<dyn TaskStore>,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn Notifier>,
    session: Session,
}

impl BoardLoader {
    pub fn new(
        store: Arc<dyn TaskStore>,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn Notifier>,
        session: Session,
    ) -> Self {
        Self {
            store,
            clock,
            notifier,
            session,
        }
    }

    /// All of the user's tasks, newest first, grouped into columns.
    pub async fn load_board(&self) -> Result<Board, TaskMateError> {
        let tasks = self
            .load_tasks()
            .await
            .map_err(|e| self.failed("Error fetching tasks", "Failed to load tasks", e))?;
        debug!(count = tasks.len(), "board loaded");
        Ok(Board::from_tasks(tasks))
    }

    /// Tasks due in the month containing `day`, followed by undated tasks.
    pub async fn load_month(&self, day: NaiveDate) -> Result<Vec<Task>, TaskMateError> {
        self.month(day)
            .await
            .map_err(|e| self.failed("Failed to fetch tasks", "Failed to load tasks", e))
    }

    pub async fn load_stats(&self) -> Result<TaskStats, TaskMateError> {
        let owner = self.session.user_id().map_err(|e| {
            self.failed("Error fetching analytics", "Could not load task statistics", e)
        })?;
        let tasks = self.store.list_tasks(owner).await.map_err(|e| {
            self.failed(
                "Error fetching analytics",
                "Could not load task statistics",
                TaskMateError::RemoteRead(e),
            )
        })?;
        Ok(TaskStats::compute(&tasks, self.clock.now()))
    }

    async fn load_tasks(&self) -> Result<Vec<Task>, TaskMateError> {
        let owner = self.session.user_id()?;
        let tasks = self
            .store
            .list_tasks(owner)
            .await
            .map_err(TaskMateError::RemoteRead)?;
        self.with_subtasks(tasks).await
    }

    async fn month(&self, day: NaiveDate) -> Result<Vec<Task>, TaskMateError> {
        let owner = self.session.user_id()?;
        let (start, end) = month_bounds(day);
        let mut tasks = self
            .store
            .list_tasks_due_between(owner, start, end)
            .await
            .map_err(TaskMateError::RemoteRead)?;
        let undated = self
            .store
            .list_tasks_without_due_date(owner)
            .await
            .map_err(TaskMateError::RemoteRead)?;
        tasks.extend(undated);
        debug!(count = tasks.len(), %start, %end, "calendar month loaded");
        self.with_subtasks(tasks).await
    }

    async fn with_subtasks(&self, mut tasks: Vec<Task>) -> Result<Vec<Task>, TaskMateError> {
        if tasks.is_empty() {
            return Ok(tasks);
        }
        let ids: Vec<TaskId> = tasks.iter().map(|t| t.id.clone()).collect();
        let rows = self
            .store
            .list_subtasks(&ids)
            .await
            .map_err(TaskMateError::RemoteRead)?;

        let mut grouped: HashMap<TaskId, Vec<Subtask>> = HashMap::new();
        for row in rows {
            grouped.entry(row.task_id.clone()).or_default().push(row.into());
        }
        for task in &mut tasks {
            task.subtasks = Some(grouped.remove(&task.id).unwrap_or_default());
        }
        Ok(tasks)
    }

    fn failed(&self, title: &str, fallback: &str, err: TaskMateError) -> TaskMateError {
        warn!(error = %err, "{title}");
        self.notifier
            .notify(Notification::failure(title, err.user_message(fallback)));
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::task::fixtures::at;
    use crate::domain::{NewSubtask, NewTask, StoreError, TaskStatus, UserId};
    use crate::impls::{InMemoryTaskStore, RecordingNotifier, StoreOp};
    use crate::ports::FixedClock;
    use chrono::{TimeDelta, TimeZone, Utc};

    fn new_task(title: &str, owner: &str, status: TaskStatus) -> NewTask {
        NewTask {
            title: title.into(),
            description: String::new(),
            status,
            user_id: UserId::new(owner),
            due_date: None,
            priority: None,
            tags: Vec::new(),
        }
    }

    fn setup() -> (Arc<InMemoryTaskStore>, Arc<FixedClock>, BoardLoader) {
        let clock = Arc::new(FixedClock::new(at(8)));
        let store = Arc::new(InMemoryTaskStore::with_clock(clock.clone()));
        let loader = BoardLoader::new(
            store.clone(),
            clock.clone(),
            Arc::new(RecordingNotifier::new()),
            Session::signed_in(UserId::new("user-1")),
        );
        (store, clock, loader)
    }

    #[tokio::test]
    async fn board_groups_by_status_newest_first_with_subtasks() {
        let (store, clock, loader) = setup();
        let old = store
            .insert_task(new_task("old", "user-1", TaskStatus::Todo))
            .await
            .unwrap();
        clock.advance(TimeDelta::minutes(1));
        let new = store
            .insert_task(new_task("new", "user-1", TaskStatus::Todo))
            .await
            .unwrap();
        store
            .insert_task(new_task("theirs", "user-2", TaskStatus::Todo))
            .await
            .unwrap();
        store
            .insert_subtask(NewSubtask {
                task_id: old.id.clone(),
                title: "step".into(),
                completed: true,
            })
            .await
            .unwrap();

        let board = loader.load_board().await.unwrap();

        let todo = &board.find_column(TaskStatus::Todo).tasks;
        let ids: Vec<_> = todo.iter().map(|t| t.id.clone()).collect();
        assert_eq!(ids, vec![new.id.clone(), old.id.clone()]);
        assert_eq!(todo[1].subtasks().len(), 1);
        assert_eq!(todo[0].subtasks, Some(Vec::new()));
    }

    #[tokio::test]
    async fn empty_board_skips_the_subtask_query() {
        let (store, _clock, loader) = setup();
        let board = loader.load_board().await.unwrap();
        assert_eq!(board.task_count(), 0);
        assert_eq!(store.calls().await, vec![StoreOp::ListTasks]);
    }

    #[tokio::test]
    async fn month_includes_undated_tasks() {
        let (store, _clock, loader) = setup();
        let mut due = new_task("due in may", "user-1", TaskStatus::Todo);
        due.due_date = Some(Utc.with_ymd_and_hms(2024, 5, 31, 23, 0, 0).unwrap());
        let mut june = new_task("due in june", "user-1", TaskStatus::Todo);
        june.due_date = Some(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap());
        store.insert_task(due).await.unwrap();
        store.insert_task(june).await.unwrap();
        store
            .insert_task(new_task("someday", "user-1", TaskStatus::Todo))
            .await
            .unwrap();

        let tasks = loader
            .load_month(NaiveDate::from_ymd_opt(2024, 5, 10).unwrap())
            .await
            .unwrap();

        let titles: Vec<_> = tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["due in may", "someday"]);
    }

    #[tokio::test]
    async fn anonymous_session_cannot_load() {
        let store = Arc::new(InMemoryTaskStore::new());
        let loader = BoardLoader::new(
            store.clone(),
            Arc::new(FixedClock::new(at(8))),
            Arc::new(RecordingNotifier::new()),
            Session::anonymous(),
        );
        assert_eq!(
            loader.load_board().await.unwrap_err(),
            TaskMateError::Unauthenticated
        );
        assert!(store.calls().await.is_empty());
    }

    #[tokio::test]
    async fn read_failure_raises_a_banner() {
        let clock = Arc::new(FixedClock::new(at(8)));
        let store = Arc::new(InMemoryTaskStore::with_clock(clock.clone()));
        let notifier = Arc::new(RecordingNotifier::new());
        let loader = BoardLoader::new(
            store.clone(),
            clock,
            notifier.clone(),
            Session::signed_in(UserId::new("user-1")),
        );
        store
            .fail_next(StoreOp::ListTasks, StoreError::Transport(String::new()))
            .await;

        assert!(matches!(
            loader.load_stats().await,
            Err(TaskMateError::RemoteRead(_))
        ));
        let last = notifier.last().unwrap();
        assert_eq!(last.title, "Error fetching analytics");
        assert_eq!(
            last.description.as_deref(),
            Some("Could not load task statistics")
        );
    }

    #[tokio::test]
    async fn stats_count_the_users_tasks() {
        let (store, _clock, loader) = setup();
        store
            .insert_task(new_task("a", "user-1", TaskStatus::Completed))
            .await
            .unwrap();
        store
            .insert_task(new_task("b", "user-1", TaskStatus::Todo))
            .await
            .unwrap();

        let stats = loader.load_stats().await.unwrap();

        assert_eq!(stats.total, 2);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.completion_rate, 50.0);
    }
}
