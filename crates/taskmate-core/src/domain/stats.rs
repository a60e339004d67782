//! Analytics over a user's tasks.
//!
//! Pure functions only; fetching lives in `app::loader`.

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::Serialize;

use super::state::{Priority, TaskStatus};
use super::task::Task;

/// Number of trailing days covered by [`TaskStats::created_by_day`].
pub const CREATED_WINDOW_DAYS: u64 = 14;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PriorityCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub none: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayCount {
    pub date: NaiveDate,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub todo: usize,
    /// Percentage in `0.0..=100.0`.
    pub completion_rate: f64,
    pub overdue: usize,
    /// Mean of `updated_at - created_at` over completed tasks, in days.
    pub average_completion_days: Option<f64>,
    pub by_priority: PriorityCounts,
    /// Tasks created per UTC day, oldest first. Empty when there are no tasks.
    pub created_by_day: Vec<DayCount>,
}

impl TaskStats {
    pub fn compute(tasks: &[Task], now: DateTime<Utc>) -> Self {
        if tasks.is_empty() {
            return Self::default();
        }

        let count = |status: TaskStatus| tasks.iter().filter(|t| t.status == status).count();
        let completed = count(TaskStatus::Completed);

        let mut by_priority = PriorityCounts::default();
        for task in tasks {
            match task.priority {
                Some(Priority::High) => by_priority.high += 1,
                Some(Priority::Medium) => by_priority.medium += 1,
                Some(Priority::Low) => by_priority.low += 1,
                None => by_priority.none += 1,
            }
        }

        let overdue = tasks
            .iter()
            .filter(|t| t.status != TaskStatus::Completed)
            .filter(|t| t.due_date.is_some_and(|due| due < now))
            .count();

        let average_completion_days = (completed > 0).then(|| {
            let total_ms: i64 = tasks
                .iter()
                .filter(|t| t.status == TaskStatus::Completed)
                .map(|t| (t.updated_at - t.created_at).num_milliseconds())
                .sum();
            total_ms as f64 / completed as f64 / MILLIS_PER_DAY
        });

        Self {
            total: tasks.len(),
            completed,
            in_progress: count(TaskStatus::Progress),
            todo: count(TaskStatus::Todo),
            completion_rate: completed as f64 / tasks.len() as f64 * 100.0,
            overdue,
            average_completion_days,
            by_priority,
            created_by_day: created_by_day(tasks, now.date_naive()),
        }
    }
}

const MILLIS_PER_DAY: f64 = 24.0 * 60.0 * 60.0 * 1000.0;

fn created_by_day(tasks: &[Task], today: NaiveDate) -> Vec<DayCount> {
    (0..CREATED_WINDOW_DAYS)
        .rev()
        .filter_map(|back| today.checked_sub_days(Days::new(back)))
        .map(|date| DayCount {
            date,
            count: tasks
                .iter()
                .filter(|t| t.created_at.date_naive() == date)
                .count(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::task::fixtures::{at, task};
    use chrono::{Duration, TimeZone};

    #[test]
    fn empty_input_gives_zeroed_stats() {
        let stats = TaskStats::compute(&[], at(12));
        assert_eq!(stats.total, 0);
        assert_eq!(stats.completion_rate, 0.0);
        assert_eq!(stats.average_completion_days, None);
        assert!(stats.created_by_day.is_empty());
    }

    #[test]
    fn counts_statuses_and_rate() {
        let tasks = vec![
            task("a", TaskStatus::Todo),
            task("b", TaskStatus::Progress),
            task("c", TaskStatus::Completed),
            task("d", TaskStatus::Completed),
        ];
        let stats = TaskStats::compute(&tasks, at(12));
        assert_eq!(stats.total, 4);
        assert_eq!(stats.todo, 1);
        assert_eq!(stats.in_progress, 1);
        assert_eq!(stats.completed, 2);
        assert_eq!(stats.completion_rate, 50.0);
        assert_eq!(stats.by_priority.none, 4);
    }

    #[test]
    fn overdue_ignores_completed_and_undated() {
        let mut late = task("a", TaskStatus::Todo);
        late.due_date = Some(at(10));
        let mut late_but_done = task("b", TaskStatus::Completed);
        late_but_done.due_date = Some(at(10));
        let mut future = task("c", TaskStatus::Progress);
        future.due_date = Some(at(20));
        let undated = task("d", TaskStatus::Todo);

        let stats = TaskStats::compute(&[late, late_but_done, future, undated], at(12));
        assert_eq!(stats.overdue, 1);
    }

    #[test]
    fn average_completion_is_in_days() {
        let mut one = task("a", TaskStatus::Completed);
        one.updated_at = one.created_at + Duration::days(1);
        let mut three = task("b", TaskStatus::Completed);
        three.updated_at = three.created_at + Duration::days(3);

        let stats = TaskStats::compute(&[one, three], at(12));
        assert_eq!(stats.average_completion_days, Some(2.0));
    }

    #[test]
    fn created_by_day_covers_last_two_weeks_oldest_first() {
        let now = Utc.with_ymd_and_hms(2024, 5, 14, 9, 0, 0).unwrap();
        let mut today = task("a", TaskStatus::Todo);
        today.created_at = now;
        let mut old = task("b", TaskStatus::Todo);
        old.created_at = Utc.with_ymd_and_hms(2024, 4, 1, 9, 0, 0).unwrap();

        let stats = TaskStats::compute(&[today, old], now);
        assert_eq!(stats.created_by_day.len(), 14);
        assert_eq!(
            stats.created_by_day[0].date,
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
        );
        let last = stats.created_by_day.last().unwrap();
        assert_eq!(last.date, now.date_naive());
        assert_eq!(last.count, 1);
        let total: usize = stats.created_by_day.iter().map(|d| d.count).sum();
        assert_eq!(total, 1);
    }
}
