//! Calendar helpers: month windows and per-day filtering of due dates.

use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveTime, TimeDelta, Utc};

use super::task::Task;

/// Inclusive `[start, end]` bounds of the month containing `day`.
pub fn month_bounds(day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let first = day.with_day(1).unwrap_or(day);
    let next_first = first.checked_add_months(Months::new(1)).unwrap_or(first);
    let start = first.and_time(NaiveTime::MIN).and_utc();
    let end = next_first.and_time(NaiveTime::MIN).and_utc() - TimeDelta::milliseconds(1);
    (start, end)
}

/// Tasks whose due date falls on `day` (UTC). Undated tasks never match.
pub fn tasks_due_on(tasks: &[Task], day: NaiveDate) -> Vec<Task> {
    tasks
        .iter()
        .filter(|t| t.due_date.is_some_and(|due| due.date_naive() == day))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::state::TaskStatus;
    use crate::domain::task::fixtures::task;
    use chrono::TimeZone;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[rstest]
    #[case::mid_month(date(2024, 5, 17), 31)]
    #[case::leap_february(date(2024, 2, 29), 29)]
    #[case::december(date(2023, 12, 1), 31)]
    fn month_bounds_span_the_whole_month(#[case] day: NaiveDate, #[case] days: u32) {
        let (start, end) = month_bounds(day);
        assert_eq!(start.day(), 1);
        assert_eq!(start.month(), day.month());
        assert_eq!(end.day(), days);
        assert_eq!(end.month(), day.month());
        assert!(start < end);
    }

    #[test]
    fn filters_tasks_by_due_day() {
        let mut due = task("a", TaskStatus::Todo);
        due.due_date = Some(Utc.with_ymd_and_hms(2024, 5, 17, 23, 30, 0).unwrap());
        let mut other = task("b", TaskStatus::Todo);
        other.due_date = Some(Utc.with_ymd_and_hms(2024, 5, 18, 0, 30, 0).unwrap());
        let undated = task("c", TaskStatus::Todo);

        let hits = tasks_due_on(&[due, other, undated], date(2024, 5, 17));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id.as_str(), "a");
    }
}
