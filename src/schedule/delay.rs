//! Delay propagation
//!
//! Answers "if this task ends on a different date, which downstream tasks
//! slip and by how much". Delays only ever push dependents later; an early
//! finish is not propagated by this analysis.

use chrono::NaiveDate;
use serde::Serialize;

use super::critical_path::critical_path;
use super::effective::DateResolver;
use super::error::ScheduleError;
use crate::domain::{dates, TaskGraph, TaskId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AffectedTask {
    pub task_id: TaskId,
    pub title: String,
    pub original_predicted_end: Option<NaiveDate>,
    pub new_predicted_end: Option<NaiveDate>,
    /// Days past the task's own due date; never negative
    pub delay_days: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DelayReport {
    pub delayed_task: TaskId,
    /// Signed shift of the delayed task against its baseline end
    pub delay_from_original: i64,
    /// Worst-affected first
    pub affected_tasks: Vec<AffectedTask>,
    pub critical_path_affected: bool,
}

/// Projects a new end date for `task_id` onto every incomplete transitive dependent
///
/// The baseline is the task's due date, else its predicted end. Without a
/// new end date, or without any baseline, the shift is zero.
pub fn notify_dependency_delays(
    task_id: &TaskId,
    new_end_date: Option<NaiveDate>,
    graph: &TaskGraph<'_>,
) -> Result<DelayReport, ScheduleError> {
    let task = graph
        .get(task_id)
        .ok_or_else(|| ScheduleError::TaskNotFound(task_id.clone()))?;

    let mut resolver = DateResolver::new(graph);
    let baseline = task.due_date.or_else(|| resolver.resolve(task).predicted_end);

    let delay_from_original = match (new_end_date, baseline) {
        (Some(new_end), Some(baseline)) => dates::days_between(baseline, new_end),
        _ => 0,
    };
    let push = delay_from_original.max(0);

    let mut affected_tasks: Vec<AffectedTask> = graph
        .transitive_dependents(task_id)
        .into_iter()
        .filter(|dependent| !dependent.is_completed())
        .map(|dependent| {
            let original = resolver.resolve(dependent).predicted_end;
            let shifted = original.and_then(|end| dates::shift(end, push));
            let delay_days = match (shifted, dependent.due_date) {
                (Some(end), Some(due)) => dates::days_between(due, end).max(0),
                _ => 0,
            };

            AffectedTask {
                task_id: dependent.id.clone(),
                title: dependent.title.clone(),
                original_predicted_end: original,
                new_predicted_end: shifted,
                delay_days,
            }
        })
        .collect();

    affected_tasks.sort_by(|a, b| b.delay_days.cmp(&a.delay_days));

    let path = critical_path(graph);
    let critical_path_affected = affected_tasks.iter().any(|a| path.contains(&a.task_id));

    Ok(DelayReport {
        delayed_task: task_id.clone(),
        delay_from_original,
        affected_tasks,
        critical_path_affected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Task;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn id(s: &str) -> TaskId {
        s.parse().unwrap()
    }

    fn scheduled(id: &str, deps: &[&str], start: Option<&str>, duration: u32, due: Option<&str>) -> Task {
        let mut task = Task::new(id.parse().unwrap(), id.to_uppercase());
        for dep in deps {
            task.add_dependency(dep.parse().unwrap());
        }
        task.start_date = start.map(date);
        task.duration_days = Some(duration);
        task.due_date = due.map(date);
        task
    }

    fn snapshot() -> Vec<Task> {
        vec![
            scheduled("a", &[], Some("2024-01-01"), 5, Some("2024-01-05")),
            // b: starts 01-06, ends 01-08, due 01-09 (one day of slack)
            scheduled("b", &["a"], None, 3, Some("2024-01-09")),
            // c: starts 01-09, ends 01-10, due 01-10 (no slack)
            scheduled("c", &["b"], None, 2, Some("2024-01-10")),
            scheduled("x", &[], Some("2024-01-01"), 1, Some("2024-01-01")),
        ]
    }

    #[test]
    fn delay_pushes_every_dependent() {
        let tasks = snapshot();
        let graph = TaskGraph::from_tasks(&tasks);

        let report = notify_dependency_delays(&id("a"), Some(date("2024-01-08")), &graph).unwrap();
        assert_eq!(report.delay_from_original, 3);

        let by_id: Vec<_> = report
            .affected_tasks
            .iter()
            .map(|a| (a.task_id.to_string(), a.delay_days))
            .collect();
        assert_eq!(by_id, vec![("c".to_string(), 3), ("b".to_string(), 2)]);

        let c = &report.affected_tasks[0];
        assert_eq!(c.original_predicted_end, Some(date("2024-01-10")));
        assert_eq!(c.new_predicted_end, Some(date("2024-01-13")));
        assert!(report.critical_path_affected);
    }

    #[test]
    fn early_finish_never_pulls_dependents() {
        let tasks = snapshot();
        let graph = TaskGraph::from_tasks(&tasks);

        let report = notify_dependency_delays(&id("a"), Some(date("2024-01-02")), &graph).unwrap();
        assert_eq!(report.delay_from_original, -3);
        for affected in &report.affected_tasks {
            assert_eq!(affected.new_predicted_end, affected.original_predicted_end);
            assert!(affected.delay_days >= 0);
        }
    }

    #[test]
    fn omitted_end_date_is_zero_delay() {
        let tasks = snapshot();
        let graph = TaskGraph::from_tasks(&tasks);

        let report = notify_dependency_delays(&id("b"), None, &graph).unwrap();
        assert_eq!(report.delay_from_original, 0);
        assert_eq!(report.affected_tasks.len(), 1);
        assert_eq!(report.affected_tasks[0].delay_days, 0);
    }

    #[test]
    fn leaf_task_affects_nothing() {
        let tasks = snapshot();
        let graph = TaskGraph::from_tasks(&tasks);

        let report = notify_dependency_delays(&id("x"), Some(date("2024-02-01")), &graph).unwrap();
        assert!(report.affected_tasks.is_empty());
        assert!(!report.critical_path_affected);
    }

    #[test]
    fn unknown_task_is_error() {
        let tasks = snapshot();
        let graph = TaskGraph::from_tasks(&tasks);

        let err = notify_dependency_delays(&id("nope"), None, &graph).unwrap_err();
        assert_eq!(err, ScheduleError::TaskNotFound(id("nope")));
    }
}
