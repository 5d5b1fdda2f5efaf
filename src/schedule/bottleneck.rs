//! Bottleneck detection
//!
//! Finds incomplete tasks that hold up blocked downstream work and whose
//! own schedule is either already broken (fixed deadline overrun) or
//! unknown (no due date), ranked by how much work sits behind them.

use std::fmt;

use serde::Serialize;

use super::effective::{is_task_blocked, DateResolver};
use crate::domain::{Task, TaskGraph};

/// Default number of bottlenecks reported
pub const DEFAULT_BOTTLENECK_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BottleneckReason {
    /// The duration-driven end overruns a fixed due date
    DeadlineOverdue,
    /// No due date, so downstream work cannot be planned
    NoDueDate,
}

impl BottleneckReason {
    pub fn describe(&self) -> &'static str {
        match self {
            BottleneckReason::DeadlineOverdue => "predicted end is past its fixed due date",
            BottleneckReason::NoDueDate => "has no due date, so its schedule is indeterminate",
        }
    }
}

impl fmt::Display for BottleneckReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bottleneck<'a> {
    pub task: &'a Task,
    /// Size of the full transitive dependent set
    pub dependent_count: usize,
    pub reason: BottleneckReason,
}

/// Top bottlenecks by dependent count (at most [`DEFAULT_BOTTLENECK_LIMIT`])
pub fn find_bottlenecks<'a>(graph: &TaskGraph<'a>) -> Vec<Bottleneck<'a>> {
    find_bottlenecks_with_limit(graph, DEFAULT_BOTTLENECK_LIMIT)
}

pub fn find_bottlenecks_with_limit<'a>(graph: &TaskGraph<'a>, limit: usize) -> Vec<Bottleneck<'a>> {
    rank_bottlenecks(graph, graph.tasks(), limit)
}

/// Ranks the given candidates; ties keep snapshot order
pub(crate) fn rank_bottlenecks<'a>(
    graph: &TaskGraph<'a>,
    candidates: impl IntoIterator<Item = &'a Task>,
    limit: usize,
) -> Vec<Bottleneck<'a>> {
    let mut resolver = DateResolver::new(graph);
    let mut found = Vec::new();

    for task in candidates {
        if task.is_completed() {
            continue;
        }

        let dependents = graph.transitive_dependents(&task.id);
        if !dependents.iter().any(|d| is_task_blocked(d, graph)) {
            continue;
        }

        let reason = if resolver.resolve(task).is_deadline_overdue {
            BottleneckReason::DeadlineOverdue
        } else if task.due_date.is_none() {
            BottleneckReason::NoDueDate
        } else {
            continue;
        };

        found.push(Bottleneck {
            task,
            dependent_count: dependents.len(),
            reason,
        });
    }

    found.sort_by(|a, b| b.dependent_count.cmp(&a.dependent_count));
    found.truncate(limit);
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TaskStatus;
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn task(id: &str, deps: &[&str]) -> Task {
        let mut task = Task::new(id.parse().unwrap(), id.to_uppercase());
        for dep in deps {
            task.add_dependency(dep.parse().unwrap());
        }
        task
    }

    fn with_due(mut task: Task, due: &str) -> Task {
        task.due_date = Some(date(due));
        task
    }

    fn ids(found: &[Bottleneck<'_>]) -> Vec<String> {
        found.iter().map(|b| b.task.id.to_string()).collect()
    }

    #[test]
    fn undated_blocker_ranked_by_dependents() {
        let tasks = vec![
            task("a", &[]),
            task("b", &["a"]),
            task("c", &["b"]),
            task("x", &[]),
            task("y", &["x"]),
        ];
        let graph = TaskGraph::from_tasks(&tasks);

        let found = find_bottlenecks(&graph);
        assert_eq!(ids(&found), vec!["a", "b", "x"]);
        assert_eq!(found[0].dependent_count, 2);
        assert_eq!(found[0].reason, BottleneckReason::NoDueDate);
    }

    #[test]
    fn dated_on_schedule_task_not_reported() {
        let tasks = vec![with_due(task("a", &[]), "2024-01-05"), task("b", &["a"])];
        let graph = TaskGraph::from_tasks(&tasks);

        assert!(find_bottlenecks(&graph).is_empty());
    }

    #[test]
    fn overdue_fixed_deadline_reported() {
        let mut a = task("a", &[]);
        a.start_date = Some(date("2024-01-01"));
        a.duration_days = Some(2);
        let mut b = with_due(task("b", &["a"]), "2024-01-02");
        b.is_due_date_fixed = true;
        let tasks = vec![a, b, task("c", &["b"])];
        let graph = TaskGraph::from_tasks(&tasks);

        let found = find_bottlenecks(&graph);
        let b = found.iter().find(|f| f.task.id.as_str() == "b").unwrap();
        assert_eq!(b.reason, BottleneckReason::DeadlineOverdue);
        assert_eq!(b.dependent_count, 1);
    }

    #[test]
    fn no_blocked_dependents_means_no_bottleneck() {
        let mut done = task("b", &["a"]);
        done.status = TaskStatus::Done;
        let tasks = vec![task("a", &[]), done];
        let graph = TaskGraph::from_tasks(&tasks);

        assert!(find_bottlenecks(&graph).is_empty());
    }

    #[test]
    fn limited_to_top_five() {
        let mut tasks = Vec::new();
        for i in 0..8 {
            let root = format!("r{}", i);
            let leaf = format!("l{}", i);
            tasks.push(task(&root, &[]));
            tasks.push(task(&leaf, &[root.as_str()]));
        }
        let graph = TaskGraph::from_tasks(&tasks);

        let found = find_bottlenecks(&graph);
        assert_eq!(found.len(), 5);
        assert_eq!(ids(&found), vec!["r0", "r1", "r2", "r3", "r4"]);
        assert_eq!(find_bottlenecks_with_limit(&graph, 2).len(), 2);
    }

    #[test]
    fn reason_strings_differ() {
        assert_ne!(
            BottleneckReason::DeadlineOverdue.to_string(),
            BottleneckReason::NoDueDate.to_string()
        );
    }
}
