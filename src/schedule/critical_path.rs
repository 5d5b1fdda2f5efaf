//! Critical path
//!
//! The longest duration-weighted chain of incomplete tasks ending at a
//! leaf (a task no other incomplete task depends on). Missing durations
//! weigh one day. Results are recomputed on every call.

use std::collections::{HashMap, HashSet};

use super::error::ScheduleError;
use crate::domain::{Task, TaskGraph, TaskId};

/// An ordered chain, first task to last
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CriticalPath<'a> {
    pub tasks: Vec<&'a Task>,
    pub total_days: u32,
}

impl<'a> CriticalPath<'a> {
    pub fn contains(&self, id: &TaskId) -> bool {
        self.tasks.iter().any(|t| &t.id == id)
    }

    pub fn ids(&self) -> Vec<&'a TaskId> {
        self.tasks.iter().map(|t| &t.id).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Longest chain across every leaf
///
/// Ties go to the leaf that appears first in the snapshot, then to the
/// dependency listed first.
pub fn critical_path<'a>(graph: &TaskGraph<'a>) -> CriticalPath<'a> {
    let mut finder = ChainFinder::new(graph);
    let mut best: Option<(usize, u32)> = None;

    for (pos, task) in graph.tasks().enumerate() {
        if task.is_completed() || graph.position(&task.id) != Some(pos) {
            continue;
        }
        if graph.has_incomplete_dependent(&task.id) {
            continue;
        }

        let total = finder.longest(pos);
        if best.map_or(true, |(_, best_total)| total > best_total) {
            best = Some((pos, total));
        }
    }

    match best {
        Some((leaf, total)) => CriticalPath {
            tasks: finder.chain(leaf),
            total_days: total,
        },
        None => CriticalPath::default(),
    }
}

/// Longest chain of incomplete tasks ending at `target`
pub fn critical_path_to<'a>(
    graph: &TaskGraph<'a>,
    target: &TaskId,
) -> Result<CriticalPath<'a>, ScheduleError> {
    let pos = graph
        .position(target)
        .ok_or_else(|| ScheduleError::TaskNotFound(target.clone()))?;

    if graph.get(target).is_some_and(Task::is_completed) {
        return Ok(CriticalPath::default());
    }

    let mut finder = ChainFinder::new(graph);
    let total = finder.longest(pos);
    Ok(CriticalPath {
        tasks: finder.chain(pos),
        total_days: total,
    })
}

/// Memoized backward walk; `next[pos]` is the dependency the longest chain continues through
struct ChainFinder<'g, 'a> {
    graph: &'g TaskGraph<'a>,
    tasks: Vec<&'a Task>,
    memo: HashMap<usize, (u32, Option<usize>)>,
    on_stack: HashSet<usize>,
}

impl<'g, 'a> ChainFinder<'g, 'a> {
    fn new(graph: &'g TaskGraph<'a>) -> Self {
        Self {
            graph,
            tasks: graph.tasks().collect(),
            memo: HashMap::new(),
            on_stack: HashSet::new(),
        }
    }

    fn longest(&mut self, pos: usize) -> u32 {
        if let Some(&(total, _)) = self.memo.get(&pos) {
            return total;
        }
        self.on_stack.insert(pos);

        let task = self.tasks[pos];
        let mut best: Option<(u32, usize)> = None;
        for dep_id in &task.depends_on {
            let Some(dep_pos) = self.graph.position(dep_id) else {
                continue;
            };
            // Cycles in malformed snapshots are cut rather than followed
            if self.tasks[dep_pos].is_completed() || self.on_stack.contains(&dep_pos) {
                continue;
            }

            let total = self.longest(dep_pos);
            if best.map_or(true, |(best_total, _)| total > best_total) {
                best = Some((total, dep_pos));
            }
        }

        self.on_stack.remove(&pos);
        let (upstream, next) = match best {
            Some((total, dep_pos)) => (total, Some(dep_pos)),
            None => (0, None),
        };
        let total = upstream.saturating_add(task.weight_days());
        self.memo.insert(pos, (total, next));
        total
    }

    /// Follows `next` pointers from `end` and returns the chain first-to-last
    fn chain(&self, end: usize) -> Vec<&'a Task> {
        let mut seen = HashSet::new();
        let mut chain = Vec::new();
        let mut current = Some(end);

        while let Some(pos) = current {
            if !seen.insert(pos) {
                break;
            }
            chain.push(self.tasks[pos]);
            current = self.memo.get(&pos).and_then(|&(_, next)| next);
        }

        chain.reverse();
        chain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TaskStatus;

    fn task(id: &str, deps: &[&str], duration: Option<u32>) -> Task {
        let mut task = Task::new(id.parse().unwrap(), id.to_uppercase());
        for dep in deps {
            task.add_dependency(dep.parse().unwrap());
        }
        task.duration_days = duration;
        task
    }

    fn ids(path: &CriticalPath<'_>) -> Vec<String> {
        path.tasks.iter().map(|t| t.id.to_string()).collect()
    }

    #[test]
    fn empty_snapshot() {
        let graph = TaskGraph::from_tasks(&[]);
        assert!(critical_path(&graph).is_empty());
    }

    #[test]
    fn longest_branch_selected() {
        let tasks = vec![
            task("a", &[], Some(2)),
            task("b", &["a"], Some(5)),
            task("c", &["a"], Some(1)),
            task("d", &["b", "c"], Some(1)),
            task("e", &[], Some(3)),
        ];
        let graph = TaskGraph::from_tasks(&tasks);

        let path = critical_path(&graph);
        assert_eq!(ids(&path), vec!["a", "b", "d"]);
        assert_eq!(path.total_days, 8);
    }

    #[test]
    fn missing_duration_weighs_one_day() {
        let tasks = vec![task("a", &[], None), task("b", &["a"], None), task("c", &[], Some(1))];
        let graph = TaskGraph::from_tasks(&tasks);

        let path = critical_path(&graph);
        assert_eq!(ids(&path), vec!["a", "b"]);
        assert_eq!(path.total_days, 2);
    }

    #[test]
    fn disconnected_returns_longest_single_task() {
        let tasks = vec![
            task("a", &[], Some(2)),
            task("b", &[], Some(7)),
            task("c", &[], Some(7)),
        ];
        let graph = TaskGraph::from_tasks(&tasks);

        let path = critical_path(&graph);
        assert_eq!(ids(&path), vec!["b"]);
        assert_eq!(path.total_days, 7);
    }

    #[test]
    fn completed_tasks_excluded() {
        let mut done = task("a", &[], Some(20));
        done.status = TaskStatus::Done;
        let tasks = vec![done, task("b", &["a"], Some(2)), task("c", &[], Some(3))];
        let graph = TaskGraph::from_tasks(&tasks);

        let path = critical_path(&graph);
        assert_eq!(ids(&path), vec!["c"]);
    }

    #[test]
    fn completed_dependent_does_not_hide_leaf() {
        let mut done = task("b", &["a"], Some(1));
        done.status = TaskStatus::Done;
        let tasks = vec![task("a", &[], Some(4)), done];
        let graph = TaskGraph::from_tasks(&tasks);

        assert_eq!(ids(&critical_path(&graph)), vec!["a"]);
    }

    #[test]
    fn deterministic_across_calls() {
        let tasks = vec![
            task("a", &[], Some(3)),
            task("b", &[], Some(3)),
            task("c", &["a"], Some(2)),
            task("d", &["b"], Some(2)),
        ];
        let graph = TaskGraph::from_tasks(&tasks);

        let first = critical_path(&graph);
        let second = critical_path(&graph);
        assert_eq!(ids(&first), ids(&second));
        assert_eq!(ids(&first), vec!["a", "c"]);
    }

    #[test]
    fn terminates_on_cycles() {
        let tasks = vec![
            task("a", &["c"], Some(1)),
            task("b", &["a"], Some(1)),
            task("c", &["b"], Some(1)),
            task("d", &["a"], Some(1)),
        ];
        let graph = TaskGraph::from_tasks(&tasks);

        let path = critical_path(&graph);
        assert_eq!(path.tasks.last().map(|t| t.id.as_str()), Some("d"));
        assert_eq!(path.total_days, 4);
    }

    #[test]
    fn path_to_target() {
        let tasks = vec![
            task("a", &[], Some(2)),
            task("b", &["a"], Some(1)),
            task("c", &[], Some(10)),
        ];
        let graph = TaskGraph::from_tasks(&tasks);

        let path = critical_path_to(&graph, &"b".parse().unwrap()).unwrap();
        assert_eq!(ids(&path), vec!["a", "b"]);
        assert_eq!(path.total_days, 3);

        let missing = critical_path_to(&graph, &"zz".parse().unwrap());
        assert!(matches!(missing, Err(ScheduleError::TaskNotFound(_))));
    }
}
