//! Read-only view over a project's task snapshot
//!
//! Keeps the caller's ordering (every deterministic tie-break depends on
//! it), indexes tasks by ID, and maintains a petgraph reverse index so
//! "who depends on me" queries don't rescan the whole snapshot.
//!
//! Edge direction is: dependency -> dependent. Walking outgoing edges from
//! a node therefore visits the work it gates.

use petgraph::algo::has_path_connecting;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Bfs, Reversed};
use petgraph::Direction;
use std::collections::HashMap;

use super::id::TaskId;
use super::task::Task;

/// A dependency graph over a borrowed task snapshot
#[derive(Debug)]
pub struct TaskGraph<'a> {
    tasks: &'a [Task],

    /// Map from TaskId to snapshot position (first occurrence wins)
    index: HashMap<&'a TaskId, usize>,

    /// Node `i` is `tasks[i]`
    graph: DiGraph<usize, ()>,
}

impl<'a> TaskGraph<'a> {
    /// Builds the view from a task snapshot
    ///
    /// Dependencies on unknown IDs are kept on the task but produce no edge.
    pub fn from_tasks(tasks: &'a [Task]) -> Self {
        let mut graph = DiGraph::with_capacity(tasks.len(), tasks.len());
        let mut index = HashMap::with_capacity(tasks.len());

        // First pass: add all nodes
        for (pos, task) in tasks.iter().enumerate() {
            graph.add_node(pos);
            index.entry(&task.id).or_insert(pos);
        }

        // Second pass: add all edges
        for (pos, task) in tasks.iter().enumerate() {
            for dep_id in &task.depends_on {
                if let Some(&dep_pos) = index.get(dep_id) {
                    graph.update_edge(NodeIndex::new(dep_pos), NodeIndex::new(pos), ());
                }
            }
        }

        Self { tasks, index, graph }
    }

    /// Looks up a task by ID
    pub fn get(&self, id: &TaskId) -> Option<&'a Task> {
        self.index.get(id).map(|&pos| &self.tasks[pos])
    }

    /// Returns true if the snapshot contains the task
    pub fn contains(&self, id: &TaskId) -> bool {
        self.index.contains_key(id)
    }

    /// Snapshot position of a task
    pub fn position(&self, id: &TaskId) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// All tasks, in snapshot order
    pub fn tasks(&self) -> impl Iterator<Item = &'a Task> {
        self.tasks.iter()
    }

    /// Tasks that are not done, in snapshot order
    pub fn incomplete(&self) -> impl Iterator<Item = &'a Task> {
        self.tasks.iter().filter(|t| !t.is_completed())
    }

    /// Resolved direct dependencies of a task (unknown IDs are skipped)
    pub fn dependencies(&self, task: &Task) -> Vec<&'a Task> {
        task.depends_on.iter().filter_map(|id| self.get(id)).collect()
    }

    /// Direct dependents of a task, in snapshot order
    pub fn dependents(&self, id: &TaskId) -> Vec<&'a Task> {
        let Some(pos) = self.position(id) else {
            return vec![];
        };

        let mut positions: Vec<usize> = self
            .graph
            .neighbors_directed(NodeIndex::new(pos), Direction::Outgoing)
            .map(|idx| self.graph[idx])
            .collect();
        positions.sort_unstable();
        positions.into_iter().map(|p| &self.tasks[p]).collect()
    }

    /// Returns true if work on `from` gates `to` through existing edges
    ///
    /// Unknown IDs reach nothing.
    pub fn reaches(&self, from: &TaskId, to: &TaskId) -> bool {
        match (self.position(from), self.position(to)) {
            (Some(a), Some(b)) => {
                has_path_connecting(&self.graph, NodeIndex::new(a), NodeIndex::new(b), None)
            }
            _ => false,
        }
    }

    /// Every task that depends on `id` directly or transitively, in snapshot order
    ///
    /// Cycle-safe: the traversal tracks visited nodes and never reports the
    /// starting task itself.
    pub fn transitive_dependents(&self, id: &TaskId) -> Vec<&'a Task> {
        let Some(pos) = self.position(id) else {
            return vec![];
        };

        let start = NodeIndex::new(pos);
        let mut bfs = Bfs::new(&self.graph, start);
        let mut positions = Vec::new();
        while let Some(node) = bfs.next(&self.graph) {
            if node != start {
                positions.push(self.graph[node]);
            }
        }

        positions.sort_unstable();
        positions.into_iter().map(|p| &self.tasks[p]).collect()
    }

    /// Every task `id` waits on directly or transitively, in snapshot order
    pub fn transitive_dependencies(&self, id: &TaskId) -> Vec<&'a Task> {
        let Some(pos) = self.position(id) else {
            return vec![];
        };

        let reversed = Reversed(&self.graph);
        let start = NodeIndex::new(pos);
        let mut bfs = Bfs::new(reversed, start);
        let mut positions = Vec::new();
        while let Some(node) = bfs.next(reversed) {
            if node != start {
                positions.push(self.graph[node]);
            }
        }

        positions.sort_unstable();
        positions.into_iter().map(|p| &self.tasks[p]).collect()
    }

    /// Returns true if some incomplete task lists `id` as a dependency
    pub fn has_incomplete_dependent(&self, id: &TaskId) -> bool {
        self.dependents(id).iter().any(|t| !t.is_completed())
    }

    /// Returns the number of tasks in the snapshot
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns true if the snapshot is empty
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str, deps: &[&str]) -> Task {
        let mut task = Task::new(id.parse().unwrap(), id.to_uppercase());
        for dep in deps {
            task.add_dependency(dep.parse().unwrap());
        }
        task
    }

    fn id(s: &str) -> TaskId {
        s.parse().unwrap()
    }

    fn ids(tasks: &[&Task]) -> Vec<String> {
        tasks.iter().map(|t| t.id.to_string()).collect()
    }

    #[test]
    fn empty_graph() {
        let graph = TaskGraph::from_tasks(&[]);
        assert!(graph.is_empty());
        assert_eq!(graph.len(), 0);
        assert!(graph.transitive_dependents(&id("x")).is_empty());
    }

    #[test]
    fn lookup_and_dependencies() {
        let tasks = vec![task("a", &[]), task("b", &["a", "ghost"])];
        let graph = TaskGraph::from_tasks(&tasks);

        assert!(graph.contains(&id("a")));
        assert!(!graph.contains(&id("ghost")));
        assert_eq!(graph.position(&id("b")), Some(1));

        let deps = graph.dependencies(&tasks[1]);
        assert_eq!(ids(&deps), vec!["a"]);
    }

    #[test]
    fn reaches_follows_gating_direction() {
        let tasks = vec![task("a", &[]), task("b", &["a"]), task("c", &["b"]), task("x", &[])];
        let graph = TaskGraph::from_tasks(&tasks);

        assert!(graph.reaches(&id("a"), &id("c")));
        assert!(!graph.reaches(&id("c"), &id("a")));
        assert!(!graph.reaches(&id("x"), &id("c")));
        assert!(!graph.reaches(&id("ghost"), &id("c")));
    }

    #[test]
    fn dependents_in_snapshot_order() {
        let tasks = vec![
            task("a", &[]),
            task("c", &["a"]),
            task("b", &["a"]),
            task("d", &["b"]),
        ];
        let graph = TaskGraph::from_tasks(&tasks);

        assert_eq!(ids(&graph.dependents(&id("a"))), vec!["c", "b"]);
        assert_eq!(
            ids(&graph.transitive_dependents(&id("a"))),
            vec!["c", "b", "d"]
        );
        assert!(graph.transitive_dependents(&id("d")).is_empty());
        assert_eq!(ids(&graph.transitive_dependencies(&id("d"))), vec!["a", "b"]);
    }

    #[test]
    fn transitive_dependents_terminate_on_cycles() {
        let tasks = vec![task("a", &["c"]), task("b", &["a"]), task("c", &["b"])];
        let graph = TaskGraph::from_tasks(&tasks);

        assert_eq!(ids(&graph.transitive_dependents(&id("a"))), vec!["b", "c"]);
    }

    #[test]
    fn incomplete_dependent_detection() {
        let mut done = task("b", &["a"]);
        done.status = crate::domain::TaskStatus::Done;
        let tasks = vec![task("a", &[]), done, task("c", &["b"])];
        let graph = TaskGraph::from_tasks(&tasks);

        assert!(!graph.has_incomplete_dependent(&id("a")));
        assert!(graph.has_incomplete_dependent(&id("b")));
        assert_eq!(graph.incomplete().count(), 2);
    }

    #[test]
    fn duplicate_ids_resolve_to_first() {
        let tasks = vec![task("a", &[]), task("a", &["z"])];
        let graph = TaskGraph::from_tasks(&tasks);
        assert!(graph.get(&id("a")).unwrap().depends_on.is_empty());
    }

    #[test]
    fn performance_500_tasks() {
        use std::time::Instant;

        let mut tasks = vec![task("t0", &[])];
        for i in 1..500 {
            let prev = format!("t{}", i - 1);
            tasks.push(task(&format!("t{}", i), &[prev.as_str()]));
        }

        let start = Instant::now();
        let graph = TaskGraph::from_tasks(&tasks);
        let dependents = graph.transitive_dependents(&id("t0"));
        let duration = start.elapsed();

        assert_eq!(dependents.len(), 499);
        assert!(duration.as_millis() < 100, "Traversal took {:?}", duration);
    }
}
