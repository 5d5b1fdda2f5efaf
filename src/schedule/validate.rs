//! Dependency validation
//!
//! Checks a proposed `depends_on` set for a task before it is persisted.
//! Pure and idempotent: the snapshot is never modified.

use std::collections::HashSet;

use serde::Serialize;

use super::error::{ScheduleError, ScheduleWarning};
use crate::domain::{TaskGraph, TaskId};

/// Outcome of validating a proposed dependency set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    pub errors: Vec<ScheduleError>,
    pub warnings: Vec<ScheduleWarning>,
}

impl ValidationReport {
    /// True when no fatal error was found
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Converts into a `Result`, keeping warnings on success
    pub fn into_result(self) -> Result<Vec<ScheduleWarning>, Vec<ScheduleError>> {
        if self.errors.is_empty() {
            Ok(self.warnings)
        } else {
            Err(self.errors)
        }
    }
}

#[derive(Serialize)]
struct Message<'a> {
    kind: &'a str,
    message: String,
}

impl Serialize for ValidationReport {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;

        let errors: Vec<_> = self
            .errors
            .iter()
            .map(|e| Message {
                kind: e.kind(),
                message: e.to_string(),
            })
            .collect();
        let warnings: Vec<_> = self
            .warnings
            .iter()
            .map(|w| Message {
                kind: w.kind(),
                message: w.to_string(),
            })
            .collect();

        let mut state = serializer.serialize_struct("ValidationReport", 3)?;
        state.serialize_field("valid", &self.is_valid())?;
        state.serialize_field("errors", &errors)?;
        state.serialize_field("warnings", &warnings)?;
        state.end()
    }
}

/// Validates that `candidate` may depend on every task in `proposed`
///
/// Self-references are rejected before any traversal. Each remaining ID
/// must exist and must not already (transitively) depend on `candidate`.
pub fn validate_dependencies(
    candidate: &TaskId,
    proposed: &[TaskId],
    graph: &TaskGraph<'_>,
) -> ValidationReport {
    let mut report = ValidationReport::default();

    if proposed.contains(candidate) {
        report
            .errors
            .push(ScheduleError::SelfDependency(candidate.clone()));
    }

    let mut seen = HashSet::new();
    for dep_id in proposed {
        if dep_id == candidate || !seen.insert(dep_id) {
            continue;
        }

        let Some(dep) = graph.get(dep_id) else {
            report
                .errors
                .push(ScheduleError::UnknownDependency(dep_id.clone()));
            continue;
        };

        if graph.reaches(candidate, dep_id) {
            report.errors.push(ScheduleError::CircularDependency {
                task: candidate.clone(),
                depends_on: dep_id.clone(),
            });
            continue;
        }

        if dep.is_completed() {
            report
                .warnings
                .push(ScheduleWarning::DependsOnCompletedTask(dep_id.clone()));
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Task, TaskStatus};

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

    #[test]
    fn valid_dependency() {
        let tasks = vec![task("a", &[]), task("b", &[]), task("c", &[])];
        let graph = TaskGraph::from_tasks(&tasks);

        let report = validate_dependencies(&id("b"), &[id("a"), id("c")], &graph);
        assert!(report.is_valid());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn direct_cycle_rejected() {
        // a depends on b; b -> a would close the loop
        let tasks = vec![task("a", &["b"]), task("b", &[])];
        let graph = TaskGraph::from_tasks(&tasks);

        let report = validate_dependencies(&id("b"), &[id("a")], &graph);
        assert_eq!(
            report.errors,
            vec![ScheduleError::CircularDependency {
                task: id("b"),
                depends_on: id("a"),
            }]
        );
    }

    #[test]
    fn transitive_cycle_rejected() {
        let tasks = vec![task("a", &["b"]), task("b", &["c"]), task("c", &[])];
        let graph = TaskGraph::from_tasks(&tasks);

        let report = validate_dependencies(&id("c"), &[id("a")], &graph);
        assert!(!report.is_valid());
        assert_eq!(report.errors[0].kind(), "circular_dependency");
    }

    #[test]
    fn unrelated_dependency_accepted_alongside_chain() {
        let tasks = vec![task("a", &["b"]), task("b", &[]), task("c", &[])];
        let graph = TaskGraph::from_tasks(&tasks);

        assert!(validate_dependencies(&id("b"), &[id("c")], &graph).is_valid());
    }

    #[test]
    fn candidate_outside_snapshot_cannot_close_a_loop() {
        let tasks = vec![task("a", &[]), task("b", &["a"])];
        let graph = TaskGraph::from_tasks(&tasks);

        let report = validate_dependencies(&id("new"), &[id("b")], &graph);
        assert!(report.is_valid());
    }

    #[test]
    fn self_dependency_rejected() {
        let tasks = vec![task("a", &[])];
        let graph = TaskGraph::from_tasks(&tasks);

        let report = validate_dependencies(&id("a"), &[id("a")], &graph);
        assert_eq!(report.errors, vec![ScheduleError::SelfDependency(id("a"))]);
    }

    #[test]
    fn unknown_dependency_rejected() {
        let tasks = vec![task("a", &[])];
        let graph = TaskGraph::from_tasks(&tasks);

        let report = validate_dependencies(&id("a"), &[id("ghost")], &graph);
        assert_eq!(
            report.errors,
            vec![ScheduleError::UnknownDependency(id("ghost"))]
        );
    }

    #[test]
    fn completed_dependency_warns_only() {
        let mut done = task("a", &[]);
        done.status = TaskStatus::Done;
        let tasks = vec![done, task("b", &[])];
        let graph = TaskGraph::from_tasks(&tasks);

        let report = validate_dependencies(&id("b"), &[id("a")], &graph);
        assert!(report.is_valid());
        assert_eq!(
            report.warnings,
            vec![ScheduleWarning::DependsOnCompletedTask(id("a"))]
        );
    }

    #[test]
    fn terminates_on_malformed_cyclic_snapshot() {
        let tasks = vec![task("a", &["b"]), task("b", &["a"]), task("c", &[])];
        let graph = TaskGraph::from_tasks(&tasks);

        assert!(validate_dependencies(&id("c"), &[id("a")], &graph).is_valid());
    }

    #[test]
    fn idempotent() {
        let tasks = vec![task("a", &["b"]), task("b", &[])];
        let graph = TaskGraph::from_tasks(&tasks);

        let first = validate_dependencies(&id("b"), &[id("a"), id("x")], &graph);
        let second = validate_dependencies(&id("b"), &[id("a"), id("x")], &graph);
        assert_eq!(first, second);
        assert_eq!(first.errors.len(), 2);
    }

    #[test]
    fn report_serializes_messages() {
        let tasks = vec![task("a", &[])];
        let graph = TaskGraph::from_tasks(&tasks);

        let report = validate_dependencies(&id("a"), &[id("a")], &graph);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["valid"], false);
        assert_eq!(json["errors"][0]["kind"], "self_dependency");
        assert_eq!(
            json["errors"][0]["message"],
            "Self-dependency not allowed: a"
        );
    }
}
