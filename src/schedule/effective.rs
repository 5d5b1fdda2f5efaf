//! Effective date calculation
//!
//! Walks a task's dependency chain to find the earliest date it can start
//! and the date it is predicted to end. Completed dependencies act as fixed
//! anchors and are not walked further. Unresolvable ends propagate as
//! unknown rather than being guessed.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde::Serialize;

use super::error::ScheduleWarning;
use crate::domain::{dates, Task, TaskGraph, TaskId};

/// Derived dates for one task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct EffectiveDates {
    /// Day after the latest dependency end, or the own start date when independent
    pub predicted_start: Option<NaiveDate>,

    pub predicted_end: Option<NaiveDate>,

    /// Lower bound on the start, known even when some dependency is unresolved
    pub earliest_start: Option<NaiveDate>,

    /// The duration-driven finish overruns a fixed due date
    pub is_deadline_overdue: bool,

    /// A cycle was hit while reading the chain; affected dates are unresolved
    pub cycle_detected: bool,
}

impl EffectiveDates {
    fn unresolved_cycle() -> Self {
        Self {
            cycle_detected: true,
            ..Default::default()
        }
    }

    /// True when the predicted end has already passed
    pub fn is_behind(&self, today: NaiveDate) -> bool {
        self.predicted_end.is_some_and(|end| end < today)
    }

    /// Advisory for a fixed deadline that the chain cannot meet
    pub fn overdue_warning(&self, task: &Task) -> Option<ScheduleWarning> {
        if !self.is_deadline_overdue {
            return None;
        }
        let due_date = task.due_date?;
        let predicted_end = earliest_finish(task, self.earliest_start)?;
        Some(ScheduleWarning::DeadlineOverdue {
            predicted_end,
            due_date,
        })
    }
}

/// Earliest possible finish given a lower-bound start (a task lasts at least a day)
fn earliest_finish(task: &Task, earliest_start: Option<NaiveDate>) -> Option<NaiveDate> {
    earliest_start.and_then(|start| dates::span_end(start, task.weight_days()))
}

/// Memoizing resolver for a single computation over one snapshot
///
/// Holds no state beyond the call that created it.
pub struct DateResolver<'g, 'a> {
    graph: &'g TaskGraph<'a>,
    memo: HashMap<TaskId, EffectiveDates>,
    visiting: HashSet<TaskId>,
}

impl<'g, 'a> DateResolver<'g, 'a> {
    pub fn new(graph: &'g TaskGraph<'a>) -> Self {
        Self {
            graph,
            memo: HashMap::new(),
            visiting: HashSet::new(),
        }
    }

    /// End date a dependency contributes: actual end when done, predicted otherwise
    pub fn end_of(&mut self, task: &Task) -> Option<NaiveDate> {
        if task.is_completed() {
            task.completion_date()
        } else {
            self.resolve(task).predicted_end
        }
    }

    /// Computes the effective dates for a task
    pub fn resolve(&mut self, task: &Task) -> EffectiveDates {
        if let Some(cached) = self.memo.get(&task.id) {
            return *cached;
        }
        if !self.visiting.insert(task.id.clone()) {
            return EffectiveDates::unresolved_cycle();
        }

        let result = if task.depends_on.is_empty() {
            self.independent(task)
        } else {
            self.chained(task)
        };

        self.visiting.remove(&task.id);
        self.memo.insert(task.id.clone(), result);
        result
    }

    fn independent(&self, task: &Task) -> EffectiveDates {
        let predicted_start = task.start_date;
        // The due date wins; start + duration only fills in when it is unset
        let predicted_end = task
            .due_date
            .or_else(|| task.date_fields().derived_due_date());

        EffectiveDates {
            predicted_start,
            predicted_end,
            earliest_start: predicted_start,
            is_deadline_overdue: deadline_overdue(task, predicted_start),
            cycle_detected: false,
        }
    }

    fn chained(&mut self, task: &Task) -> EffectiveDates {
        let graph = self.graph;
        let mut latest_end: Option<NaiveDate> = None;
        let mut lower_bound: Option<NaiveDate> = None;
        let mut unresolved = false;
        let mut cycle_detected = false;

        for dep_id in &task.depends_on {
            let Some(dep) = graph.get(dep_id) else {
                unresolved = true;
                continue;
            };

            if dep.is_completed() {
                match dep.completion_date() {
                    Some(end) => {
                        latest_end = latest_end.max(Some(end));
                        lower_bound = lower_bound.max(Some(end));
                    }
                    None => unresolved = true,
                }
                continue;
            }

            let dep_dates = self.resolve(dep);
            cycle_detected |= dep_dates.cycle_detected;
            match dep_dates.predicted_end {
                Some(end) => {
                    latest_end = latest_end.max(Some(end));
                    lower_bound = lower_bound.max(Some(end));
                }
                None => {
                    unresolved = true;
                    // An unresolved dependency still ends no earlier than it starts
                    lower_bound = lower_bound.max(dep_dates.earliest_start);
                }
            }
        }

        let predicted_start = if unresolved {
            None
        } else {
            latest_end.and_then(dates::next_day)
        };
        let earliest_start = lower_bound.and_then(dates::next_day);

        let predicted_end = match task.duration_days {
            Some(duration) => predicted_start.and_then(|start| dates::span_end(start, duration)),
            None => task.due_date,
        };

        EffectiveDates {
            predicted_start,
            predicted_end,
            earliest_start,
            is_deadline_overdue: deadline_overdue(task, earliest_start),
            cycle_detected,
        }
    }
}

fn deadline_overdue(task: &Task, earliest_start: Option<NaiveDate>) -> bool {
    if !task.is_due_date_fixed {
        return false;
    }
    match (task.due_date, earliest_finish(task, earliest_start)) {
        (Some(due), Some(finish)) => finish > due,
        _ => false,
    }
}

/// Computes the effective dates for a task against a snapshot
pub fn effective_dates(task: &Task, graph: &TaskGraph<'_>) -> EffectiveDates {
    DateResolver::new(graph).resolve(task)
}

/// The direct dependency whose end actually gates `task`'s start
///
/// Ties go to the dependency listed first.
pub fn bottleneck_task<'a>(task: &Task, graph: &TaskGraph<'a>) -> Option<&'a Task> {
    let mut resolver = DateResolver::new(graph);
    let mut best: Option<(&'a Task, NaiveDate)> = None;

    for dep in graph.dependencies(task) {
        let Some(end) = resolver.end_of(dep) else {
            continue;
        };
        if best.map_or(true, |(_, best_end)| end > best_end) {
            best = Some((dep, end));
        }
    }

    best.map(|(dep, _)| dep)
}

/// True if any direct dependency is not done (unknown dependencies count as blocking)
///
/// A completed task is never blocked.
pub fn is_task_blocked(task: &Task, graph: &TaskGraph<'_>) -> bool {
    !task.is_completed() && !blockers(task, graph).is_empty()
}

/// Direct dependencies that are not done, including unknown IDs
pub fn blockers<'t>(task: &'t Task, graph: &TaskGraph<'_>) -> Vec<&'t TaskId> {
    task.depends_on
        .iter()
        .filter(|id| graph.get(id).map_or(true, |dep| !dep.is_completed()))
        .collect()
}
