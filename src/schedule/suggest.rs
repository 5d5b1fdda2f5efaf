//! Schedule suggestions
//!
//! Combines the critical path and bottleneck scan into concrete, advisory
//! changes. Nothing here is applied automatically; in particular the
//! "remove dependency" hint is a heuristic that can point at an edge that
//! is semantically required but not currently the gating one.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::bottleneck::{rank_bottlenecks, BottleneckReason, DEFAULT_BOTTLENECK_LIMIT};
use super::critical_path::{critical_path, critical_path_to};
use super::effective::DateResolver;
use super::error::ScheduleError;
use crate::domain::{dates, Priority, Task, TaskGraph, TaskId};

/// Thresholds for the suggestion rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulingPolicy {
    /// Maximum bottlenecks considered
    pub bottleneck_limit: usize,

    /// Durations above this many days get a reduce-scope suggestion
    pub reduce_scope_min_days: u32,

    /// Durations above this many days get a split suggestion
    pub split_min_days: u32,

    /// Proposed duration as a percentage of the current one (rounded up)
    pub scope_reduction_percent: u32,
}

impl Default for SchedulingPolicy {
    fn default() -> Self {
        Self {
            bottleneck_limit: DEFAULT_BOTTLENECK_LIMIT,
            reduce_scope_min_days: 3,
            split_min_days: 5,
            scope_reduction_percent: 70,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SuggestionKind {
    ReduceScope {
        current_duration: u32,
        proposed_duration: u32,
    },
    Split {
        current_duration: u32,
        parts: u32,
    },
    RemoveDependency {
        keep: TaskId,
        remove: Vec<TaskId>,
    },
    Reschedule {
        deadline: NaiveDate,
        predicted_end: NaiveDate,
        days_over: i64,
        proposed_duration: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Impact {
    /// Titles of every transitive dependent
    pub affected_tasks: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub task_id: TaskId,
    pub task_title: String,
    #[serde(flatten)]
    pub kind: SuggestionKind,
    pub days_gained: u32,
    pub description: String,
    pub impact: Impact,
    #[serde(skip)]
    pub priority: Option<Priority>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BottleneckSummary {
    pub task_id: TaskId,
    pub title: String,
    pub dependent_count: usize,
    pub reason: BottleneckReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleSuggestions {
    pub suggestions: Vec<Suggestion>,
    pub critical_path: Vec<TaskId>,
    pub total_critical_path_days: u32,
    pub bottleneck_tasks: Vec<BottleneckSummary>,
}

/// Builds suggestions for the whole board, or for the chain ending at `target`
pub fn suggest_schedule_changes(
    graph: &TaskGraph<'_>,
    target: Option<&TaskId>,
    deadline: Option<NaiveDate>,
    policy: &SchedulingPolicy,
) -> Result<ScheduleSuggestions, ScheduleError> {
    let (path, bottlenecks) = match target {
        Some(target_id) => {
            let path = critical_path_to(graph, target_id)?;
            let mut scope = graph.transitive_dependencies(target_id);
            scope.extend(graph.get(target_id));
            scope.sort_by_key(|t| graph.position(&t.id));
            (path, rank_bottlenecks(graph, scope, policy.bottleneck_limit))
        }
        None => (
            critical_path(graph),
            rank_bottlenecks(graph, graph.tasks(), policy.bottleneck_limit),
        ),
    };

    let mut suggestions = Vec::new();

    for bottleneck in &bottlenecks {
        let task = bottleneck.task;
        let impact = impact_of(graph, task);

        if let Some(duration) = task.duration_days {
            if duration > policy.reduce_scope_min_days {
                let proposed = reduced_duration(duration, policy.scope_reduction_percent);
                suggestions.push(Suggestion {
                    description: format!(
                        "Reduce the scope of '{}' from {} to {} days",
                        task.label(),
                        duration,
                        proposed
                    ),
                    days_gained: duration.saturating_sub(proposed),
                    ..suggestion(
                        task,
                        SuggestionKind::ReduceScope {
                            current_duration: duration,
                            proposed_duration: proposed,
                        },
                        impact.clone(),
                    )
                });
            }

            if duration > policy.split_min_days {
                let parts = duration.div_ceil(2);
                suggestions.push(Suggestion {
                    description: format!(
                        "Split '{}' ({} days) into {} smaller tasks that can overlap",
                        task.label(),
                        duration,
                        parts
                    ),
                    days_gained: duration / 2,
                    ..suggestion(
                        task,
                        SuggestionKind::Split {
                            current_duration: duration,
                            parts,
                        },
                        impact.clone(),
                    )
                });
            }
        }

        if let Some((keep, remove)) = redundant_dependency(graph, task) {
            let description = format!(
                "'{}' is gated by {}; consider dropping the ordering on {}",
                task.label(),
                keep,
                join_ids(&remove)
            );
            suggestions.push(Suggestion {
                description,
                ..suggestion(task, SuggestionKind::RemoveDependency { keep, remove }, impact)
            });
        }
    }

    if let Some(deadline) = deadline {
        let mut resolver = DateResolver::new(graph);
        for task in &path.tasks {
            let Some(predicted_end) = resolver.resolve(task).predicted_end else {
                continue;
            };
            if predicted_end <= deadline {
                continue;
            }

            let days_over = dates::days_between(deadline, predicted_end);
            let duration = task.weight_days();
            let cut = u32::try_from(days_over).unwrap_or(u32::MAX);
            let proposed = duration.saturating_sub(cut).max(1);

            suggestions.push(Suggestion {
                description: format!(
                    "'{}' ends {} ({} days after {}); shorten it to {} days or move the deadline",
                    task.label(),
                    predicted_end,
                    days_over,
                    deadline,
                    proposed
                ),
                days_gained: duration - proposed,
                ..suggestion(
                    task,
                    SuggestionKind::Reschedule {
                        deadline,
                        predicted_end,
                        days_over,
                        proposed_duration: proposed,
                    },
                    impact_of(graph, task),
                )
            });
        }
    }

    // Stable: equal gains keep generation order
    suggestions.sort_by(|a, b| {
        b.days_gained
            .cmp(&a.days_gained)
            .then_with(|| b.priority.cmp(&a.priority))
    });

    Ok(ScheduleSuggestions {
        suggestions,
        critical_path: path.ids().into_iter().cloned().collect(),
        total_critical_path_days: path.total_days,
        bottleneck_tasks: bottlenecks
            .iter()
            .map(|b| BottleneckSummary {
                task_id: b.task.id.clone(),
                title: b.task.title.clone(),
                dependent_count: b.dependent_count,
                reason: b.reason,
            })
            .collect(),
    })
}

fn suggestion(task: &Task, kind: SuggestionKind, impact: Impact) -> Suggestion {
    Suggestion {
        task_id: task.id.clone(),
        task_title: task.title.clone(),
        kind,
        days_gained: 0,
        description: String::new(),
        impact,
        priority: task.priority,
    }
}

fn impact_of(graph: &TaskGraph<'_>, task: &Task) -> Impact {
    Impact {
        affected_tasks: graph
            .transitive_dependents(&task.id)
            .into_iter()
            .map(|t| t.label().to_string())
            .collect(),
    }
}

/// `ceil(duration * percent / 100)`, never below one day
fn reduced_duration(duration: u32, percent: u32) -> u32 {
    let scaled = (u64::from(duration) * u64::from(percent)).div_ceil(100);
    u32::try_from(scaled).unwrap_or(duration).max(1)
}

/// The gating dependency plus the other incomplete ones, when there is more than one
fn redundant_dependency(graph: &TaskGraph<'_>, task: &Task) -> Option<(TaskId, Vec<TaskId>)> {
    let pending: Vec<&Task> = graph
        .dependencies(task)
        .into_iter()
        .filter(|dep| !dep.is_completed())
        .collect();
    if pending.len() < 2 {
        return None;
    }

    // Completed dependencies no longer gate anything; pick among the rest
    let mut resolver = DateResolver::new(graph);
    let mut gate: Option<(&Task, NaiveDate)> = None;
    for &dep in &pending {
        let Some(end) = resolver.end_of(dep) else {
            continue;
        };
        if gate.map_or(true, |(_, best)| end > best) {
            gate = Some((dep, end));
        }
    }
    let (gate, _) = gate?;

    let remove: Vec<TaskId> = pending
        .iter()
        .filter(|dep| dep.id != gate.id)
        .map(|dep| dep.id.clone())
        .collect();

    Some((gate.id.clone(), remove))
}

fn join_ids(ids: &[TaskId]) -> String {
    ids.iter()
        .map(TaskId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
