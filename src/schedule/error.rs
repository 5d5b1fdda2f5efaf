//! Validation errors and advisories
//!
//! Errors are fatal: the proposed mutation must not be persisted. Warnings
//! ride along with a successful result and are shown as advice.

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::TaskId;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Unknown dependency: task {0} does not exist")]
    UnknownDependency(TaskId),

    #[error("Adding dependency would create a cycle: {task} -> {depends_on}")]
    CircularDependency { task: TaskId, depends_on: TaskId },

    #[error("Self-dependency not allowed: {0}")]
    SelfDependency(TaskId),

    #[error("Invalid date combination: {0}")]
    InvalidDateCombination(DateRule),

    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),
}

impl ScheduleError {
    /// Stable machine-readable kind
    pub fn kind(&self) -> &'static str {
        match self {
            ScheduleError::UnknownDependency(_) => "unknown_dependency",
            ScheduleError::CircularDependency { .. } => "circular_dependency",
            ScheduleError::SelfDependency(_) => "self_dependency",
            ScheduleError::InvalidDateCombination(_) => "invalid_date_combination",
            ScheduleError::TaskNotFound(_) => "task_not_found",
        }
    }
}

/// Which date invariant a rejected combination breaks
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum DateRule {
    #[error("duration is set but start date is missing")]
    DurationWithoutStart,

    #[error("due date is marked fixed but no due date is set")]
    FixedWithoutDueDate,

    #[error("due date {due} is before start date {start}")]
    DueBeforeStart { start: NaiveDate, due: NaiveDate },

    #[error("duration must be at least one day")]
    ZeroDuration,

    #[error("date is out of the supported range")]
    OutOfRange,
}

/// Non-fatal advisory returned alongside a successful result
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScheduleWarning {
    #[error("Task {0} is already completed; the dependency will not block")]
    DependsOnCompletedTask(TaskId),

    #[error("Predicted end {predicted_end} is after the fixed due date {due_date}")]
    DeadlineOverdue {
        predicted_end: NaiveDate,
        due_date: NaiveDate,
    },
}

impl ScheduleWarning {
    /// Stable machine-readable kind
    pub fn kind(&self) -> &'static str {
        match self {
            ScheduleWarning::DependsOnCompletedTask(_) => "depends_on_completed_task",
            ScheduleWarning::DeadlineOverdue { .. } => "deadline_overdue",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_tasks() {
        let err = ScheduleError::CircularDependency {
            task: "b".parse().unwrap(),
            depends_on: "a".parse().unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "Adding dependency would create a cycle: b -> a"
        );
        assert_eq!(err.kind(), "circular_dependency");
    }

    #[test]
    fn date_rule_in_message() {
        let err = ScheduleError::InvalidDateCombination(DateRule::DurationWithoutStart);
        assert_eq!(
            err.to_string(),
            "Invalid date combination: duration is set but start date is missing"
        );
    }
}
