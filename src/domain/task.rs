//! Task domain model
//!
//! Tasks are owned by an external store; the scheduling engine treats each
//! one as an immutable value for the duration of a computation.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::dates;
use super::id::TaskId;

/// Status of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Done,
}

impl TaskStatus {
    /// Returns true if this status represents completion
    pub fn is_complete(&self) -> bool {
        matches!(self, TaskStatus::Done)
    }

    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Done => "done",
        }
    }
}

/// Ordinal priority, only used to rank suggestions
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

/// The three mutually-constraining date fields plus the deadline policy flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DateFields {
    #[serde(default)]
    pub start_date: Option<NaiveDate>,

    #[serde(default)]
    pub due_date: Option<NaiveDate>,

    #[serde(default)]
    pub duration_days: Option<u32>,

    #[serde(default)]
    pub is_due_date_fixed: bool,
}

impl DateFields {
    /// `start + duration - 1`, when both are known
    pub fn derived_due_date(&self) -> Option<NaiveDate> {
        match (self.start_date, self.duration_days) {
            (Some(start), Some(duration)) => dates::span_end(start, duration),
            _ => None,
        }
    }
}

/// A task on the board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier
    pub id: TaskId,

    /// Human-readable title
    #[serde(default)]
    pub title: String,

    /// Current status
    #[serde(default)]
    pub status: TaskStatus,

    /// Tasks that must finish before this one can start
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<TaskId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,

    /// Inclusive day span starting at `start_date`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_days: Option<u32>,

    /// When true the due date is authoritative and duration adapts to it
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_due_date_fixed: bool,

    /// When the task was completed (if done)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

impl Task {
    /// Creates a new task with the given ID and title
    pub fn new(id: TaskId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            status: TaskStatus::Todo,
            depends_on: Vec::new(),
            start_date: None,
            due_date: None,
            duration_days: None,
            is_due_date_fixed: false,
            completed_at: None,
            priority: None,
        }
    }

    /// Returns true if the task is done
    pub fn is_completed(&self) -> bool {
        self.status.is_complete()
    }

    /// Date the task actually finished: `completed_at`, falling back to `due_date`
    pub fn completion_date(&self) -> Option<NaiveDate> {
        self.completed_at
            .map(|at| at.date_naive())
            .or(self.due_date)
    }

    /// Duration used for path weighting (missing counts as one day)
    pub fn weight_days(&self) -> u32 {
        self.duration_days.unwrap_or(1).max(1)
    }

    /// Returns the date fields as a single value
    pub fn date_fields(&self) -> DateFields {
        DateFields {
            start_date: self.start_date,
            due_date: self.due_date,
            duration_days: self.duration_days,
            is_due_date_fixed: self.is_due_date_fixed,
        }
    }

    /// Overwrites the date fields (used after reconciliation)
    pub fn set_date_fields(&mut self, fields: DateFields) {
        self.start_date = fields.start_date;
        self.due_date = fields.due_date;
        self.duration_days = fields.duration_days;
        self.is_due_date_fixed = fields.is_due_date_fixed;
    }

    /// Adds a dependency, ignoring duplicates
    pub fn add_dependency(&mut self, task_id: TaskId) -> bool {
        if self.depends_on.contains(&task_id) {
            return false;
        }
        self.depends_on.push(task_id);
        true
    }

    /// Removes a dependency
    pub fn remove_dependency(&mut self, task_id: &TaskId) -> bool {
        let len_before = self.depends_on.len();
        self.depends_on.retain(|id| id != task_id);
        self.depends_on.len() != len_before
    }

    /// Transitions to done status
    pub fn complete(&mut self, at: DateTime<Utc>) {
        if !self.status.is_complete() {
            self.status = TaskStatus::Done;
            self.completed_at = Some(at);
        }
    }

    /// Label used in output: the title, or the ID when untitled
    pub fn label(&self) -> &str {
        if self.title.is_empty() {
            self.id.as_str()
        } else {
            &self.title
        }
    }
}
