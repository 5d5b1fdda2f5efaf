//! Start / due / duration reconciliation
//!
//! The three date fields constrain each other. Which one gives way is
//! decided by a two-state mode:
//!
//! | Mode | Authoritative | Derived |
//! |------|---------------|---------|
//! | `DurationAuthoritative` | start + duration | due = start + duration - 1 |
//! | `DeadlineAuthoritative` | start + due | duration = due - start + 1 |
//!
//! Transitions only happen on explicit edits: supplying a due date moves to
//! deadline mode, supplying a duration moves to duration mode, and an
//! explicit `is_due_date_fixed` overrides both.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use super::effective::effective_dates;
use super::error::{DateRule, ScheduleError, ScheduleWarning};
use crate::domain::{dates, DateFields, Task, TaskGraph};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DateMode {
    DurationAuthoritative,
    DeadlineAuthoritative,
}

impl DateMode {
    pub fn from_fixed_flag(is_due_date_fixed: bool) -> Self {
        if is_due_date_fixed {
            DateMode::DeadlineAuthoritative
        } else {
            DateMode::DurationAuthoritative
        }
    }

    pub fn is_due_date_fixed(self) -> bool {
        matches!(self, DateMode::DeadlineAuthoritative)
    }
}

/// A partial update to the date fields
///
/// Outer `None` leaves a field untouched; `Some(None)` clears it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct DateChanges {
    #[serde(default, deserialize_with = "explicit")]
    pub start_date: Option<Option<NaiveDate>>,

    #[serde(default, deserialize_with = "explicit")]
    pub due_date: Option<Option<NaiveDate>>,

    #[serde(default, deserialize_with = "explicit")]
    pub duration_days: Option<Option<u32>>,

    #[serde(default)]
    pub is_due_date_fixed: Option<bool>,
}

/// Distinguishes an explicit `null` from an absent field
fn explicit<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl DateChanges {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_date(mut self, value: Option<NaiveDate>) -> Self {
        self.start_date = Some(value);
        self
    }

    pub fn due_date(mut self, value: Option<NaiveDate>) -> Self {
        self.due_date = Some(value);
        self
    }

    pub fn duration_days(mut self, value: Option<u32>) -> Self {
        self.duration_days = Some(value);
        self
    }

    pub fn fixed(mut self, value: bool) -> Self {
        self.is_due_date_fixed = Some(value);
        self
    }

    /// True when nothing is being changed
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Consistent date fields produced by reconciliation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reconciliation {
    #[serde(flatten)]
    pub fields: DateFields,
    pub mode: DateMode,
    #[serde(skip)]
    pub warnings: Vec<ScheduleWarning>,
}

/// Applies `changes` to a task's date fields and returns a consistent result
pub fn recalculate_dates(
    existing: &Task,
    changes: &DateChanges,
) -> Result<Reconciliation, ScheduleError> {
    reconcile_fields(&existing.date_fields(), changes)
}

/// Like [`recalculate_dates`], also warning when the dependency chain makes a
/// fixed deadline unreachable
pub fn recalculate_dates_in_context(
    existing: &Task,
    changes: &DateChanges,
    graph: &TaskGraph<'_>,
) -> Result<Reconciliation, ScheduleError> {
    let mut reconciliation = recalculate_dates(existing, changes)?;

    if reconciliation.mode == DateMode::DeadlineAuthoritative {
        let mut updated = existing.clone();
        updated.set_date_fields(reconciliation.fields);

        if let Some(warning) = effective_dates(&updated, graph).overdue_warning(&updated) {
            if !reconciliation.warnings.contains(&warning) {
                reconciliation.warnings.push(warning);
            }
        }
    }

    Ok(reconciliation)
}

/// The pure reconciliation step over the raw field values
pub fn reconcile_fields(
    existing: &DateFields,
    changes: &DateChanges,
) -> Result<Reconciliation, ScheduleError> {
    let mut fields = *existing;

    if let Some(start) = changes.start_date {
        fields.start_date = start;
    }
    if let Some(due) = changes.due_date {
        fields.due_date = due;
    }
    if let Some(duration) = changes.duration_days {
        fields.duration_days = duration;
    }

    let mode = next_mode(existing, changes);
    let mut warnings = Vec::new();

    if fields.duration_days == Some(0) {
        return Err(invalid(DateRule::ZeroDuration));
    }

    match mode {
        DateMode::DurationAuthoritative => {
            if let (Some(start), Some(duration)) = (fields.start_date, fields.duration_days) {
                fields.due_date =
                    Some(dates::span_end(start, duration).ok_or(invalid(DateRule::OutOfRange))?);
            }
        }
        DateMode::DeadlineAuthoritative => {
            let dates_moved = changes.start_date.is_some() || changes.due_date.is_some();
            if changes.duration_days.is_none() && dates_moved {
                fields.duration_days = match (fields.start_date, fields.due_date) {
                    (Some(start), Some(due)) => Some(
                        dates::span_days(start, due)
                            .ok_or(invalid(DateRule::DueBeforeStart { start, due }))?,
                    ),
                    // Without a start the adapted duration has no anchor
                    (None, _) => None,
                    (Some(_), None) => fields.duration_days,
                };
            } else if let (Some(derived), Some(due)) = (fields.derived_due_date(), fields.due_date) {
                if derived > due {
                    warnings.push(ScheduleWarning::DeadlineOverdue {
                        predicted_end: derived,
                        due_date: due,
                    });
                }
            }
        }
    }

    fields.is_due_date_fixed = mode.is_due_date_fixed();
    check_invariants(&fields)?;

    Ok(Reconciliation {
        fields,
        mode,
        warnings,
    })
}

/// Mode after applying the edit rules in order; an explicit flag wins
fn next_mode(existing: &DateFields, changes: &DateChanges) -> DateMode {
    if let Some(fixed) = changes.is_due_date_fixed {
        return DateMode::from_fixed_flag(fixed);
    }

    let mut mode = DateMode::from_fixed_flag(existing.is_due_date_fixed);
    if let Some(due) = changes.due_date {
        mode = DateMode::from_fixed_flag(due.is_some());
    }
    if changes.duration_days.is_some() {
        mode = DateMode::DurationAuthoritative;
    }
    mode
}

fn check_invariants(fields: &DateFields) -> Result<(), ScheduleError> {
    if fields.duration_days.is_some() && fields.start_date.is_none() {
        return Err(invalid(DateRule::DurationWithoutStart));
    }
    if fields.is_due_date_fixed && fields.due_date.is_none() {
        return Err(invalid(DateRule::FixedWithoutDueDate));
    }
    if let (Some(start), Some(due)) = (fields.start_date, fields.due_date) {
        if due < start {
            return Err(invalid(DateRule::DueBeforeStart { start, due }));
        }
    }
    Ok(())
}

fn invalid(rule: DateRule) -> ScheduleError {
    ScheduleError::InvalidDateCombination(rule)
}
