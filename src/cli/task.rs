//! Task editing commands (validate, dep, undep, done, reconcile)
//!
//! Every edit is checked against the current snapshot before the store is
//! touched; a rejected edit leaves the file as it was.

use std::fmt::Display;
use std::str::FromStr;

use anyhow::Result;
use chrono::{NaiveDate, NaiveTime};

use super::board::{find, Board};
use super::output::{date_or_dash, warnings_json, Output};
use crate::domain::{TaskGraph, TaskId};
use crate::schedule::{recalculate_dates_in_context, validate_dependencies, DateChanges};

/// A flag value that may be `none` to clear the field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clearable<T>(pub Option<T>);

impl<T> FromStr for Clearable<T>
where
    T: FromStr,
    T::Err: Display,
{
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("none") {
            return Ok(Self(None));
        }
        s.parse()
            .map(|value| Self(Some(value)))
            .map_err(|e| format!("{} (use 'none' to clear)", e))
    }
}

/// Check a proposed dependency set without saving it
pub fn validate(board: &Board, output: &Output, id: &TaskId, depends_on: &[TaskId]) -> Result<()> {
    let tasks = board.load(output)?;
    let graph = TaskGraph::from_tasks(&tasks);

    let report = validate_dependencies(id, depends_on, &graph);
    output.verbose_ctx(
        "validate",
        &format!(
            "{} error(s), {} warning(s)",
            report.errors.len(),
            report.warnings.len()
        ),
    );

    if output.is_json() {
        output.data(&report);
    } else {
        for error in &report.errors {
            println!("error[{}]: {}", error.kind(), error);
        }
        output.warnings(&report.warnings);
        if report.is_valid() {
            println!("Dependencies for {} are valid", id);
        }
    }

    if !report.is_valid() {
        anyhow::bail!("Dependency validation failed for {}", id);
    }

    Ok(())
}

/// Add dependencies to a task after validating them
pub fn add_dependencies(
    board: &Board,
    output: &Output,
    id: &TaskId,
    depends_on: &[TaskId],
) -> Result<()> {
    let tasks = board.load(output)?;
    let graph = TaskGraph::from_tasks(&tasks);
    let mut task = find(&graph, id)?.clone();

    let warnings = match validate_dependencies(id, depends_on, &graph).into_result() {
        Ok(warnings) => warnings,
        Err(errors) => {
            if output.is_json() {
                let items: Vec<_> = errors
                    .iter()
                    .map(|e| serde_json::json!({ "kind": e.kind(), "message": e.to_string() }))
                    .collect();
                output.data(&serde_json::json!({ "task": id, "errors": items }));
            }
            let messages: Vec<_> = errors.iter().map(ToString::to_string).collect();
            anyhow::bail!("{}", messages.join("; "));
        }
    };

    let added: Vec<&TaskId> = depends_on
        .iter()
        .filter(|dep| task.add_dependency((*dep).clone()))
        .collect();

    if added.is_empty() {
        output.verbose_ctx("dep", "All dependencies already present; nothing written");
    } else {
        board.store().update(&task)?;
    }

    if output.is_json() {
        output.data(&serde_json::json!({
            "task": id,
            "added": added,
            "depends_on": task.depends_on,
            "warnings": warnings_json(&warnings),
        }));
    } else {
        output.warnings(&warnings);
        let ids: Vec<_> = task.depends_on.iter().map(TaskId::as_str).collect();
        output.success(&format!("{} now depends on {}", id, ids.join(", ")));
    }

    Ok(())
}

/// Remove dependencies from a task
pub fn remove_dependencies(
    board: &Board,
    output: &Output,
    id: &TaskId,
    depends_on: &[TaskId],
) -> Result<()> {
    let tasks = board.load(output)?;
    let graph = TaskGraph::from_tasks(&tasks);
    let mut task = find(&graph, id)?.clone();

    let removed: Vec<&TaskId> = depends_on
        .iter()
        .filter(|dep| task.remove_dependency(dep))
        .collect();

    if !removed.is_empty() {
        board.store().update(&task)?;
    }

    if output.is_json() {
        output.data(&serde_json::json!({
            "task": id,
            "removed": removed,
            "depends_on": task.depends_on,
        }));
    } else if removed.is_empty() {
        output.success(&format!("{} had none of those dependencies", id));
    } else {
        let ids: Vec<_> = removed.iter().map(|id| id.as_str()).collect();
        output.success(&format!("{} no longer depends on {}", id, ids.join(", ")));
    }

    Ok(())
}

/// Mark a task as done
pub fn complete(board: &Board, output: &Output, id: &TaskId) -> Result<()> {
    let tasks = board.load(output)?;
    let graph = TaskGraph::from_tasks(&tasks);
    let mut task = find(&graph, id)?.clone();

    if task.is_completed() {
        output.verbose_ctx("done", &format!("{} is already done", id));
    } else {
        // Midnight UTC of the board's today
        task.complete(board.today().and_time(NaiveTime::MIN).and_utc());
        board.store().update(&task)?;
    }

    let unblocked: Vec<&TaskId> = graph
        .dependents(id)
        .into_iter()
        .filter(|dependent| {
            !dependent.is_completed()
                && dependent.depends_on.iter().all(|dep| {
                    dep == id || graph.get(dep).is_some_and(|t| t.is_completed())
                })
        })
        .map(|dependent| &dependent.id)
        .collect();

    if output.is_json() {
        output.data(&serde_json::json!({
            "task": id,
            "status": task.status,
            "completed_at": task.completed_at,
            "unblocked": unblocked,
        }));
    } else {
        output.success(&format!("Completed {}", id));
        for dependent in unblocked {
            println!("  unblocked: {}", dependent);
        }
    }

    Ok(())
}

/// Reconcile a date edit, optionally saving the result
pub fn reconcile(
    board: &Board,
    output: &Output,
    id: &TaskId,
    changes: DateChanges,
    write: bool,
) -> Result<()> {
    if changes.is_empty() {
        anyhow::bail!("Nothing to change: pass --start, --due, --duration or --fixed");
    }

    let tasks = board.load(output)?;
    let graph = TaskGraph::from_tasks(&tasks);
    let existing = find(&graph, id)?;

    let reconciliation = recalculate_dates_in_context(existing, &changes, &graph)?;
    output.verbose_ctx(
        "reconcile",
        &format!("Mode after edit: {:?}", reconciliation.mode),
    );

    if write {
        let mut task = existing.clone();
        task.set_date_fields(reconciliation.fields);
        board.store().update(&task)?;
        output.verbose_ctx("reconcile", &format!("Saved {}", id));
    }

    let fields = &reconciliation.fields;
    if output.is_json() {
        output.data(&serde_json::json!({
            "task": id,
            "start_date": fields.start_date,
            "due_date": fields.due_date,
            "duration_days": fields.duration_days,
            "is_due_date_fixed": fields.is_due_date_fixed,
            "mode": reconciliation.mode,
            "written": write,
            "warnings": warnings_json(&reconciliation.warnings),
        }));
        return Ok(());
    }

    println!("{}", id);
    println!("  start:    {}", date_or_dash(fields.start_date));
    println!(
        "  due:      {}{}",
        date_or_dash(fields.due_date),
        if fields.is_due_date_fixed { " (fixed)" } else { "" }
    );
    println!(
        "  duration: {}",
        fields
            .duration_days
            .map_or_else(|| "-".to_string(), |d| format!("{} days", d))
    );
    output.warnings(&reconciliation.warnings);
    if !write {
        println!("(not saved; pass --write to apply)");
    }

    Ok(())
}

/// Builds a change set from the reconcile flags
pub fn date_changes(
    start: Option<Clearable<NaiveDate>>,
    due: Option<Clearable<NaiveDate>>,
    duration: Option<Clearable<u32>>,
    fixed: Option<bool>,
) -> DateChanges {
    DateChanges {
        start_date: start.map(|c| c.0),
        due_date: due.map(|c| c.0),
        duration_days: duration.map(|c| c.0),
        is_due_date_fixed: fixed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clearable_parses_values_and_none() {
        let date: Clearable<NaiveDate> = "2024-01-05".parse().unwrap();
        assert_eq!(date.0, Some("2024-01-05".parse().unwrap()));

        let cleared: Clearable<NaiveDate> = "NONE".parse().unwrap();
        assert_eq!(cleared.0, None);

        let err = "soon".parse::<Clearable<u32>>().unwrap_err();
        assert!(err.contains("none"));
    }

    #[test]
    fn flags_map_to_changes() {
        let changes = date_changes(
            Some(Clearable(Some("2024-01-01".parse().unwrap()))),
            Some(Clearable(None)),
            None,
            Some(true),
        );

        assert_eq!(changes.start_date, Some(Some("2024-01-01".parse().unwrap())));
        assert_eq!(changes.due_date, Some(None));
        assert_eq!(changes.duration_days, None);
        assert_eq!(changes.is_due_date_fixed, Some(true));
        assert!(date_changes(None, None, None, None).is_empty());
    }
}
