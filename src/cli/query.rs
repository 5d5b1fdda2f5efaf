//! Query commands (dates, blocked, critical-path, bottlenecks, delay, suggest)
//!
//! Read-only: each command loads one snapshot and reports on it.

use anyhow::Result;
use chrono::NaiveDate;

use super::board::{find, Board};
use super::output::{date_or_dash, warnings_json, Output};
use crate::domain::{TaskGraph, TaskId};
use crate::schedule::{
    blockers, bottleneck_task, critical_path, effective_dates, find_bottlenecks_with_limit,
    is_task_blocked, notify_dependency_delays, suggest_schedule_changes,
};

/// Show effective dates for one task
pub fn dates(board: &Board, output: &Output, id: &TaskId) -> Result<()> {
    let tasks = board.load(output)?;
    let graph = TaskGraph::from_tasks(&tasks);
    let task = find(&graph, id)?;

    let effective = effective_dates(task, &graph);
    if effective.cycle_detected {
        output.verbose_ctx("dates", "Dependency chain contains a cycle; dates left unresolved");
    }

    let blocked_by = if task.is_completed() {
        Vec::new()
    } else {
        blockers(task, &graph)
    };
    let gate = bottleneck_task(task, &graph);
    let behind = !task.is_completed() && effective.is_behind(board.today());
    let warnings: Vec<_> = effective.overdue_warning(task).into_iter().collect();

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": task.id,
            "title": task.title,
            "status": task.status,
            "start_date": task.start_date,
            "due_date": task.due_date,
            "duration_days": task.duration_days,
            "is_due_date_fixed": task.is_due_date_fixed,
            "effective": effective,
            "is_blocked": is_task_blocked(task, &graph),
            "blocked_by": blocked_by,
            "bottleneck": gate.map(|t| &t.id),
            "is_behind": behind,
            "warnings": warnings_json(&warnings),
        }));
        return Ok(());
    }

    println!("{} {} [{}]", task.id, task.label(), task.status.label());
    println!("  start:           {}", date_or_dash(task.start_date));
    println!(
        "  due:             {}{}",
        date_or_dash(task.due_date),
        if task.is_due_date_fixed { " (fixed)" } else { "" }
    );
    println!(
        "  duration:        {}",
        task.duration_days
            .map_or_else(|| "-".to_string(), |d| format!("{} days", d))
    );
    println!("  predicted start: {}", date_or_dash(effective.predicted_start));
    println!("  predicted end:   {}", date_or_dash(effective.predicted_end));
    if let Some(gate) = gate {
        println!("  gated by:        {} {}", gate.id, gate.label());
    }
    if !blocked_by.is_empty() {
        let ids: Vec<_> = blocked_by.iter().map(|id| id.as_str()).collect();
        println!("  blocked by:      {}", ids.join(", "));
    }
    if behind {
        println!("  behind schedule as of {}", board.today());
    }
    output.warnings(&warnings);

    Ok(())
}

/// Show tasks waiting on unfinished dependencies
pub fn blocked(board: &Board, output: &Output) -> Result<()> {
    let tasks = board.load(output)?;
    let graph = TaskGraph::from_tasks(&tasks);

    let blocked_tasks: Vec<_> = graph
        .tasks()
        .filter(|task| is_task_blocked(task, &graph))
        .map(|task| (task, blockers(task, &graph)))
        .collect();

    output.verbose_ctx(
        "blocked",
        &format!("Found {} blocked tasks", blocked_tasks.len()),
    );

    if output.is_json() {
        let items: Vec<_> = blocked_tasks
            .iter()
            .map(|(task, blockers)| {
                serde_json::json!({
                    "id": task.id,
                    "title": task.title,
                    "blocked_by": blockers,
                })
            })
            .collect();
        output.data(&items);
    } else if blocked_tasks.is_empty() {
        println!("No blocked tasks.");
    } else {
        println!("Blocked tasks ({}):", blocked_tasks.len());
        println!("{:<20} {:<30} BLOCKED BY", "ID", "TITLE");
        println!("{}", "-".repeat(80));
        for (task, blockers) in blocked_tasks {
            let ids: Vec<_> = blockers.iter().map(|id| id.as_str()).collect();
            println!("{:<20} {:<30} {}", task.id, task.title, ids.join(", "));
        }
    }

    Ok(())
}

/// Show the longest chain of incomplete work
pub fn critical(board: &Board, output: &Output) -> Result<()> {
    let tasks = board.load(output)?;
    let graph = TaskGraph::from_tasks(&tasks);
    let path = critical_path(&graph);

    if output.is_json() {
        let items: Vec<_> = path
            .tasks
            .iter()
            .map(|task| {
                serde_json::json!({
                    "id": task.id,
                    "title": task.title,
                    "days": task.weight_days(),
                })
            })
            .collect();
        output.data(&serde_json::json!({
            "tasks": items,
            "total_days": path.total_days,
        }));
    } else if path.is_empty() {
        println!("No incomplete tasks.");
    } else {
        println!("Critical path ({} days):", path.total_days);
        for (i, task) in path.tasks.iter().enumerate() {
            println!(
                "{:>3}. {:<20} {:>4}d  {}",
                i + 1,
                task.id,
                task.weight_days(),
                task.title
            );
        }
    }

    Ok(())
}

/// Show tasks holding up blocked work
pub fn bottlenecks(board: &Board, output: &Output) -> Result<()> {
    let tasks = board.load(output)?;
    let graph = TaskGraph::from_tasks(&tasks);
    let limit = board.policy().bottleneck_limit;
    output.verbose_ctx("bottlenecks", &format!("Reporting at most {}", limit));

    let found = find_bottlenecks_with_limit(&graph, limit);

    if output.is_json() {
        let items: Vec<_> = found
            .iter()
            .map(|b| {
                serde_json::json!({
                    "id": b.task.id,
                    "title": b.task.title,
                    "dependent_count": b.dependent_count,
                    "reason": b.reason,
                    "description": b.reason.describe(),
                })
            })
            .collect();
        output.data(&items);
    } else if found.is_empty() {
        println!("No bottlenecks.");
    } else {
        println!("Bottlenecks ({}):", found.len());
        println!("{:<20} {:<30} {:>10}  REASON", "ID", "TITLE", "DEPENDENTS");
        println!("{}", "-".repeat(100));
        for b in found {
            println!(
                "{:<20} {:<30} {:>10}  {}",
                b.task.id, b.task.title, b.dependent_count, b.reason
            );
        }
    }

    Ok(())
}

/// Show how a new end date ripples downstream
pub fn delay(board: &Board, output: &Output, id: &TaskId, new_end: Option<NaiveDate>) -> Result<()> {
    let tasks = board.load(output)?;
    let graph = TaskGraph::from_tasks(&tasks);
    let report = notify_dependency_delays(id, new_end, &graph)?;

    if output.is_json() {
        output.data(&report);
        return Ok(());
    }

    println!(
        "{} shifts by {} day(s); {} downstream task(s)",
        report.delayed_task,
        report.delay_from_original,
        report.affected_tasks.len()
    );
    if !report.affected_tasks.is_empty() {
        println!("{:<20} {:<30} {:<12} {:<12} LATE", "ID", "TITLE", "WAS", "NOW");
        println!("{}", "-".repeat(90));
        for affected in &report.affected_tasks {
            println!(
                "{:<20} {:<30} {:<12} {:<12} {}",
                affected.task_id,
                affected.title,
                date_or_dash(affected.original_predicted_end),
                date_or_dash(affected.new_predicted_end),
                affected.delay_days
            );
        }
    }
    if report.critical_path_affected {
        println!("The critical path is affected.");
    }

    Ok(())
}

/// Show advisory schedule changes
pub fn suggest(
    board: &Board,
    output: &Output,
    target: Option<&TaskId>,
    deadline: Option<NaiveDate>,
) -> Result<()> {
    let tasks = board.load(output)?;
    let graph = TaskGraph::from_tasks(&tasks);
    output.verbose_ctx(
        "suggest",
        &format!("target={:?}, deadline={:?}", target.map(TaskId::as_str), deadline),
    );

    let result = suggest_schedule_changes(&graph, target, deadline, board.policy())?;

    if output.is_json() {
        output.data(&result);
        return Ok(());
    }

    let path: Vec<_> = result.critical_path.iter().map(TaskId::as_str).collect();
    println!(
        "Critical path ({} days): {}",
        result.total_critical_path_days,
        if path.is_empty() { "-".to_string() } else { path.join(" -> ") }
    );

    if !result.bottleneck_tasks.is_empty() {
        println!();
        println!("Bottlenecks:");
        for b in &result.bottleneck_tasks {
            println!(
                "  {} {} ({} dependents): {}",
                b.task_id, b.title, b.dependent_count, b.reason
            );
        }
    }

    println!();
    if result.suggestions.is_empty() {
        println!("No suggestions.");
    } else {
        println!("Suggestions:");
        for s in &result.suggestions {
            println!("  [{} days] {}", s.days_gained, s.description);
        }
    }

    Ok(())
}
