//! # Scheduling Engine
//!
//! Pure, synchronous computations over a task snapshot. Nothing here
//! performs I/O, mutates its input, reads the clock, or keeps state
//! between calls.
//!
//! | Component | Entry point |
//! |-----------|-------------|
//! | Dependency validation | [`validate_dependencies`] |
//! | Effective dates | [`effective_dates`], [`bottleneck_task`], [`is_task_blocked`] |
//! | Date reconciliation | [`recalculate_dates`], [`recalculate_dates_in_context`] |
//! | Critical path | [`critical_path`] |
//! | Bottlenecks | [`find_bottlenecks`] |
//! | Delay propagation | [`notify_dependency_delays`] |
//! | Suggestions | [`suggest_schedule_changes`] |
//!
//! Fatal problems are [`ScheduleError`]s; advisories are [`ScheduleWarning`]s.

mod bottleneck;
mod critical_path;
mod delay;
mod effective;
mod error;
mod reconcile;
mod suggest;
mod validate;

pub use bottleneck::{
    find_bottlenecks, find_bottlenecks_with_limit, Bottleneck, BottleneckReason,
    DEFAULT_BOTTLENECK_LIMIT,
};
pub use critical_path::{critical_path, critical_path_to, CriticalPath};
pub use delay::{notify_dependency_delays, AffectedTask, DelayReport};
pub use effective::{
    blockers, bottleneck_task, effective_dates, is_task_blocked, DateResolver, EffectiveDates,
};
pub use error::{DateRule, ScheduleError, ScheduleWarning};
pub use reconcile::{
    recalculate_dates, recalculate_dates_in_context, reconcile_fields, DateChanges, DateMode,
    Reconciliation,
};
pub use suggest::{
    suggest_schedule_changes, BottleneckSummary, Impact, ScheduleSuggestions, SchedulingPolicy,
    Suggestion, SuggestionKind,
};
pub use validate::{validate_dependencies, ValidationReport};
