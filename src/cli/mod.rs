//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Command Groups
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Core | Project setup | `init` |
//! | Query | Read-only analysis | `dates`, `blocked`, `critical-path`, `bottlenecks`, `delay`, `suggest` |
//! | Task | Validated edits | `validate`, `dep`, `undep`, `done`, `reconcile` |
//!
//! ## Task File
//!
//! Commands operate on the project's `.taskchain/tasks.jsonl`, or on any
//! JSONL file given with `--tasks` (also `TASKCHAIN_TASKS`).
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug output:
//! ```bash
//! taskchain --verbose critical-path
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod board;
mod output;
mod query;
mod task;

pub use app::{run, Cli, Commands};
pub use output::{Output, OutputFormat};
