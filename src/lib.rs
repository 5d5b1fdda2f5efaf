//! taskchain - dependency-aware scheduling for task boards
//!
//! The [`schedule`] engine computes effective dates along dependency
//! chains, validates new edges, reconciles start/due/duration edits, and
//! derives planning signals (critical path, bottlenecks, delay impact,
//! suggestions). The [`storage`] and [`cli`] layers wrap it in a
//! local-first command-line tool over a JSONL task file.

pub mod domain;
pub mod schedule;
pub mod storage;
pub mod cli;

pub use domain::{Task, TaskGraph, TaskId, TaskStatus};
