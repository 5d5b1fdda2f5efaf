//! Domain models for taskchain
//!
//! Contains the task model and the graph view without any I/O concerns.

pub mod dates;
mod graph;
mod id;
mod task;

pub use graph::TaskGraph;
pub use id::{IdError, TaskId};
pub use task::{DateFields, Priority, Task, TaskStatus};
