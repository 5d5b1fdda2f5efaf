//! # Storage Layer
//!
//! Persistence for taskchain projects in git-friendly file formats.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Tasks | JSONL (one JSON per line) | `.taskchain/tasks.jsonl` |
//! | Config | TOML | `.taskchain/config.toml` |
//!
//! ## Concurrency Safety
//!
//! - [`TaskStore`] uses file locking (`fs2`) for concurrent access
//! - Rewrites are atomic (temp file + rename)
//!
//! ## Project Structure
//!
//! ```text
//! .taskchain/
//! ├── tasks.jsonl           # All tasks, in snapshot order
//! ├── config.toml           # Project configuration
//! └── .gitignore
//! ```

mod config;
mod jsonl;
mod project;

pub use config::{Config, ConfigError, GlobalConfig, OutputFormat, ProjectConfig, PROJECT_DIR};
pub use jsonl::TaskStore;
pub use project::{Project, ProjectError};
