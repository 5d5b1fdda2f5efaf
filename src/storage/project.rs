//! Project management
//!
//! Handles project initialization and provides access to the task store.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use super::config::PROJECT_DIR;
use super::{Config, TaskStore};

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Not in a taskchain project. Run 'taskchain init' first.")]
    NotInProject,
}

const DEFAULT_CONFIG: &str = r#"# taskchain configuration

# Task file, relative to this directory
tasks_file = "tasks.jsonl"

[scheduling]
# Maximum bottlenecks reported
bottleneck_limit = 5

# Suggest reducing scope for durations above this many days
reduce_scope_min_days = 3

# Suggest splitting durations above this many days
split_min_days = 5

# Proposed duration after scope reduction, as a percentage
scope_reduction_percent = 70
"#;

/// A taskchain project
pub struct Project {
    root: PathBuf,
    config: Config,
}

impl Project {
    /// Opens an existing project at the given path
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        if !root.join(PROJECT_DIR).is_dir() {
            return Err(ProjectError::NotInProject.into());
        }

        let config = Config::for_project(&root)?;

        Ok(Self { root, config })
    }

    /// Initializes a new project at the given path
    ///
    /// Existing files are left untouched, so running it twice is harmless.
    pub fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let project_dir = root.join(PROJECT_DIR);

        fs::create_dir_all(&project_dir).with_context(|| {
            format!("Failed to create {} directory: {}", PROJECT_DIR, project_dir.display())
        })?;

        let config_path = project_dir.join("config.toml");
        if !config_path.exists() {
            fs::write(&config_path, DEFAULT_CONFIG)
                .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        }

        let gitignore_path = project_dir.join(".gitignore");
        if !gitignore_path.exists() {
            let gitignore = "# Leftovers from interrupted writes\n*.tmp\n";
            fs::write(&gitignore_path, gitignore).with_context(|| {
                format!("Failed to write .gitignore: {}", gitignore_path.display())
            })?;
        }

        let project = Self::open(root)?;

        let store = project.task_store();
        if !store.path().exists() {
            store.write_all(&[])?;
        }

        Ok(project)
    }

    /// Returns the project root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the .taskchain directory path
    pub fn project_dir(&self) -> PathBuf {
        self.root.join(PROJECT_DIR)
    }

    /// Returns the task store
    pub fn task_store(&self) -> TaskStore {
        TaskStore::new(self.project_dir().join(&self.config.project.tasks_file))
    }
}
