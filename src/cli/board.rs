//! The task file a command operates on
//!
//! Resolves `--tasks` against the project configuration and hands out
//! fresh snapshots; every command reads the file once and works on that.

use std::path::Path;

use anyhow::Result;
use chrono::NaiveDate;

use super::output::Output;
use crate::domain::{Task, TaskGraph, TaskId};
use crate::schedule::{ScheduleError, SchedulingPolicy};
use crate::storage::{Config, TaskStore};

pub struct Board {
    store: TaskStore,
    policy: SchedulingPolicy,
    today: NaiveDate,
}

impl Board {
    /// Uses `tasks_override` when given, else the project's task file
    pub fn open(
        config: &Config,
        tasks_override: Option<&Path>,
        today: NaiveDate,
        output: &Output,
    ) -> Result<Self> {
        let path = match tasks_override {
            Some(path) => {
                if !path.is_file() {
                    anyhow::bail!("Task file not found: {}", path.display());
                }
                path.to_path_buf()
            }
            None => config.tasks_path()?,
        };

        output.verbose_ctx("board", &format!("Using task file: {}", path.display()));
        output.verbose_ctx("board", &format!("Today is {}", today));

        Ok(Self {
            store: TaskStore::new(path),
            policy: config.project.scheduling,
            today,
        })
    }

    /// Reads the current snapshot
    pub fn load(&self, output: &Output) -> Result<Vec<Task>> {
        let tasks = self.store.read_all()?;
        output.verbose_ctx("board", &format!("Loaded {} tasks", tasks.len()));
        Ok(tasks)
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn policy(&self) -> &SchedulingPolicy {
        &self.policy
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }
}

/// Looks up a task that must exist in the snapshot
pub fn find<'a>(graph: &TaskGraph<'a>, id: &TaskId) -> Result<&'a Task> {
    graph
        .get(id)
        .ok_or_else(|| anyhow::Error::new(ScheduleError::TaskNotFound(id.clone())))
}
