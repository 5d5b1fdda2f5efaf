//! JSONL storage for tasks
//!
//! Tasks are stored one JSON object per line. Line order is the snapshot
//! order handed to the scheduling engine, so it is preserved on rewrite.
//! Uses file locking for concurrent access safety.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;

use crate::domain::{Task, TaskId};

/// Store for task data in JSONL format
pub struct TaskStore {
    path: PathBuf,
}

impl TaskStore {
    /// Creates a new task store at the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path to the store file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads all tasks in file order
    ///
    /// A task appearing on several lines keeps its first position and its
    /// last content (later lines are newer appends).
    pub fn read_all(&self) -> Result<Vec<Task>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open task store: {}", self.path.display()))?;

        // Acquire shared lock for reading
        file.lock_shared()
            .context("Failed to acquire read lock on task store")?;

        let reader = BufReader::new(&file);
        let mut tasks: Vec<Task> = Vec::new();
        let mut positions: HashMap<TaskId, usize> = HashMap::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("Failed to read line {}", line_num + 1))?;

            if line.trim().is_empty() {
                continue;
            }

            let task: Task = serde_json::from_str(&line)
                .with_context(|| format!("Failed to parse task at line {}", line_num + 1))?;

            match positions.get(&task.id) {
                Some(&pos) => tasks[pos] = task,
                None => {
                    positions.insert(task.id.clone(), tasks.len());
                    tasks.push(task);
                }
            }
        }

        // Lock is released when file is dropped
        Ok(tasks)
    }

    /// Writes all tasks to the store (full rewrite, order kept)
    pub fn write_all(&self, tasks: &[Task]) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        // Write to temp file first
        let temp_path = self.path.with_extension("jsonl.tmp");

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

            // Acquire exclusive lock
            file.lock_exclusive()
                .context("Failed to acquire write lock on task store")?;

            let mut writer = BufWriter::new(&file);

            for task in tasks {
                let line = serde_json::to_string(task).context("Failed to serialize task")?;
                writeln!(writer, "{}", line).context("Failed to write task")?;
            }

            writer.flush().context("Failed to flush task store")?;
        }

        // Atomic rename
        fs::rename(&temp_path, &self.path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                self.path.display()
            )
        })?;

        Ok(())
    }

    /// Replaces a task in place (or appends it when new) and rewrites the file
    pub fn update(&self, task: &Task) -> Result<()> {
        let mut tasks = self.read_all()?;
        match tasks.iter_mut().find(|t| t.id == task.id) {
            Some(existing) => *existing = task.clone(),
            None => tasks.push(task.clone()),
        }
        self.write_all(&tasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_task(id: &str) -> Task {
        Task::new(id.parse().unwrap(), format!("Task {}", id))
    }

    fn ids(tasks: &[Task]) -> Vec<String> {
        tasks.iter().map(|t| t.id.to_string()).collect()
    }

    #[test]
    fn read_empty_store() {
        let dir = TempDir::new().unwrap();
        let store = TaskStore::new(dir.path().join("tasks.jsonl"));

        let tasks = store.read_all().unwrap();
        assert!(tasks.is_empty());
    }

    #[test]
    fn write_and_read_keeps_order() {
        let dir = TempDir::new().unwrap();
        let store = TaskStore::new(dir.path().join("tasks.jsonl"));

        let tasks = vec![make_task("z"), make_task("a"), make_task("m")];
        store.write_all(&tasks).unwrap();

        let loaded = store.read_all().unwrap();
        assert_eq!(ids(&loaded), vec!["z", "a", "m"]);
    }

    #[test]
    fn later_lines_replace_earlier_in_place() {
        let dir = TempDir::new().unwrap();
        let store = TaskStore::new(dir.path().join("tasks.jsonl"));

        fs::write(
            store.path(),
            "{\"id\":\"a\",\"title\":\"First\"}\n{\"id\":\"b\"}\n{\"id\":\"a\",\"title\":\"Renamed\"}\n",
        )
        .unwrap();

        let loaded = store.read_all().unwrap();
        assert_eq!(ids(&loaded), vec!["a", "b"]);
        assert_eq!(loaded[0].title, "Renamed");
    }

    #[test]
    fn update_task() {
        let dir = TempDir::new().unwrap();
        let store = TaskStore::new(dir.path().join("tasks.jsonl"));

        store.write_all(&[make_task("a"), make_task("b")]).unwrap();

        let mut task = make_task("a");
        task.add_dependency("b".parse().unwrap());
        store.update(&task).unwrap();

        let loaded = store.read_all().unwrap();
        assert_eq!(ids(&loaded), vec!["a", "b"]);
        assert_eq!(loaded[0].depends_on.len(), 1);
    }

    #[test]
    fn parse_error_names_line() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tasks.jsonl");
        fs::write(&path, "{\"id\":\"a\"}\n\nnot json\n").unwrap();

        let err = TaskStore::new(&path).read_all().unwrap_err();
        assert!(format!("{:#}", err).contains("line 3"));
    }

    #[test]
    fn creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let store = TaskStore::new(dir.path().join("nested").join("dir").join("tasks.jsonl"));

        store.write_all(&[make_task("a")]).unwrap();

        assert!(store.path().exists());
    }

    #[test]
    fn atomic_write() {
        let dir = TempDir::new().unwrap();
        let store = TaskStore::new(dir.path().join("tasks.jsonl"));

        store.write_all(&[make_task("a")]).unwrap();

        // Temp file should not exist after write
        let temp_path = store.path().with_extension("jsonl.tmp");
        assert!(!temp_path.exists());
    }
}
