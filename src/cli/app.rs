//! Main CLI application structure

use std::path::PathBuf;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};

use super::board::Board;
use super::output::{Output, OutputFormat};
use super::task::Clearable;
use super::{query, task};
use crate::domain::TaskId;
use crate::storage::{Config, Project};

#[derive(Parser)]
#[command(name = "taskchain")]
#[command(author, version, about = "Dependency-aware scheduling for task boards")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the global config, then text)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Task file to use instead of the project's
    #[arg(long, global = true, env = "TASKCHAIN_TASKS", value_name = "PATH")]
    pub tasks: Option<PathBuf>,

    /// Date to treat as today (YYYY-MM-DD)
    #[arg(long, global = true, value_name = "DATE")]
    pub today: Option<NaiveDate>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new taskchain project
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Show effective dates for a task
    Dates {
        /// Task ID
        id: TaskId,
    },

    /// Show blocked tasks
    Blocked,

    /// Check dependencies for a task without saving them
    Validate {
        /// Task that would be blocked
        id: TaskId,

        /// Tasks it would depend on
        #[arg(required = true)]
        depends_on: Vec<TaskId>,
    },

    /// Add dependencies to a task
    Dep {
        /// Task that will be blocked
        id: TaskId,

        /// Tasks that must be completed first
        #[arg(required = true)]
        depends_on: Vec<TaskId>,
    },

    /// Remove dependencies from a task
    Undep {
        /// Task to unblock
        id: TaskId,

        /// Dependencies to remove
        #[arg(required = true)]
        depends_on: Vec<TaskId>,
    },

    /// Mark a task as done
    Done {
        /// Task ID
        id: TaskId,
    },

    /// Edit start, due date or duration and reconcile the rest
    Reconcile {
        /// Task ID
        id: TaskId,

        /// New start date (YYYY-MM-DD, or "none")
        #[arg(long, value_name = "DATE")]
        start: Option<Clearable<NaiveDate>>,

        /// New due date (YYYY-MM-DD, or "none")
        #[arg(long, value_name = "DATE")]
        due: Option<Clearable<NaiveDate>>,

        /// New duration in days (or "none")
        #[arg(long, value_name = "DAYS")]
        duration: Option<Clearable<u32>>,

        /// Whether the due date is fixed
        #[arg(long, value_name = "BOOL")]
        fixed: Option<bool>,

        /// Save the reconciled dates
        #[arg(long)]
        write: bool,
    },

    /// Show the critical path
    CriticalPath,

    /// Show tasks holding up blocked work
    Bottlenecks,

    /// Show downstream impact of a task ending on a new date
    Delay {
        /// Task ID
        id: TaskId,

        /// New end date (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        new_end: Option<NaiveDate>,
    },

    /// Suggest schedule changes
    Suggest {
        /// Only consider the chain ending at this task
        #[arg(long, value_name = "ID")]
        target: Option<TaskId>,

        /// Deadline the critical path should meet (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        deadline: Option<NaiveDate>,
    },
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;
    let format = cli
        .format
        .unwrap_or_else(|| config.global.default_format.into());
    let output = Output::new(format, cli.verbose);

    output.verbose("taskchain starting");
    if let Some(root) = &config.project_root {
        output.verbose_ctx("config", &format!("Project root: {}", root.display()));
    }

    if let Commands::Init { path } = &cli.command {
        output.verbose_ctx("init", &format!("Initializing project at: {}", path.display()));
        let project = Project::init(path)?;
        output.verbose_ctx(
            "init",
            &format!("Created {}", project.project_dir().display()),
        );
        output.success(&format!(
            "Initialized taskchain project at {}",
            project.root().display()
        ));
        return Ok(());
    }

    let today = cli.today.unwrap_or_else(|| Local::now().date_naive());
    let board = Board::open(&config, cli.tasks.as_deref(), today, &output)?;

    match cli.command {
        Commands::Init { .. } => {}

        Commands::Dates { id } => query::dates(&board, &output, &id)?,
        Commands::Blocked => query::blocked(&board, &output)?,
        Commands::CriticalPath => query::critical(&board, &output)?,
        Commands::Bottlenecks => query::bottlenecks(&board, &output)?,
        Commands::Delay { id, new_end } => query::delay(&board, &output, &id, new_end)?,
        Commands::Suggest { target, deadline } => {
            query::suggest(&board, &output, target.as_ref(), deadline)?
        }

        Commands::Validate { id, depends_on } => task::validate(&board, &output, &id, &depends_on)?,
        Commands::Dep { id, depends_on } => {
            task::add_dependencies(&board, &output, &id, &depends_on)?
        }
        Commands::Undep { id, depends_on } => {
            task::remove_dependencies(&board, &output, &id, &depends_on)?
        }
        Commands::Done { id } => task::complete(&board, &output, &id)?,
        Commands::Reconcile {
            id,
            start,
            due,
            duration,
            fixed,
            write,
        } => {
            let changes = task::date_changes(start, due, duration, fixed);
            task::reconcile(&board, &output, &id, changes, write)?
        }
    }

    output.verbose("Command completed successfully");
    Ok(())
}
