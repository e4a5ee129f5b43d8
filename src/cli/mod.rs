//! Command-line interface for tasklist
//!
//! This module defines the CLI structure using clap derive macros.
//! Each command group is implemented in its own submodule.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::OutputOptions;
use crate::persistence::TaskPersistence;
use crate::prefs::{Preferences, PrefsStore, Theme};
use crate::storage::FileBlobStore;
use crate::task::{TaskStatus, TaskStore};

mod task;
mod theme;
mod view;

/// tasklist - local todo lists
///
/// Create, edit, complete and sort tasks. Active and completed tasks are
/// shown as two independently sorted views.
#[derive(Parser, Debug)]
#[command(name = "tasklist")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding task data (defaults to the platform data dir)
    #[arg(long, global = true, env = "TASKLIST_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Path to the configuration file
    #[arg(long, global = true, env = "TASKLIST_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Which view a command targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ViewArg {
    Active,
    Completed,
}

impl From<ViewArg> for TaskStatus {
    fn from(value: ViewArg) -> Self {
        match value {
            ViewArg::Active => TaskStatus::Active,
            ViewArg::Completed => TaskStatus::Completed,
        }
    }
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new task
    Add {
        /// Task title
        title: String,

        /// Longer description
        #[arg(short, long, default_value = "")]
        description: String,

        /// Priority: low, medium, high
        #[arg(short, long)]
        priority: Option<String>,
    },

    /// Edit title, description or priority of a task
    Edit {
        /// Task id or unique id prefix
        id: String,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// New description
        #[arg(short, long)]
        description: Option<String>,

        /// New priority: low, medium, high
        #[arg(short, long)]
        priority: Option<String>,
    },

    /// Mark a task completed, or active again
    Toggle {
        /// Task id or unique id prefix
        id: String,
    },

    /// Delete a task
    Rm {
        /// Task id or unique id prefix
        id: String,
    },

    /// Delete every task in a view
    Clear {
        /// View to empty
        #[arg(value_enum)]
        view: ViewArg,
    },

    /// Show the active and completed views
    List {
        /// Only show one view
        #[arg(long, value_enum)]
        view: Option<ViewArg>,
    },

    /// Show a single task
    Show {
        /// Task id or unique id prefix
        id: String,
    },

    /// View sort configuration
    #[command(subcommand)]
    View(ViewCommands),

    /// Light/dark theme preference
    #[command(subcommand)]
    Theme(ThemeCommands),
}

/// View subcommands
#[derive(Subcommand, Debug)]
pub enum ViewCommands {
    /// Show the sort configuration of both views
    Show,

    /// Switch a view between priority and date sorting
    SortType {
        #[arg(value_enum)]
        view: ViewArg,
    },

    /// Switch a view between ascending and descending order
    Direction {
        #[arg(value_enum)]
        view: ViewArg,
    },
}

/// Theme subcommands
#[derive(Subcommand, Debug)]
pub enum ThemeCommands {
    /// Show the current theme
    Show,

    /// Switch between light and dark
    Toggle,

    /// Set the theme explicitly
    Set {
        /// light or dark
        theme: String,
    },
}

/// Resolved configuration and storage shared by every command
pub(crate) struct Context {
    config: Config,
    blobs: FileBlobStore,
    output: OutputOptions,
}

impl Context {
    fn load(data_dir: Option<PathBuf>, config_path: Option<PathBuf>, output: OutputOptions) -> Result<Self> {
        let config = match config_path {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::InvalidConfig(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
                Config::load(&path)?
            }
            None => match Config::default_path() {
                Some(path) => Config::load_or_default(&path)?,
                None => Config::default(),
            },
        };

        let root = config.resolve_data_dir(data_dir.as_deref())?;
        tracing::debug!(data_dir = %root.display(), "resolved data directory");
        let blobs = FileBlobStore::new(root).with_lock_timeout(config.storage.lock_timeout_ms);

        Ok(Self {
            config,
            blobs,
            output,
        })
    }

    pub(crate) fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn output(&self) -> OutputOptions {
        self.output
    }

    pub(crate) fn open_tasks(&self) -> Result<TaskStore<&FileBlobStore>> {
        let persistence = TaskPersistence::new(
            &self.blobs,
            self.config.storage.tasks_key.clone(),
            self.config.storage.on_corrupt,
        );
        TaskStore::open_default(persistence)
    }

    pub(crate) fn prefs(&self) -> PrefsStore<&FileBlobStore> {
        let initial = Preferences {
            theme: Theme::default(),
            views: self.config.view.initial_state(),
        };
        PrefsStore::new(
            &self.blobs,
            self.config.storage.prefs_key.clone(),
            self.config.storage.on_corrupt,
            initial,
        )
    }
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let output = OutputOptions {
            json: self.json,
            quiet: self.quiet,
        };
        let ctx = Context::load(self.data_dir, self.config, output)?;

        match self.command {
            Commands::Add {
                title,
                description,
                priority,
            } => task::run_add(
                &ctx,
                task::AddOptions {
                    title,
                    description,
                    priority,
                },
            ),
            Commands::Edit {
                id,
                title,
                description,
                priority,
            } => task::run_edit(
                &ctx,
                task::EditOptions {
                    id,
                    title,
                    description,
                    priority,
                },
            ),
            Commands::Toggle { id } => task::run_toggle(&ctx, &id),
            Commands::Rm { id } => task::run_rm(&ctx, &id),
            Commands::Clear { view } => task::run_clear(&ctx, view.into()),
            Commands::List { view } => task::run_list(&ctx, view.map(TaskStatus::from)),
            Commands::Show { id } => task::run_show(&ctx, &id),
            Commands::View(cmd) => match cmd {
                ViewCommands::Show => view::run_show(&ctx),
                ViewCommands::SortType { view } => view::run_toggle_sort_type(&ctx, view.into()),
                ViewCommands::Direction { view } => view::run_toggle_direction(&ctx, view.into()),
            },
            Commands::Theme(cmd) => match cmd {
                ThemeCommands::Show => theme::run_show(&ctx),
                ThemeCommands::Toggle => theme::run_toggle(&ctx),
                ThemeCommands::Set { theme } => theme::run_set(&ctx, &theme),
            },
        }
    }
}
