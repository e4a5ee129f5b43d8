//! Task model and the task store.
//!
//! The store owns the authoritative collection in insertion order. Every
//! mutation that changes the collection is written through the persistence
//! adapter before the call returns. Unknown ids are silent no-ops; the
//! boolean returns let callers report them.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::persistence::TaskPersistence;
use crate::storage::BlobStore;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    /// Numeric weight used when sorting: high=3, medium=2, low=1
    pub fn rank(self) -> u8 {
        match self {
            Priority::Low => 1,
            Priority::Medium => 2,
            Priority::High => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(Error::InvalidArgument(format!(
                "unknown priority '{other}' (expected low|medium|high)"
            ))),
        }
    }
}

/// Which side of the completed flag a task is on
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Active,
    Completed,
}

impl TaskStatus {
    pub fn matches(self, task: &Task) -> bool {
        match self {
            TaskStatus::Active => !task.completed,
            TaskStatus::Completed => task.completed,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Active => "active",
            TaskStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(TaskStatus::Active),
            "completed" => Ok(TaskStatus::Completed),
            other => Err(Error::InvalidArgument(format!(
                "unknown status '{other}' (expected active|completed)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub priority: Priority,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn status(&self) -> TaskStatus {
        if self.completed {
            TaskStatus::Completed
        } else {
            TaskStatus::Active
        }
    }
}

/// Input for creating a task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub priority: Priority,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>, priority: Priority) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            priority,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Source of task identifiers, called once per created task
pub trait IdSource {
    fn next_id(&mut self) -> String;
}

/// Source of creation timestamps, called once per created task
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Random v4 UUIDs
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIds;

impl IdSource for UuidIds {
    fn next_id(&mut self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

pub struct TaskStore<B: BlobStore, I: IdSource = UuidIds, C: Clock = SystemClock> {
    tasks: Vec<Task>,
    persistence: TaskPersistence<B>,
    ids: I,
    clock: C,
}

impl<B: BlobStore> TaskStore<B> {
    /// Open with the production id source and clock
    pub fn open_default(persistence: TaskPersistence<B>) -> Result<Self> {
        Self::open(persistence, UuidIds, SystemClock)
    }
}

impl<B: BlobStore, I: IdSource, C: Clock> TaskStore<B, I, C> {
    /// Rehydrate the collection once from persistence.
    pub fn open(persistence: TaskPersistence<B>, ids: I, clock: C) -> Result<Self> {
        let tasks = persistence.load()?;
        tracing::debug!(count = tasks.len(), "opened task store");
        Ok(Self {
            tasks,
            persistence,
            ids,
            clock,
        })
    }

    /// All tasks in insertion order
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// Resolve a full id or a unique, case-insensitive id prefix.
    ///
    /// Returns `Ok(None)` when nothing matches.
    pub fn resolve_id(&self, input: &str) -> Result<Option<String>> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidArgument("task id cannot be empty".to_string()));
        }

        if let Some(task) = self.get(trimmed) {
            return Ok(Some(task.id.clone()));
        }

        let needle = trimmed.to_ascii_lowercase();
        let mut matches: Vec<String> = self
            .tasks
            .iter()
            .filter(|task| task.id.to_ascii_lowercase().starts_with(&needle))
            .map(|task| task.id.clone())
            .collect();

        match matches.len() {
            0 => Ok(None),
            1 => Ok(matches.pop()),
            _ => {
                matches.sort();
                Err(Error::AmbiguousId {
                    prefix: trimmed.to_string(),
                    matches,
                })
            }
        }
    }

    /// Append a new task built from `draft`.
    ///
    /// The draft is taken as-is; rejecting blank titles is the caller's job.
    pub fn add(&mut self, draft: TaskDraft) -> Result<&Task> {
        let task = Task {
            id: self.ids.next_id(),
            title: draft.title,
            description: draft.description,
            priority: draft.priority,
            completed: false,
            created_at: self.clock.now(),
        };
        tracing::info!(id = %task.id, priority = %task.priority, "task added");
        self.tasks.push(task);
        self.persist()?;
        let index = self.tasks.len() - 1;
        Ok(&self.tasks[index])
    }

    /// Replace title, description and priority of the task with `task.id`.
    ///
    /// `completed` and `created_at` are kept from the stored task.
    pub fn update(&mut self, task: Task) -> Result<bool> {
        let Some(existing) = self.tasks.iter_mut().find(|t| t.id == task.id) else {
            tracing::warn!(id = %task.id, "update ignored: no such task");
            return Ok(false);
        };
        existing.title = task.title;
        existing.description = task.description;
        existing.priority = task.priority;
        tracing::info!(id = %existing.id, "task updated");
        self.persist()?;
        Ok(true)
    }

    /// Flip the completed flag of the task with `id`.
    pub fn toggle_completed(&mut self, id: &str) -> Result<bool> {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            tracing::warn!(id, "toggle ignored: no such task");
            return Ok(false);
        };
        task.completed = !task.completed;
        tracing::info!(id, completed = task.completed, "task toggled");
        self.persist()?;
        Ok(true)
    }

    /// Remove the task with `id`.
    pub fn delete(&mut self, id: &str) -> Result<bool> {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != id);
        if self.tasks.len() == before {
            tracing::warn!(id, "delete ignored: no such task");
            return Ok(false);
        }
        tracing::info!(id, "task deleted");
        self.persist()?;
        Ok(true)
    }

    /// Remove every task with the given status in one step.
    ///
    /// Returns how many tasks were removed.
    pub fn delete_where(&mut self, status: TaskStatus) -> Result<usize> {
        let before = self.tasks.len();
        self.tasks.retain(|task| !status.matches(task));
        let removed = before - self.tasks.len();
        if removed == 0 {
            return Ok(0);
        }
        tracing::info!(%status, removed, "tasks bulk-deleted");
        self.persist()?;
        Ok(removed)
    }

    fn persist(&self) -> Result<()> {
        self.persistence.save(&self.tasks)
    }
}
