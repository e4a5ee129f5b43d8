//! Task command implementations.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput};
use crate::storage::BlobStore;
use crate::task::{Clock, IdSource, Priority, Task, TaskDraft, TaskStatus, TaskStore};
use crate::view::{ViewConfig, Views};

use super::Context;

pub struct AddOptions {
    pub title: String,
    pub description: String,
    pub priority: Option<String>,
}

pub struct EditOptions {
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
}

#[derive(Serialize)]
struct TaskOutput<'a> {
    task: &'a Task,
}

#[derive(Serialize)]
struct MutationOutput {
    id: String,
    matched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    completed: Option<bool>,
}

#[derive(Serialize)]
struct ClearOutput {
    view: TaskStatus,
    removed: usize,
}

#[derive(Serialize)]
struct ViewOutput<'a> {
    view: TaskStatus,
    config: ViewConfig,
    total: usize,
    tasks: &'a [&'a Task],
}

#[derive(Serialize)]
struct ListOutput<'a> {
    views: Vec<ViewOutput<'a>>,
}

pub fn run_add(ctx: &Context, options: AddOptions) -> Result<()> {
    let title = require_title(&options.title)?;
    let priority = match options.priority.as_deref() {
        Some(value) => value.parse::<Priority>()?,
        None => ctx.config().tasks.default_priority,
    };

    let mut store = ctx.open_tasks()?;
    let draft = TaskDraft::new(title, priority).with_description(options.description);
    let task = store.add(draft)?;

    let mut human = HumanOutput::new("Task created");
    human.push_field("ID", task.id.clone());
    human.push_field("Title", task.title.clone());
    human.push_field("Priority", task.priority.to_string());

    emit_success(ctx.output(), "add", &TaskOutput { task }, Some(&human))
}

pub fn run_edit(ctx: &Context, options: EditOptions) -> Result<()> {
    if options.title.is_none() && options.description.is_none() && options.priority.is_none() {
        return Err(Error::InvalidArgument(
            "nothing to change (pass --title, --description or --priority)".to_string(),
        ));
    }
    let title = options.title.as_deref().map(require_title).transpose()?;
    let priority = options
        .priority
        .as_deref()
        .map(str::parse::<Priority>)
        .transpose()?;

    let mut store = ctx.open_tasks()?;
    let id = resolve_or_raw(&store, &options.id)?;

    let matched = match store.get(&id).cloned() {
        Some(mut task) => {
            if let Some(title) = title {
                task.title = title.to_string();
            }
            if let Some(description) = options.description {
                task.description = description;
            }
            if let Some(priority) = priority {
                task.priority = priority;
            }
            store.update(task)?
        }
        None => false,
    };

    let mut human = HumanOutput::new(if matched { "Task updated" } else { "No change" });
    human.push_field("ID", id.clone());
    if !matched {
        push_no_match(&mut human, &options.id);
    }

    emit_success(
        ctx.output(),
        "edit",
        &MutationOutput {
            id,
            matched,
            completed: None,
        },
        Some(&human),
    )
}

pub fn run_toggle(ctx: &Context, input: &str) -> Result<()> {
    let mut store = ctx.open_tasks()?;
    let id = resolve_or_raw(&store, input)?;
    let matched = store.toggle_completed(&id)?;
    let completed = store.get(&id).map(|task| task.completed);

    let header = match completed {
        Some(true) => "Task completed",
        Some(false) => "Task reopened",
        None => "No change",
    };
    let mut human = HumanOutput::new(header);
    human.push_field("ID", id.clone());
    if !matched {
        push_no_match(&mut human, input);
    }

    emit_success(
        ctx.output(),
        "toggle",
        &MutationOutput {
            id,
            matched,
            completed,
        },
        Some(&human),
    )
}

pub fn run_rm(ctx: &Context, input: &str) -> Result<()> {
    let mut store = ctx.open_tasks()?;
    let id = resolve_or_raw(&store, input)?;
    let matched = store.delete(&id)?;

    let mut human = HumanOutput::new(if matched { "Task deleted" } else { "No change" });
    human.push_field("ID", id.clone());
    if !matched {
        push_no_match(&mut human, input);
    }

    emit_success(
        ctx.output(),
        "rm",
        &MutationOutput {
            id,
            matched,
            completed: None,
        },
        Some(&human),
    )
}

pub fn run_clear(ctx: &Context, view: TaskStatus) -> Result<()> {
    let mut store = ctx.open_tasks()?;
    let removed = store.delete_where(view)?;

    let mut human = HumanOutput::new(format!("Cleared {view} tasks"));
    human.push_field("Removed", removed.to_string());

    emit_success(ctx.output(), "clear", &ClearOutput { view, removed }, Some(&human))
}

pub fn run_list(ctx: &Context, only: Option<TaskStatus>) -> Result<()> {
    let store = ctx.open_tasks()?;
    let prefs = ctx.prefs().load()?;
    let views = Views::derive(store.tasks(), &prefs.views);

    let selected: Vec<TaskStatus> = match only {
        Some(view) => vec![view],
        None => vec![TaskStatus::Active, TaskStatus::Completed],
    };

    let outputs: Vec<ViewOutput<'_>> = selected
        .iter()
        .map(|&view| {
            let tasks = views.get(view);
            ViewOutput {
                view,
                config: *prefs.views.config(view),
                total: tasks.len(),
                tasks,
            }
        })
        .collect();

    let mut human = HumanOutput::listing();
    for output in &outputs {
        human.push_view(output.view, output.config, output.tasks);
    }

    emit_success(ctx.output(), "list", &ListOutput { views: outputs }, Some(&human))
}

pub fn run_show(ctx: &Context, input: &str) -> Result<()> {
    let store = ctx.open_tasks()?;
    let id = store
        .resolve_id(input)?
        .ok_or_else(|| Error::TaskNotFound(input.trim().to_string()))?;
    let task = store
        .get(&id)
        .ok_or_else(|| Error::TaskNotFound(id.clone()))?;

    let mut human = HumanOutput::new(task.title.clone());
    human.push_field("ID", task.id.clone());
    human.push_field("Status", task.status().to_string());
    human.push_field("Priority", task.priority.to_string());
    human.push_field("Created", task.created_at.to_rfc3339());
    if !task.description.is_empty() {
        human.push_note(task.description.clone());
    }

    emit_success(ctx.output(), "show", &TaskOutput { task }, Some(&human))
}

/// Titles must contain something other than whitespace; stored untrimmed.
fn require_title(title: &str) -> Result<&str> {
    if title.trim().is_empty() {
        return Err(Error::InvalidArgument("title cannot be empty".to_string()));
    }
    Ok(title)
}

/// Resolve a prefix to a full id, passing unmatched input through so the
/// store can treat it as a no-op.
fn resolve_or_raw<B: BlobStore, I: IdSource, C: Clock>(
    store: &TaskStore<B, I, C>,
    input: &str,
) -> Result<String> {
    Ok(store
        .resolve_id(input)?
        .unwrap_or_else(|| input.trim().to_string()))
}

fn push_no_match(human: &mut HumanOutput, input: &str) {
    human.push_warning(format!("no task matches '{}'", input.trim()));
    human.push_next_step("tasklist list");
}
