//! Shared output formatting for tasklist commands.
//!
//! Every command builds one `HumanOutput` for the terminal and hands its
//! serializable result to `emit_success`, which picks text or a JSON
//! envelope (`schema_version`, `command`, `status`, then `data` or `error`).

use serde::Serialize;

use crate::error::{Error, Result};
use crate::task::{Task, TaskStatus};
use crate::view::ViewConfig;

pub const SCHEMA_VERSION: &str = "tasklist.v1";

#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub json: bool,
    pub quiet: bool,
}

/// Terminal rendering of one command result
#[derive(Debug, Clone, Default)]
pub struct HumanOutput {
    header: Option<String>,
    fields: Vec<(String, String)>,
    notes: Vec<String>,
    views: Vec<ViewListing>,
    warnings: Vec<String>,
    next_steps: Vec<String>,
}

#[derive(Debug, Clone)]
struct ViewListing {
    view: TaskStatus,
    config: ViewConfig,
    lines: Vec<String>,
}

impl HumanOutput {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: Some(header.into()),
            ..Self::default()
        }
    }

    /// Output made only of task listings
    pub fn listing() -> Self {
        Self::default()
    }

    /// Labelled value, aligned with the other fields
    pub fn push_field(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.push((key.into(), value.into()));
    }

    /// Free text shown under the fields, such as a task description
    pub fn push_note(&mut self, value: impl Into<String>) {
        self.notes.push(value.into());
    }

    /// One sorted view, already projected in display order
    pub fn push_view(&mut self, view: TaskStatus, config: ViewConfig, tasks: &[&Task]) {
        self.views.push(ViewListing {
            view,
            config,
            lines: tasks.iter().map(|task| format_task_line(task)).collect(),
        });
    }

    pub fn push_warning(&mut self, value: impl Into<String>) {
        self.warnings.push(value.into());
    }

    pub fn push_next_step(&mut self, value: impl Into<String>) {
        self.next_steps.push(value.into());
    }
}

#[derive(Serialize)]
struct Envelope<'a, P: Serialize> {
    schema_version: &'static str,
    command: &'a str,
    status: &'static str,
    #[serde(flatten)]
    payload: P,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    next_steps: Vec<String>,
}

#[derive(Serialize)]
struct Data<'a, T: Serialize> {
    data: &'a T,
}

#[derive(Serialize)]
struct Failure {
    error: ErrorBody,
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
    code: i32,
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

pub fn emit_success<T: Serialize>(
    options: OutputOptions,
    command: &str,
    data: &T,
    human: Option<&HumanOutput>,
) -> Result<()> {
    if options.json {
        let envelope = Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "success",
            payload: Data { data },
            warnings: human.map(|h| h.warnings.clone()).unwrap_or_default(),
            next_steps: human.map(|h| h.next_steps.clone()).unwrap_or_default(),
        };
        println!("{}", serde_json::to_string_pretty(&envelope)?);
        return Ok(());
    }

    if let (false, Some(human)) = (options.quiet, human) {
        println!("{}", format_human(human));
    }
    Ok(())
}

pub fn emit_error(command: &str, err: &Error, json: bool) -> Result<()> {
    let next_steps = error_next_steps(err);

    if json {
        let envelope = Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "error",
            payload: Failure {
                error: ErrorBody {
                    message: err.to_string(),
                    code: err.exit_code(),
                    kind: error_kind(err),
                    details: err.details(),
                },
            },
            warnings: Vec::new(),
            next_steps,
        };
        println!("{}", serde_json::to_string_pretty(&envelope)?);
        return Ok(());
    }

    eprintln!("error: {err}");
    if let Some(hint) = next_steps.first() {
        eprintln!("hint: {hint}");
    }
    Ok(())
}

/// Plain-text layout: header, aligned fields, notes, view listings, then
/// warnings and next steps. Blocks are separated by a blank line.
pub fn format_human(output: &HumanOutput) -> String {
    let mut blocks: Vec<Vec<String>> = Vec::new();

    let mut head = Vec::new();
    if let Some(header) = &output.header {
        head.push(header.clone());
    }
    let width = output.fields.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    for (key, value) in &output.fields {
        head.push(format!("  {key:<width$}  {value}"));
    }
    blocks.push(head);

    blocks.push(
        output
            .notes
            .iter()
            .flat_map(|note| note.lines())
            .map(|line| format!("  {line}"))
            .collect(),
    );

    for listing in &output.views {
        blocks.push(render_listing(listing));
    }

    let mut tail: Vec<String> = output
        .warnings
        .iter()
        .map(|warning| format!("warning: {warning}"))
        .collect();
    tail.extend(output.next_steps.iter().map(|step| format!("next: {step}")));
    blocks.push(tail);

    blocks
        .into_iter()
        .filter(|block| !block.is_empty())
        .map(|block| block.join("\n"))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn render_listing(listing: &ViewListing) -> Vec<String> {
    let title = match listing.view {
        TaskStatus::Active => "Active Tasks",
        TaskStatus::Completed => "Completed Tasks",
    };
    let mut lines = vec![format!(
        "{title} ({}) [sort: {} {}]",
        listing.lines.len(),
        listing.config.sort_type,
        listing.config.sort_direction
    )];
    if listing.lines.is_empty() {
        lines.push(format!("  No {} tasks", listing.view));
    }
    lines.extend(listing.lines.iter().map(|line| format!("  {line}")));
    lines
}

/// One-line rendering of a task for lists
pub fn format_task_line(task: &Task) -> String {
    let mark = if task.completed { "x" } else { " " };
    let short_id: String = task.id.chars().take(8).collect();
    format!(
        "[{mark}] {short_id}  {:<6}  {}  {}",
        task.priority,
        task.created_at.format("%Y-%m-%d %H:%M"),
        task.title
    )
}

pub fn infer_command_name_from_args() -> String {
    infer_command_name(std::env::args().skip(1))
}

/// Command label for error envelopes, recovered without clap so it works
/// even when argument parsing fails.
fn infer_command_name(args: impl IntoIterator<Item = String>) -> String {
    let mut words = Vec::new();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        if matches!(arg.as_str(), "--data-dir" | "--config") {
            args.next();
            continue;
        }
        if arg.starts_with('-') {
            continue;
        }
        let nested = matches!(arg.as_str(), "view" | "theme");
        words.push(arg);
        if !nested || words.len() == 2 {
            break;
        }
    }

    if words.is_empty() {
        "tasklist".to_string()
    } else {
        words.join(" ")
    }
}

fn error_kind(err: &Error) -> &'static str {
    match err.exit_code() {
        2 => "user_error",
        _ => "operation_failed",
    }
}

fn error_next_steps(err: &Error) -> Vec<String> {
    match err {
        Error::AmbiguousId { .. } => vec!["pass a longer id prefix (tasklist list)".to_string()],
        Error::TaskNotFound(_) => vec!["tasklist list".to_string()],
        Error::InvalidConfig(_) | Error::TomlParse(_) => {
            vec!["fix tasklist.toml then retry".to_string()]
        }
        Error::CorruptState { .. } => {
            vec!["set storage.on_corrupt = \"reset\" to start over".to_string()]
        }
        Error::LockFailed(_) => vec!["retry once other tasklist processes finish".to_string()],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn infers_command_and_subcommand() {
        assert_eq!(infer_command_name(args(&["add", "Buy milk"])), "add");
        assert_eq!(
            infer_command_name(args(&["--json", "view", "direction", "active"])),
            "view direction"
        );
        assert_eq!(
            infer_command_name(args(&["--data-dir", "/tmp/x", "theme", "toggle"])),
            "theme toggle"
        );
        assert_eq!(infer_command_name(args(&["view"])), "view");
        assert_eq!(infer_command_name(args(&["--json"])), "tasklist");
    }

    #[test]
    fn error_envelope_carries_kind_and_details() {
        let err = Error::TaskNotFound("ab".to_string());
        let envelope = Envelope {
            schema_version: SCHEMA_VERSION,
            command: "show",
            status: "error",
            payload: Failure {
                error: ErrorBody {
                    message: err.to_string(),
                    code: err.exit_code(),
                    kind: error_kind(&err),
                    details: err.details(),
                },
            },
            warnings: Vec::new(),
            next_steps: error_next_steps(&err),
        };

        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["status"], "error");
        assert_eq!(value["error"]["kind"], "user_error");
        assert_eq!(value["error"]["details"]["id"], "ab");
        assert_eq!(value["next_steps"][0], "tasklist list");
        assert!(value.get("warnings").is_none());
    }
}
