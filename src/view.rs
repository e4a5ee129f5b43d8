//! Sorted active/completed projections of the task collection.
//!
//! Views are recomputed from the store on every read and never reorder the
//! stored collection. Sorting is stable, so tasks with equal keys keep their
//! insertion order in both directions.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::task::{Task, TaskStatus};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortType {
    Priority,
    Datetime,
}

impl SortType {
    pub fn toggled(self) -> Self {
        match self {
            SortType::Priority => SortType::Datetime,
            SortType::Datetime => SortType::Priority,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortType::Priority => "priority",
            SortType::Datetime => "datetime",
        }
    }
}

impl fmt::Display for SortType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "priority" => Ok(SortType::Priority),
            "datetime" | "date" => Ok(SortType::Datetime),
            other => Err(Error::InvalidArgument(format!(
                "unknown sort type '{other}' (expected priority|datetime)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SortDirection {
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort configuration of one view
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ViewConfig {
    pub sort_type: SortType,
    pub sort_direction: SortDirection,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            sort_type: SortType::Datetime,
            sort_direction: SortDirection::Descending,
        }
    }
}

impl ViewConfig {
    pub fn toggle_sort_type(&mut self) {
        self.sort_type = self.sort_type.toggled();
    }

    pub fn toggle_direction(&mut self) {
        self.sort_direction = self.sort_direction.toggled();
    }

    /// Compare two tasks under this configuration
    pub fn compare(&self, a: &Task, b: &Task) -> Ordering {
        let ordering = match self.sort_type {
            SortType::Priority => a.priority.rank().cmp(&b.priority.rank()),
            SortType::Datetime => a.created_at.cmp(&b.created_at),
        };
        self.sort_direction.apply(ordering)
    }
}

/// Independent configuration for the active and completed views
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ViewState {
    #[serde(default)]
    pub active: ViewConfig,
    #[serde(default)]
    pub completed: ViewConfig,
}

impl ViewState {
    pub fn config(&self, view: TaskStatus) -> &ViewConfig {
        match view {
            TaskStatus::Active => &self.active,
            TaskStatus::Completed => &self.completed,
        }
    }

    pub fn config_mut(&mut self, view: TaskStatus) -> &mut ViewConfig {
        match view {
            TaskStatus::Active => &mut self.active,
            TaskStatus::Completed => &mut self.completed,
        }
    }

    pub fn toggle_sort_type(&mut self, view: TaskStatus) {
        self.config_mut(view).toggle_sort_type();
    }

    pub fn toggle_direction(&mut self, view: TaskStatus) {
        self.config_mut(view).toggle_direction();
    }
}

/// Filter `tasks` to `view` and sort them per `config`
pub fn project<'a>(tasks: &'a [Task], view: TaskStatus, config: &ViewConfig) -> Vec<&'a Task> {
    let mut selected: Vec<&Task> = tasks.iter().filter(|task| view.matches(task)).collect();
    selected.sort_by(|a, b| config.compare(a, b));
    selected
}

/// Both display views, derived from one read of the collection
#[derive(Debug, Clone, Serialize)]
pub struct Views<'a> {
    pub active: Vec<&'a Task>,
    pub completed: Vec<&'a Task>,
}

impl<'a> Views<'a> {
    pub fn derive(tasks: &'a [Task], state: &ViewState) -> Self {
        Self {
            active: project(tasks, TaskStatus::Active, &state.active),
            completed: project(tasks, TaskStatus::Completed, &state.completed),
        }
    }

    pub fn get(&self, view: TaskStatus) -> &[&'a Task] {
        match view {
            TaskStatus::Active => &self.active,
            TaskStatus::Completed => &self.completed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Priority;
    use chrono::{TimeZone, Utc};

    fn task(id: &str, priority: Priority, secs: i64, completed: bool) -> Task {
        Task {
            id: id.to_string(),
            title: id.to_string(),
            description: String::new(),
            priority,
            completed,
            created_at: Utc.timestamp_opt(secs, 0).unwrap(),
        }
    }

    fn ids(tasks: &[&Task]) -> Vec<String> {
        tasks.iter().map(|task| task.id.clone()).collect()
    }

    fn config(sort_type: SortType, sort_direction: SortDirection) -> ViewConfig {
        ViewConfig {
            sort_type,
            sort_direction,
        }
    }

    #[test]
    fn priority_desc_ignores_creation_time() {
        let tasks = vec![
            task("low-new", Priority::Low, 30, false),
            task("high-old", Priority::High, 10, false),
            task("medium-mid", Priority::Medium, 20, false),
        ];
        let sorted = project(
            &tasks,
            TaskStatus::Active,
            &config(SortType::Priority, SortDirection::Descending),
        );
        assert_eq!(ids(&sorted), vec!["high-old", "medium-mid", "low-new"]);
    }

    #[test]
    fn datetime_desc_ignores_priority() {
        let tasks = vec![
            task("old-high", Priority::High, 10, false),
            task("new-low", Priority::Low, 30, false),
            task("mid-medium", Priority::Medium, 20, false),
        ];
        let sorted = project(
            &tasks,
            TaskStatus::Active,
            &config(SortType::Datetime, SortDirection::Descending),
        );
        assert_eq!(ids(&sorted), vec!["new-low", "mid-medium", "old-high"]);

        let sorted = project(
            &tasks,
            TaskStatus::Active,
            &config(SortType::Datetime, SortDirection::Ascending),
        );
        assert_eq!(ids(&sorted), vec!["old-high", "mid-medium", "new-low"]);
    }

    #[test]
    fn equal_keys_keep_insertion_order_both_directions() {
        let tasks = vec![
            task("first", Priority::Medium, 10, false),
            task("second", Priority::Medium, 20, false),
            task("third", Priority::Medium, 30, false),
        ];
        for direction in [SortDirection::Ascending, SortDirection::Descending] {
            let sorted = project(&tasks, TaskStatus::Active, &config(SortType::Priority, direction));
            assert_eq!(ids(&sorted), vec!["first", "second", "third"]);
        }
    }

    #[test]
    fn projection_filters_by_status_and_leaves_source_untouched() {
        let tasks = vec![
            task("a", Priority::Low, 1, true),
            task("b", Priority::High, 2, false),
            task("c", Priority::Medium, 3, true),
        ];
        let state = ViewState::default();
        let views = Views::derive(&tasks, &state);

        assert_eq!(ids(views.get(TaskStatus::Active)), vec!["b"]);
        assert_eq!(ids(views.get(TaskStatus::Completed)), vec!["c", "a"]);
        assert_eq!(tasks[0].id, "a");
    }

    #[test]
    fn toggles_flip_between_two_states_per_view() {
        let mut state = ViewState::default();
        assert_eq!(state.active.sort_type, SortType::Datetime);
        assert_eq!(state.active.sort_direction, SortDirection::Descending);

        state.toggle_sort_type(TaskStatus::Active);
        assert_eq!(state.active.sort_type, SortType::Priority);
        assert_eq!(state.completed.sort_type, SortType::Datetime);
        state.toggle_sort_type(TaskStatus::Active);
        assert_eq!(state.active.sort_type, SortType::Datetime);

        state.toggle_direction(TaskStatus::Completed);
        assert_eq!(state.completed.sort_direction, SortDirection::Ascending);
        assert_eq!(state.active.sort_direction, SortDirection::Descending);
        state.toggle_direction(TaskStatus::Completed);
        assert_eq!(state.completed.sort_direction, SortDirection::Descending);
    }

    #[test]
    fn view_config_wire_names() {
        let json = serde_json::to_value(config(SortType::Priority, SortDirection::Ascending)).unwrap();
        assert_eq!(json["sortType"], "priority");
        assert_eq!(json["sortDirection"], "asc");
    }
}
