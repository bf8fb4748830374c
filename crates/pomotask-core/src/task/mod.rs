//! Tasks and the ordered task list.
//!
//! A task is identified by its name. The list keeps three ordering rules:
//! the selected task sits at the front, completed tasks sit at the back in the
//! order they were completed, and new tasks go in just before the first
//! completed one.

mod registry;

pub use registry::{FormOutcome, TaskRegistry};

use serde::{Deserialize, Serialize};
use std::fmt;

/// A unit of work credited with pomodoros.
///
/// Serialized with camelCase keys; `interactive` is a front-end concern and
/// never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub name: String,
    pub estimated_pomodoros: u32,
    pub used_pomodoros: u32,
    pub selected: bool,
    pub completed: bool,
    /// Whether the front end should accept input on this task.
    #[serde(skip, default = "default_interactive")]
    pub interactive: bool,
}

fn default_interactive() -> bool {
    true
}

impl Task {
    pub fn new(name: impl Into<String>, estimated_pomodoros: u32) -> Self {
        Self {
            name: name.into(),
            estimated_pomodoros,
            used_pomodoros: 0,
            selected: false,
            completed: false,
            interactive: true,
        }
    }

    /// Completed tasks lose their edit affordance for good.
    pub fn is_editable(&self) -> bool {
        self.interactive && !self.completed
    }

    pub fn is_selectable(&self) -> bool {
        !self.completed
    }
}

/// Why a task form submission or edit was turned down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "reason", content = "name")]
pub enum TaskFormError {
    BlankName,
    DuplicateName(String),
    InvalidEstimate,
    NotFound(String),
    NotEditable(String),
}

impl fmt::Display for TaskFormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskFormError::BlankName => f.write_str("task name must not be blank"),
            TaskFormError::DuplicateName(name) => write!(f, "a task named '{name}' already exists"),
            TaskFormError::InvalidEstimate => {
                f.write_str("estimated pomodoros must be a number >= 0")
            }
            TaskFormError::NotFound(name) => write!(f, "no task named '{name}'"),
            TaskFormError::NotEditable(name) => write!(f, "task '{name}' cannot be edited"),
        }
    }
}
