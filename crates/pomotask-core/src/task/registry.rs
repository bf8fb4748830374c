//! Ordered task list persisted to a key-value store.
//!
//! Every mutation writes the whole sequence back under [`keys::TASKS`].
//! Operations on a name that is not in the list are precondition violations
//! (usually a stale front end, e.g. a double-clicked delete); they log a
//! warning and change nothing.

use crate::error::Result;
use crate::storage::{keys, KeyValueStore};

use super::{Task, TaskFormError};

/// Result of a form submission or edit that passed through validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutcome {
    Accepted,
    Rejected(TaskFormError),
}

impl FormOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, FormOutcome::Accepted)
    }
}

pub struct TaskRegistry {
    tasks: Vec<Task>,
    storage: Box<dyn KeyValueStore>,
}

impl TaskRegistry {
    /// An empty registry. Nothing is read or written until the first call.
    pub fn new(storage: Box<dyn KeyValueStore>) -> Self {
        Self {
            tasks: Vec::new(),
            storage,
        }
    }

    /// A registry populated from whatever `storage` holds.
    pub fn open(storage: Box<dyn KeyValueStore>) -> Result<Self> {
        let mut registry = Self::new(storage);
        registry.restore()?;
        Ok(registry)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, name: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.name == name)
    }

    pub fn selected(&self) -> Option<&Task> {
        self.tasks.iter().find(|t| t.selected)
    }

    pub fn storage(&self) -> &dyn KeyValueStore {
        self.storage.as_ref()
    }

    pub fn storage_mut(&mut self) -> &mut dyn KeyValueStore {
        self.storage.as_mut()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Load the persisted sequence.
    ///
    /// Missing, empty or unparsable data resets the list to `[]` and writes
    /// that back. Records with missing or mistyped fields are dropped whole,
    /// as are blank or repeated names; the survivors keep their order.
    pub fn restore(&mut self) -> Result<()> {
        let raw = self.storage.get(keys::TASKS)?;
        let entries = raw
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .and_then(|s| serde_json::from_str::<Vec<serde_json::Value>>(s).ok());

        let Some(entries) = entries else {
            if raw.is_some() {
                tracing::warn!("stored task list is unreadable, starting with an empty list");
            }
            self.tasks.clear();
            return self.persist();
        };

        let total = entries.len();
        let mut tasks: Vec<Task> = Vec::with_capacity(total);
        for (index, entry) in entries.into_iter().enumerate() {
            let task = match serde_json::from_value::<Task>(entry) {
                Ok(task) => task,
                Err(e) => {
                    tracing::warn!(index, error = %e, "dropping malformed task record");
                    continue;
                }
            };
            if task.name.trim().is_empty() || tasks.iter().any(|t| t.name == task.name) {
                tracing::warn!(index, name = %task.name, "dropping task with blank or repeated name");
                continue;
            }
            tasks.push(task);
        }

        let mut seen_selected = false;
        let mut repaired = 0;
        for task in tasks.iter_mut() {
            if task.selected && (task.completed || seen_selected) {
                task.selected = false;
                repaired += 1;
            }
            seen_selected |= task.selected;
        }

        let dropped = total - tasks.len();
        self.tasks = tasks;
        tracing::debug!(restored = self.tasks.len(), dropped, repaired, "task list restored");
        if dropped > 0 || repaired > 0 {
            self.persist()?;
        }
        Ok(())
    }

    /// Insert a new task before the first completed one (or at the end).
    pub fn add(&mut self, mut task: Task) -> Result<FormOutcome> {
        let name = task.name.trim().to_string();
        if name.is_empty() {
            return Ok(FormOutcome::Rejected(TaskFormError::BlankName));
        }
        if self.get(&name).is_some() {
            return Ok(FormOutcome::Rejected(TaskFormError::DuplicateName(name)));
        }

        task.name = name;
        task.selected = false;
        let at = if task.completed {
            self.tasks.len()
        } else {
            self.first_completed_index()
        };
        self.tasks.insert(at, task);
        self.persist()?;
        Ok(FormOutcome::Accepted)
    }

    pub fn delete(&mut self, name: &str) -> Result<bool> {
        let Some(idx) = self.position(name, "delete") else {
            return Ok(false);
        };
        self.tasks.remove(idx);
        self.persist()?;
        Ok(true)
    }

    /// Replace the task currently named `prev` with `next`, in place.
    pub fn update(&mut self, prev: &str, next: Task) -> Result<bool> {
        let Some(idx) = self.position(prev, "update") else {
            return Ok(false);
        };
        self.tasks[idx] = next;
        self.persist()?;
        Ok(true)
    }

    /// Rename and/or re-estimate a task from the edit form.
    pub fn edit(
        &mut self,
        prev: &str,
        new_name: Option<&str>,
        estimated_pomodoros: Option<u32>,
    ) -> Result<FormOutcome> {
        let Some(current) = self.get(prev).cloned() else {
            tracing::warn!(task = prev, "edit on unknown task ignored");
            return Ok(FormOutcome::Rejected(TaskFormError::NotFound(prev.to_string())));
        };
        if !current.is_editable() {
            return Ok(FormOutcome::Rejected(TaskFormError::NotEditable(current.name)));
        }

        let mut next = current;
        if let Some(name) = new_name {
            let name = name.trim();
            if name.is_empty() {
                return Ok(FormOutcome::Rejected(TaskFormError::BlankName));
            }
            if name != prev && self.get(name).is_some() {
                return Ok(FormOutcome::Rejected(TaskFormError::DuplicateName(name.to_string())));
            }
            next.name = name.to_string();
        }
        if let Some(estimate) = estimated_pomodoros {
            next.estimated_pomodoros = estimate;
        }

        self.update(prev, next)?;
        Ok(FormOutcome::Accepted)
    }

    /// Deselect the current selection, then move `name` to the front as the
    /// selected task. The two steps are separate writes.
    pub fn select(&mut self, name: &str) -> Result<bool> {
        match self.get(name) {
            None => {
                tracing::warn!(task = name, "select on unknown task ignored");
                return Ok(false);
            }
            Some(task) if !task.is_selectable() => {
                tracing::warn!(task = name, "completed task cannot be selected");
                return Ok(false);
            }
            Some(_) => {}
        }

        if let Some(current) = self.selected().cloned() {
            let prev = current.name.clone();
            let mut deselected = current;
            deselected.selected = false;
            self.update(&prev, deselected)?;
        }

        let Some(idx) = self.position(name, "select") else {
            return Ok(false);
        };
        let mut task = self.tasks.remove(idx);
        task.selected = true;
        self.tasks.insert(0, task);
        self.persist()?;
        Ok(true)
    }

    /// Select the head of the list if it can be selected.
    pub fn select_first(&mut self) -> Result<Option<String>> {
        let Some(name) = self
            .tasks
            .first()
            .filter(|t| t.is_selectable())
            .map(|t| t.name.clone())
        else {
            return Ok(None);
        };
        self.select(&name)?;
        Ok(Some(name))
    }

    pub fn deselect_all(&mut self) -> Result<()> {
        for task in self.tasks.iter_mut() {
            task.selected = false;
        }
        self.persist()
    }

    pub fn increment_pomodoro(&mut self, name: &str) -> Result<bool> {
        let Some(task) = self.get(name).cloned() else {
            tracing::warn!(task = name, "increment on unknown task ignored");
            return Ok(false);
        };
        let mut next = task;
        next.used_pomodoros = next.used_pomodoros.saturating_add(1);
        self.update(name, next)
    }

    /// Mark done and move to the back, behind earlier completions.
    pub fn complete(&mut self, name: &str) -> Result<bool> {
        let Some(idx) = self.position(name, "complete") else {
            return Ok(false);
        };
        if self.tasks[idx].completed {
            return Ok(false);
        }
        let mut task = self.tasks.remove(idx);
        task.selected = false;
        task.completed = true;
        self.tasks.push(task);
        self.persist()?;
        Ok(true)
    }

    /// Enable or disable front-end interaction on every task. Not persisted.
    pub fn set_usability(&mut self, enabled: bool) {
        for task in self.tasks.iter_mut() {
            task.interactive = enabled;
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn position(&self, name: &str, op: &'static str) -> Option<usize> {
        let idx = self.tasks.iter().position(|t| t.name == name);
        if idx.is_none() {
            tracing::warn!(task = name, op, "operation on unknown task ignored");
        }
        idx
    }

    fn first_completed_index(&self) -> usize {
        self.tasks
            .iter()
            .position(|t| t.completed)
            .unwrap_or(self.tasks.len())
    }

    fn persist(&mut self) -> Result<()> {
        let json = serde_json::to_string(&self.tasks)?;
        self.storage.set(keys::TASKS, &json)
    }
}

impl std::fmt::Debug for TaskRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskRegistry")
            .field("tasks", &self.tasks)
            .finish_non_exhaustive()
    }
}
