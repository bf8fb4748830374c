use crate::error::Result;
use crate::storage::{KeyValueStore, TimerConfig};
use crate::store::{Action, SessionStore};
use crate::task::TaskRegistry;

use super::settings::Settings;

/// Everything the controller mutates, kept behind one lock.
#[derive(Debug)]
pub struct SessionContext {
    pub store: SessionStore,
    pub tasks: TaskRegistry,
    /// Set once the user answered the break prompt.
    pub(crate) announcement_clicked: bool,
    /// Bumped on every session start so a countdown left over from an earlier
    /// session never mistakes a newer one for its own.
    pub(crate) generation: u64,
}

impl SessionContext {
    pub fn new(store: SessionStore, tasks: TaskRegistry) -> Self {
        Self {
            store,
            tasks,
            announcement_clicked: false,
            generation: 0,
        }
    }

    /// Restore tasks and settings from `storage`, falling back to `defaults`
    /// for settings that were never saved.
    pub fn restore(storage: Box<dyn KeyValueStore>, defaults: &TimerConfig) -> Result<Self> {
        let tasks = TaskRegistry::open(storage)?;
        let settings = Settings::restore(tasks.storage(), defaults)?;

        let mut store = SessionStore::default();
        settings.apply(&mut store);
        let selected = tasks.selected().map(|t| t.name.clone());
        store.dispatch(Action::SetCurrentSelectedTask(selected));

        Ok(Self::new(store, tasks))
    }

    /// Whether the session started as `generation` is still the running one.
    pub(crate) fn runs(&self, generation: u64) -> bool {
        self.generation == generation && self.store.state().is_active()
    }

    /// Mirror the registry's selection into the store.
    pub(crate) fn sync_selected(&mut self) {
        let selected = self.tasks.selected().map(|t| t.name.clone());
        if self.store.state().current_selected_task != selected {
            self.store.dispatch(Action::SetCurrentSelectedTask(selected));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{keys, MemoryStore};

    #[test]
    fn restore_mirrors_selection_and_settings() {
        let kv = MemoryStore::with_entries([
            (
                keys::TASKS,
                r#"[{"name":"a","estimatedPomodoros":1,"usedPomodoros":0,"selected":true,"completed":false}]"#,
            ),
            (keys::LONG_BREAK_LENGTH, "20"),
        ]);
        let ctx = SessionContext::restore(Box::new(kv), &TimerConfig::default()).unwrap();
        let state = ctx.store.state();
        assert_eq!(state.current_selected_task.as_deref(), Some("a"));
        assert_eq!(state.long_break_length, 20);
        assert_eq!(state.short_break_length, 5);
        assert!(!state.is_active());
    }

    #[test]
    fn restore_from_nothing() {
        let ctx =
            SessionContext::restore(Box::new(MemoryStore::new()), &TimerConfig::default()).unwrap();
        assert!(ctx.tasks.tasks().is_empty());
        assert!(ctx.store.state().current_selected_task.is_none());
    }
}
