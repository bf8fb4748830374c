mod config;
pub mod database;
pub mod memory;

pub use config::{Config, NotificationsConfig, TimerConfig};
pub use database::SqliteStore;
pub use memory::MemoryStore;

use std::path::PathBuf;

use crate::error::{Result, StorageError};

/// Keys written to the key-value store.
pub mod keys {
    pub const TASKS: &str = "tasks";
    pub const POMODORO_LENGTH: &str = "pomodoroLength";
    pub const SHORT_BREAK_LENGTH: &str = "shortBreakLength";
    pub const LONG_BREAK_LENGTH: &str = "longBreakLength";
    pub const TIMER_AUDIO: &str = "timerAudio";
}

/// String key-value persistence.
///
/// Values are stored in their decimal/string form; the task list is a JSON
/// array under [`keys::TASKS`].
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}

/// Returns the data directory, creating it if needed.
///
/// `POMOTASK_DATA_DIR` overrides the location outright. Otherwise this is
/// `~/.config/pomotask[-dev]/`, with the `-dev` suffix when `POMOTASK_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("POMOTASK_DATA_DIR") {
        Some(custom) => PathBuf::from(custom),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("POMOTASK_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("pomotask-dev")
            } else {
                base_dir.join("pomotask")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|source| StorageError::DataDir {
        path: dir.clone(),
        source,
    })?;
    Ok(dir)
}
