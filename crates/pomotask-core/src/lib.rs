//! # Pomotask Core Library
//!
//! Core logic for the Pomotask pomodoro timer. Front ends (the `pomotask`
//! CLI, or anything else) drive a [`SessionController`] and render what it
//! reports through a [`Notifier`] and store subscriptions.
//!
//! ## Architecture
//!
//! - **Timer**: cooperative one-second countdown over an injectable [`Ticker`]
//! - **Store**: observable session state with field-keyed subscribers
//! - **Tasks**: ordered, persisted task list with selection and completion rules
//! - **Session**: the pomodoro/break loop, settings and the end-of-session summary
//! - **Storage**: key-value persistence (SQLite or in-memory) and TOML configuration
//!
//! ## Key Components
//!
//! - [`SessionController`]: session state machine and user-facing operations
//! - [`SessionStore`]: observable session state
//! - [`TaskRegistry`]: the persisted task list
//! - [`Config`]: application configuration management

pub mod error;
pub mod notify;
pub mod session;
pub mod storage;
pub mod store;
pub mod task;
pub mod timer;
pub mod validation;

pub use error::{ConfigError, CoreError, Result, StorageError};
pub use notify::{Notification, Notifier, NullNotifier, RecordingNotifier, Visibility};
pub use session::{
    ControllerPhase, SessionContext, SessionController, SessionSummary, Settings, SettingsReport,
    SummaryRow,
};
pub use storage::{Config, KeyValueStore, MemoryStore, SqliteStore};
pub use store::{Action, Field, Handler, SessionState, SessionStatus, SessionStore};
pub use task::{FormOutcome, Task, TaskFormError, TaskRegistry};
pub use timer::{IntervalKind, IntervalOutcome, Ticker, TokioTicker};
