//! Session controller and the pieces it coordinates.
//!
//! ## State Transitions
//!
//! ```text
//! Inactive -> RunningPomodoro -> RunningShortBreak -> RunningPomodoro -> ...
//!                             -> RunningLongBreak (every 4th pomodoro)
//! any running state -> Inactive (end session, or no task left to work on)
//! ```

mod announcements;
mod context;
mod controller;
mod settings;
mod summary;

pub use announcements::{
    break_prompt, focus_announcement, NO_TASKS_ANNOUNCEMENT, SESSION_ENDED_ANNOUNCEMENT,
    TASK_DONE_ANNOUNCEMENT, TASK_NOT_DONE_ANNOUNCEMENT,
};
pub use context::SessionContext;
pub use controller::{ControllerPhase, SessionController};
pub use settings::{Settings, SettingsReport};
pub use summary::{SessionSummary, SummaryRow};
