//! Reactive session state.
//!
//! [`SessionStore`] holds one [`SessionState`] and a list of subscribers keyed
//! by [`Field`]. A dispatch changes exactly one field and then calls, in
//! registration order, each subscriber of that field with the whole new state.
//!
//! Dispatches never cascade: changing `session` does not notify
//! `currentTime` subscribers even when the caller is about to reset the time.
//! Callers dispatch every field they change.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::timer::IntervalKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    #[default]
    Inactive,
    Active,
}

/// Completed-pomodoro counter value meaning "the session ended on its own
/// because no task was available, before any pomodoro was completed".
pub const NO_TASKS_SENTINEL: i32 = -1;

/// Snapshot of everything the session exposes to its observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub session: SessionStatus,
    pub current_interval: IntervalKind,
    /// Seconds left in the current interval.
    pub current_time: u32,
    pub current_selected_task: Option<String>,
    pub number_of_pomodoros_completed: i32,
    /// Minutes.
    pub pomodoro_length: u32,
    /// Minutes.
    pub short_break_length: u32,
    /// Minutes.
    pub long_break_length: u32,
    pub timer_audio: String,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            session: SessionStatus::Inactive,
            current_interval: IntervalKind::Pomodoro,
            current_time: 0,
            current_selected_task: None,
            number_of_pomodoros_completed: 0,
            pomodoro_length: 25,
            short_break_length: 5,
            long_break_length: 15,
            timer_audio: "bell".to_string(),
        }
    }
}

impl SessionState {
    pub fn is_active(&self) -> bool {
        self.session == SessionStatus::Active
    }

    /// Length of an interval of the given kind, in seconds.
    pub fn interval_secs(&self, kind: IntervalKind) -> u32 {
        let minutes = match kind {
            IntervalKind::Pomodoro => self.pomodoro_length,
            IntervalKind::ShortBreak => self.short_break_length,
            IntervalKind::LongBreak => self.long_break_length,
        };
        minutes.saturating_mul(60)
    }
}

/// Observable fields of [`SessionState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Session,
    CurrentInterval,
    CurrentTime,
    CurrentSelectedTask,
    NumberOfPomodorosCompleted,
    PomodoroLength,
    ShortBreakLength,
    LongBreakLength,
    TimerAudio,
}

impl Field {
    pub const ALL: [Field; 9] = [
        Field::Session,
        Field::CurrentInterval,
        Field::CurrentTime,
        Field::CurrentSelectedTask,
        Field::NumberOfPomodorosCompleted,
        Field::PomodoroLength,
        Field::ShortBreakLength,
        Field::LongBreakLength,
        Field::TimerAudio,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Field::Session => "session",
            Field::CurrentInterval => "currentInterval",
            Field::CurrentTime => "currentTime",
            Field::CurrentSelectedTask => "currentSelectedTask",
            Field::NumberOfPomodorosCompleted => "numberOfPomodorosCompleted",
            Field::PomodoroLength => "pomodoroLength",
            Field::ShortBreakLength => "shortBreakLength",
            Field::LongBreakLength => "longBreakLength",
            Field::TimerAudio => "timerAudio",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single-field update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SetSession(SessionStatus),
    SetCurrentInterval(IntervalKind),
    SetCurrentTime(u32),
    SetCurrentSelectedTask(Option<String>),
    SetNumberOfPomodorosCompleted(i32),
    SetPomodoroLength(u32),
    SetShortBreakLength(u32),
    SetLongBreakLength(u32),
    SetTimerAudio(String),
}

impl Action {
    pub fn field(&self) -> Field {
        match self {
            Action::SetSession(_) => Field::Session,
            Action::SetCurrentInterval(_) => Field::CurrentInterval,
            Action::SetCurrentTime(_) => Field::CurrentTime,
            Action::SetCurrentSelectedTask(_) => Field::CurrentSelectedTask,
            Action::SetNumberOfPomodorosCompleted(_) => Field::NumberOfPomodorosCompleted,
            Action::SetPomodoroLength(_) => Field::PomodoroLength,
            Action::SetShortBreakLength(_) => Field::ShortBreakLength,
            Action::SetLongBreakLength(_) => Field::LongBreakLength,
            Action::SetTimerAudio(_) => Field::TimerAudio,
        }
    }

    /// Build an action from a field name and a JSON payload. `None` when the
    /// name is unknown or the payload has the wrong shape.
    pub fn from_raw(field: &str, payload: serde_json::Value) -> Option<Self> {
        use serde_json::from_value;

        let action = match Field::from_name(field)? {
            Field::Session => Action::SetSession(from_value(payload).ok()?),
            Field::CurrentInterval => Action::SetCurrentInterval(from_value(payload).ok()?),
            Field::CurrentTime => Action::SetCurrentTime(from_value(payload).ok()?),
            Field::CurrentSelectedTask => {
                Action::SetCurrentSelectedTask(from_value(payload).ok()?)
            }
            Field::NumberOfPomodorosCompleted => {
                Action::SetNumberOfPomodorosCompleted(from_value(payload).ok()?)
            }
            Field::PomodoroLength => Action::SetPomodoroLength(from_value(payload).ok()?),
            Field::ShortBreakLength => Action::SetShortBreakLength(from_value(payload).ok()?),
            Field::LongBreakLength => Action::SetLongBreakLength(from_value(payload).ok()?),
            Field::TimerAudio => Action::SetTimerAudio(from_value(payload).ok()?),
        };
        Some(action)
    }

    fn apply(self, state: &mut SessionState) {
        match self {
            Action::SetSession(v) => state.session = v,
            Action::SetCurrentInterval(v) => state.current_interval = v,
            Action::SetCurrentTime(v) => state.current_time = v,
            Action::SetCurrentSelectedTask(v) => state.current_selected_task = v,
            Action::SetNumberOfPomodorosCompleted(v) => state.number_of_pomodoros_completed = v,
            Action::SetPomodoroLength(v) => state.pomodoro_length = v,
            Action::SetShortBreakLength(v) => state.short_break_length = v,
            Action::SetLongBreakLength(v) => state.long_break_length = v,
            Action::SetTimerAudio(v) => state.timer_audio = v,
        }
    }
}

/// Subscriber callback. Receives the full state after the update.
pub type Handler = Box<dyn FnMut(&SessionState) + Send>;

pub struct SessionStore {
    state: SessionState,
    subscribers: Vec<(Field, Handler)>,
}

impl SessionStore {
    pub fn new(state: SessionState) -> Self {
        Self {
            state,
            subscribers: Vec::new(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Register callbacks keyed by field and return the current snapshot.
    pub fn subscribe<I>(&mut self, handlers: I) -> SessionState
    where
        I: IntoIterator<Item = (Field, Handler)>,
    {
        self.subscribers.extend(handlers);
        self.state.clone()
    }

    pub fn dispatch(&mut self, action: Action) {
        let field = action.field();
        action.apply(&mut self.state);
        tracing::trace!(%field, "dispatch");

        let state = &self.state;
        for (_, handler) in self.subscribers.iter_mut().filter(|(f, _)| *f == field) {
            handler(state);
        }
    }

    /// String-keyed dispatch. Unknown fields and mistyped payloads are
    /// ignored; returns whether anything was dispatched.
    pub fn dispatch_raw(&mut self, field: &str, payload: serde_json::Value) -> bool {
        match Action::from_raw(field, payload) {
            Some(action) => {
                self.dispatch(action);
                true
            }
            None => {
                tracing::debug!(field, "ignoring dispatch to unknown field or bad payload");
                false
            }
        }
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(SessionState::default())
    }
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("state", &self.state)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    fn recorder(log: &Arc<Mutex<Vec<String>>>, tag: &'static str) -> Handler {
        let log = Arc::clone(log);
        Box::new(move |state: &SessionState| {
            log.lock()
                .unwrap()
                .push(format!("{tag}:{}:{}", state.current_time, state.session == SessionStatus::Active));
        })
    }

    #[test]
    fn subscribe_returns_snapshot() {
        let mut store = SessionStore::default();
        store.dispatch(Action::SetCurrentTime(42));
        let snap = store.subscribe(Vec::new());
        assert_eq!(snap.current_time, 42);
        assert_eq!(snap, *store.state());
    }

    #[test]
    fn dispatch_notifies_in_registration_order_with_full_state() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut store = SessionStore::default();
        store.dispatch(Action::SetSession(SessionStatus::Active));
        store.subscribe([
            (Field::CurrentTime, recorder(&log, "a")),
            (Field::Session, recorder(&log, "s")),
        ]);
        store.subscribe([(Field::CurrentTime, recorder(&log, "b"))]);

        store.dispatch(Action::SetCurrentTime(7));

        assert_eq!(*log.lock().unwrap(), vec!["a:7:true", "b:7:true"]);
    }

    #[test]
    fn no_implicit_cascade() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut store = SessionStore::default();
        store.subscribe([(Field::CurrentTime, recorder(&log, "t"))]);

        store.dispatch(Action::SetSession(SessionStatus::Active));
        store.dispatch(Action::SetNumberOfPomodorosCompleted(3));

        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn dispatch_raw_parses_payloads() {
        let mut store = SessionStore::default();
        assert!(store.dispatch_raw("session", json!("active")));
        assert!(store.dispatch_raw("currentInterval", json!("longBreak")));
        assert!(store.dispatch_raw("currentSelectedTask", json!("write")));
        assert!(store.dispatch_raw("numberOfPomodorosCompleted", json!(-1)));

        let state = store.state();
        assert!(state.is_active());
        assert_eq!(state.current_interval, IntervalKind::LongBreak);
        assert_eq!(state.current_selected_task.as_deref(), Some("write"));
        assert_eq!(state.number_of_pomodoros_completed, NO_TASKS_SENTINEL);

        assert!(store.dispatch_raw("currentSelectedTask", json!(null)));
        assert!(store.state().current_selected_task.is_none());
    }

    #[test]
    fn dispatch_raw_ignores_unknown_and_mistyped() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut store = SessionStore::default();
        store.subscribe([(Field::CurrentTime, recorder(&log, "t"))]);
        let before = store.state().clone();

        assert!(!store.dispatch_raw("colour", json!("blue")));
        assert!(!store.dispatch_raw("currentTime", json!(-3)));
        assert!(!store.dispatch_raw("session", json!("paused")));

        assert_eq!(*store.state(), before);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn completed_counter_and_pomodoro_length_are_distinct() {
        let mut store = SessionStore::default();
        store.dispatch(Action::SetNumberOfPomodorosCompleted(2));
        assert_eq!(store.state().pomodoro_length, 25);
        store.dispatch(Action::SetPomodoroLength(30));
        assert_eq!(store.state().number_of_pomodoros_completed, 2);
    }

    #[test]
    fn field_names_round_trip() {
        for field in Field::ALL {
            assert_eq!(Field::from_name(field.name()), Some(field));
        }
        assert_eq!(Field::from_name("CurrentTime"), None);
    }

    #[test]
    fn interval_secs_uses_minutes() {
        let state = SessionState::default();
        assert_eq!(state.interval_secs(IntervalKind::Pomodoro), 1500);
        assert_eq!(state.interval_secs(IntervalKind::ShortBreak), 300);
        assert_eq!(state.interval_secs(IntervalKind::LongBreak), 900);
    }
}
