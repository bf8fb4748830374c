//! Interval lengths and notification sound.
//!
//! Saved settings live in the key-value store as plain decimal strings. On
//! startup each value is validated on its own; anything missing or invalid
//! falls back to the config file, and then to the built-in defaults.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::storage::{keys, KeyValueStore, TimerConfig};
use crate::store::{Action, SessionStore};
use crate::validation::{
    check_if_time_valid, validate_long_break_length, validate_number, validate_short_break_length,
    validate_timer_audio, whole_number,
};

const DEFAULT_POMODORO_LENGTH: u32 = 25;
const DEFAULT_SHORT_BREAK_LENGTH: u32 = 5;
const DEFAULT_LONG_BREAK_LENGTH: u32 = 15;
const DEFAULT_TIMER_AUDIO: &str = "bell";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub pomodoro_length: u32,
    pub short_break_length: u32,
    pub long_break_length: u32,
    pub timer_audio: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pomodoro_length: DEFAULT_POMODORO_LENGTH,
            short_break_length: DEFAULT_SHORT_BREAK_LENGTH,
            long_break_length: DEFAULT_LONG_BREAK_LENGTH,
            timer_audio: DEFAULT_TIMER_AUDIO.to_string(),
        }
    }
}

/// Which parts of a settings save were turned down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsReport {
    pub short_break_rejected: bool,
    pub long_break_rejected: bool,
    pub timer_audio_rejected: bool,
    /// Nothing was applied because a session is running.
    pub ignored_while_active: bool,
}

impl SettingsReport {
    pub fn is_ok(&self) -> bool {
        !(self.short_break_rejected
            || self.long_break_rejected
            || self.timer_audio_rejected
            || self.ignored_while_active)
    }
}

/// A pomodoro must last at least a minute and fit the display.
fn validate_pomodoro_length(value: &str) -> Option<f64> {
    validate_number(value)
        .filter(|n| *n >= 1.0 && check_if_time_valid((n.trunc() * 60.0) as i64))
}

fn pick<T>(
    stored: Option<String>,
    fallback: String,
    validate: impl Fn(&str) -> Option<T>,
    default: T,
) -> T {
    stored
        .as_deref()
        .and_then(&validate)
        .or_else(|| validate(&fallback))
        .unwrap_or(default)
}

impl Settings {
    pub fn restore(kv: &dyn KeyValueStore, defaults: &TimerConfig) -> Result<Self> {
        let settings = Self {
            pomodoro_length: whole_number(pick(
                kv.get(keys::POMODORO_LENGTH)?,
                defaults.pomodoro_length.to_string(),
                validate_pomodoro_length,
                f64::from(DEFAULT_POMODORO_LENGTH),
            )),
            short_break_length: whole_number(pick(
                kv.get(keys::SHORT_BREAK_LENGTH)?,
                defaults.short_break_length.to_string(),
                validate_short_break_length,
                f64::from(DEFAULT_SHORT_BREAK_LENGTH),
            )),
            long_break_length: whole_number(pick(
                kv.get(keys::LONG_BREAK_LENGTH)?,
                defaults.long_break_length.to_string(),
                validate_long_break_length,
                f64::from(DEFAULT_LONG_BREAK_LENGTH),
            )),
            timer_audio: pick(
                kv.get(keys::TIMER_AUDIO)?,
                defaults.timer_audio.clone(),
                validate_timer_audio,
                DEFAULT_TIMER_AUDIO,
            )
            .to_string(),
        };
        tracing::debug!(?settings, "settings restored");
        Ok(settings)
    }

    /// Merge a settings form into these settings. Each field is validated on
    /// its own; rejected fields keep their previous value.
    pub fn merged(
        &self,
        short_break: &str,
        long_break: &str,
        timer_audio: &str,
    ) -> (Self, SettingsReport) {
        let mut next = self.clone();
        let mut report = SettingsReport::default();

        match validate_short_break_length(short_break) {
            Some(v) => next.short_break_length = whole_number(v),
            None => report.short_break_rejected = true,
        }
        match validate_long_break_length(long_break) {
            Some(v) => next.long_break_length = whole_number(v),
            None => report.long_break_rejected = true,
        }
        match validate_timer_audio(timer_audio) {
            Some(v) => next.timer_audio = v.to_string(),
            None => report.timer_audio_rejected = true,
        }
        (next, report)
    }

    pub fn persist(&self, kv: &mut dyn KeyValueStore) -> Result<()> {
        kv.set(keys::POMODORO_LENGTH, &self.pomodoro_length.to_string())?;
        kv.set(keys::SHORT_BREAK_LENGTH, &self.short_break_length.to_string())?;
        kv.set(keys::LONG_BREAK_LENGTH, &self.long_break_length.to_string())?;
        kv.set(keys::TIMER_AUDIO, &self.timer_audio)?;
        Ok(())
    }

    /// Dispatch every field into the store.
    pub fn apply(&self, store: &mut SessionStore) {
        store.dispatch(Action::SetPomodoroLength(self.pomodoro_length));
        store.dispatch(Action::SetShortBreakLength(self.short_break_length));
        store.dispatch(Action::SetLongBreakLength(self.long_break_length));
        store.dispatch(Action::SetTimerAudio(self.timer_audio.clone()));
    }

    pub fn from_state(state: &crate::store::SessionState) -> Self {
        Self {
            pomodoro_length: state.pomodoro_length,
            short_break_length: state.short_break_length,
            long_break_length: state.long_break_length,
            timer_audio: state.timer_audio.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn restore_empty_store_uses_config() {
        let kv = MemoryStore::new();
        let config = TimerConfig {
            short_break_length: 3,
            timer_audio: "gong".into(),
            ..TimerConfig::default()
        };
        let settings = Settings::restore(&kv, &config).unwrap();
        assert_eq!(settings.short_break_length, 3);
        assert_eq!(settings.long_break_length, 15);
        assert_eq!(settings.pomodoro_length, 25);
        assert_eq!(settings.timer_audio, "gong");
    }

    #[test]
    fn restore_prefers_valid_stored_values() {
        let kv = MemoryStore::with_entries([
            (keys::SHORT_BREAK_LENGTH, "4"),
            (keys::LONG_BREAK_LENGTH, "99"),
            (keys::POMODORO_LENGTH, "50"),
            (keys::TIMER_AUDIO, "kazoo"),
        ]);
        let settings = Settings::restore(&kv, &TimerConfig::default()).unwrap();
        assert_eq!(settings.short_break_length, 4);
        assert_eq!(settings.long_break_length, 15);
        assert_eq!(settings.pomodoro_length, 50);
        assert_eq!(settings.timer_audio, "bell");
    }

    #[test]
    fn restore_ignores_invalid_config_too() {
        let config = TimerConfig {
            pomodoro_length: 90,
            long_break_length: 2,
            timer_audio: "nope".into(),
            ..TimerConfig::default()
        };
        let settings = Settings::restore(&MemoryStore::new(), &config).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn merged_rejects_fields_independently() {
        let base = Settings::default();
        let (next, report) = base.merged("3", "40", "chime");
        assert_eq!(next.short_break_length, 3);
        assert_eq!(next.long_break_length, 15);
        assert_eq!(next.timer_audio, "chime");
        assert!(!report.short_break_rejected);
        assert!(report.long_break_rejected);
        assert!(!report.timer_audio_rejected);
        assert!(!report.is_ok());
    }

    #[test]
    fn persist_writes_decimal_strings() {
        let mut kv = MemoryStore::new();
        Settings::default().persist(&mut kv).unwrap();
        assert_eq!(kv.get(keys::SHORT_BREAK_LENGTH).unwrap().as_deref(), Some("5"));
        assert_eq!(kv.get(keys::TIMER_AUDIO).unwrap().as_deref(), Some("bell"));
    }
}
