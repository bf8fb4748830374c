use serde::{Deserialize, Serialize};
use std::fmt;

/// Every n-th completed pomodoro is followed by a long break.
pub const LONG_BREAK_EVERY: i32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IntervalKind {
    #[default]
    Pomodoro,
    ShortBreak,
    LongBreak,
}

impl IntervalKind {
    pub fn is_break(&self) -> bool {
        matches!(self, IntervalKind::ShortBreak | IntervalKind::LongBreak)
    }

    /// Break that follows the pomodoro which brought the session total to
    /// `completed`.
    pub fn break_after(completed: i32) -> Self {
        if completed > 0 && completed % LONG_BREAK_EVERY == 0 {
            IntervalKind::LongBreak
        } else {
            IntervalKind::ShortBreak
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            IntervalKind::Pomodoro => "Pomodoro",
            IntervalKind::ShortBreak => "Short Break",
            IntervalKind::LongBreak => "Long Break",
        }
    }
}

impl fmt::Display for IntervalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fourth_pomodoro_earns_long_break() {
        let kinds: Vec<_> = (1..=8).map(IntervalKind::break_after).collect();
        assert_eq!(
            kinds,
            vec![
                IntervalKind::ShortBreak,
                IntervalKind::ShortBreak,
                IntervalKind::ShortBreak,
                IntervalKind::LongBreak,
                IntervalKind::ShortBreak,
                IntervalKind::ShortBreak,
                IntervalKind::ShortBreak,
                IntervalKind::LongBreak,
            ]
        );
    }

    #[test]
    fn zero_and_sentinel_are_short() {
        assert_eq!(IntervalKind::break_after(0), IntervalKind::ShortBreak);
        assert_eq!(IntervalKind::break_after(-1), IntervalKind::ShortBreak);
    }

    #[test]
    fn serde_uses_camel_case() {
        assert_eq!(
            serde_json::to_string(&IntervalKind::ShortBreak).unwrap(),
            "\"shortBreak\""
        );
        let kind: IntervalKind = serde_json::from_str("\"longBreak\"").unwrap();
        assert_eq!(kind, IntervalKind::LongBreak);
        assert!(IntervalKind::LongBreak.is_break());
        assert!(!IntervalKind::Pomodoro.is_break());
    }
}
