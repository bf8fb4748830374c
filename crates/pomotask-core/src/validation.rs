//! Input validation for settings and the task form.
//!
//! Every validator returns `None` to mean "reject, keep the previous value".
//! Nothing here panics or returns an error; callers decide whether to surface
//! an error indicator.

/// Inclusive bounds for the short break length, in minutes.
pub const SHORT_BREAK_RANGE: (f64, f64) = (3.0, 5.0);

/// Inclusive bounds for the long break length, in minutes.
pub const LONG_BREAK_RANGE: (f64, f64) = (15.0, 30.0);

/// Known notification sounds. Playback is owned by the front end; the core
/// only checks that a setting names one of these.
pub const TIMER_AUDIO_OPTIONS: &[&str] = &["bell", "chime", "digital", "gong", "marimba"];

/// Upper bound (exclusive) of a displayable countdown, in seconds.
pub const MAX_DISPLAY_SECONDS: i64 = 3600;

/// Parse a number. Negative values are accepted; non-numeric, NaN and
/// infinite inputs are not.
pub fn validate_number(value: &str) -> Option<f64> {
    let parsed = value.trim().parse::<f64>().ok()?;
    parsed.is_finite().then_some(parsed)
}

pub fn validate_short_break_length(value: &str) -> Option<f64> {
    within(value, SHORT_BREAK_RANGE)
}

pub fn validate_long_break_length(value: &str) -> Option<f64> {
    within(value, LONG_BREAK_RANGE)
}

/// Exact, case-sensitive match against [`TIMER_AUDIO_OPTIONS`].
pub fn validate_timer_audio(value: &str) -> Option<&'static str> {
    TIMER_AUDIO_OPTIONS.iter().copied().find(|opt| *opt == value)
}

pub fn validate_pomodoro_estimate(value: &str) -> Option<f64> {
    validate_number(value).filter(|n| *n >= 0.0)
}

/// True iff `0 <= time < 3600`.
pub fn check_if_time_valid(time: i64) -> bool {
    (0..MAX_DISPLAY_SECONDS).contains(&time)
}

fn within(value: &str, (lo, hi): (f64, f64)) -> Option<f64> {
    validate_number(value).filter(|n| (lo..=hi).contains(n))
}

/// Whole-number view of a validated value; fractions are truncated.
pub(crate) fn whole_number(value: f64) -> u32 {
    value.trunc().clamp(0.0, u32::MAX as f64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn number_parses_floats_and_negatives() {
        assert_eq!(validate_number("4"), Some(4.0));
        assert_eq!(validate_number(" 2.5 "), Some(2.5));
        assert_eq!(validate_number("-7"), Some(-7.0));
        assert_eq!(validate_number("abc"), None);
        assert_eq!(validate_number(""), None);
        assert_eq!(validate_number("NaN"), None);
        assert_eq!(validate_number("inf"), None);
    }

    #[test]
    fn short_break_bounds() {
        assert_eq!(validate_short_break_length("2"), None);
        assert_eq!(validate_short_break_length("6"), None);
        assert_eq!(validate_short_break_length("3"), Some(3.0));
        assert_eq!(validate_short_break_length("4"), Some(4.0));
        assert_eq!(validate_short_break_length("5"), Some(5.0));
    }

    #[test]
    fn long_break_bounds() {
        assert_eq!(validate_long_break_length("14"), None);
        assert_eq!(validate_long_break_length("15"), Some(15.0));
        assert_eq!(validate_long_break_length("30"), Some(30.0));
        assert_eq!(validate_long_break_length("31"), None);
        assert_eq!(validate_long_break_length("twenty"), None);
    }

    #[test]
    fn timer_audio_requires_exact_match() {
        assert_eq!(validate_timer_audio("bell"), Some("bell"));
        assert_eq!(validate_timer_audio("Bell"), None);
        assert_eq!(validate_timer_audio("bell "), None);
        assert_eq!(validate_timer_audio(""), None);
    }

    #[test]
    fn estimate_rejects_negative() {
        assert_eq!(validate_pomodoro_estimate("0"), Some(0.0));
        assert_eq!(validate_pomodoro_estimate("3"), Some(3.0));
        assert_eq!(validate_pomodoro_estimate("-1"), None);
        assert_eq!(validate_pomodoro_estimate("x"), None);
    }

    #[test]
    fn time_validity_window() {
        assert!(check_if_time_valid(0));
        assert!(check_if_time_valid(3599));
        assert!(!check_if_time_valid(3600));
        assert!(!check_if_time_valid(-1));
    }

    #[test]
    fn whole_number_truncates() {
        assert_eq!(whole_number(4.9), 4);
        assert_eq!(whole_number(-2.0), 0);
    }

    proptest! {
        #[test]
        fn short_break_accepts_exactly_the_range(n in -100i32..100) {
            let accepted = validate_short_break_length(&n.to_string()).is_some();
            prop_assert_eq!(accepted, (3..=5).contains(&n));
        }

        #[test]
        fn long_break_returns_input_unchanged(n in 15u32..=30) {
            prop_assert_eq!(validate_long_break_length(&n.to_string()), Some(n as f64));
        }

        #[test]
        fn validators_never_panic(s in ".*") {
            let _ = validate_number(&s);
            let _ = validate_short_break_length(&s);
            let _ = validate_long_break_length(&s);
            let _ = validate_timer_audio(&s);
            let _ = validate_pomodoro_estimate(&s);
        }
    }
}
