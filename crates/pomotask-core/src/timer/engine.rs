//! Countdown engine.
//!
//! The engine owns no state of its own beyond the local seconds counter. It
//! publishes each new remaining time through a [`CountdownHost`] and waits on
//! a [`Ticker`] between publications. Cancellation is cooperative: the host
//! refuses a publication or the completion once the session is no longer
//! active, and the engine gives up at that tick boundary.
//!
//! ## Timeline for `count_down(host, ticker, 3)`
//!
//! ```text
//! publish 3 -> tick -> publish 2 -> tick -> publish 1 -> tick -> publish 0
//!           -> tick -> complete -> Completed
//! ```
//!
//! The final `0` stays on display for a whole tick before the interval ends.

use serde::{Deserialize, Serialize};

use super::ticker::Ticker;
use crate::error::Result;

/// How a countdown ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalOutcome {
    /// Counted past zero.
    Completed,
    /// The session went inactive before the countdown finished.
    Interrupted,
}

impl IntervalOutcome {
    pub fn is_interrupted(&self) -> bool {
        matches!(self, IntervalOutcome::Interrupted)
    }
}

/// The state a countdown reads and writes.
///
/// Both methods must be atomic with respect to whatever ends the session, so
/// that nothing is published or completed after the session went inactive.
pub trait CountdownHost {
    /// Publish `seconds` as the remaining time. Returns `false`, publishing
    /// nothing, when the session is no longer active.
    fn publish_if_active(&self, seconds: u32) -> bool;

    /// Apply the end of the interval. Returns `Ok(false)`, changing nothing,
    /// when the session is no longer active.
    fn complete_if_active(&self) -> Result<bool>;
}

/// Count `seconds` down to zero, one tick at a time.
///
/// # Errors
/// Propagates a failure of [`CountdownHost::complete_if_active`].
pub async fn count_down<H, T>(host: &H, ticker: &T, seconds: u32) -> Result<IntervalOutcome>
where
    H: CountdownHost + ?Sized,
    T: Ticker + ?Sized,
{
    if !host.publish_if_active(seconds) {
        return Ok(IntervalOutcome::Interrupted);
    }

    let mut remaining = seconds;
    loop {
        ticker.tick().await;

        if remaining == 0 {
            return Ok(if host.complete_if_active()? {
                IntervalOutcome::Completed
            } else {
                IntervalOutcome::Interrupted
            });
        }

        remaining -= 1;
        if !host.publish_if_active(remaining) {
            tracing::debug!(remaining = remaining + 1, "countdown interrupted");
            return Ok(IntervalOutcome::Interrupted);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct Host {
        active: AtomicBool,
        published: Mutex<Vec<u32>>,
        completions: AtomicUsize,
    }

    impl Host {
        fn new() -> Self {
            Self {
                active: AtomicBool::new(true),
                published: Mutex::new(Vec::new()),
                completions: AtomicUsize::new(0),
            }
        }

        fn is_active(&self) -> bool {
            self.active.load(Ordering::SeqCst)
        }

        fn published(&self) -> Vec<u32> {
            self.published.lock().unwrap().clone()
        }
    }

    impl CountdownHost for Host {
        fn publish_if_active(&self, seconds: u32) -> bool {
            if !self.is_active() {
                return false;
            }
            self.published.lock().unwrap().push(seconds);
            true
        }

        fn complete_if_active(&self) -> Result<bool> {
            if !self.is_active() {
                return Ok(false);
            }
            self.completions.fetch_add(1, Ordering::SeqCst);
            Ok(true)
        }
    }

    /// Counts ticks and optionally ends the session once a given time has
    /// been on display.
    struct ScriptedTicker<'a> {
        host: &'a Host,
        ticks: AtomicUsize,
        stop_at: Option<u32>,
    }

    #[async_trait]
    impl Ticker for ScriptedTicker<'_> {
        async fn tick(&self) {
            self.ticks.fetch_add(1, Ordering::SeqCst);
            if let Some(stop) = self.stop_at {
                if self.host.published().last() == Some(&stop) {
                    self.host.active.store(false, Ordering::SeqCst);
                }
            }
        }
    }

    #[tokio::test]
    async fn publishes_each_second_then_completes() {
        let host = Host::new();
        let ticker = ScriptedTicker {
            host: &host,
            ticks: AtomicUsize::new(0),
            stop_at: None,
        };

        let outcome = count_down(&host, &ticker, 3).await.unwrap();

        assert_eq!(outcome, IntervalOutcome::Completed);
        assert_eq!(host.published(), vec![3, 2, 1, 0]);
        assert_eq!(host.completions.load(Ordering::SeqCst), 1);
        // one extra tick keeps 0 on display
        assert_eq!(ticker.ticks.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn interrupt_stops_at_next_boundary() {
        let host = Host::new();
        let ticker = ScriptedTicker {
            host: &host,
            ticks: AtomicUsize::new(0),
            stop_at: Some(10),
        };

        let outcome = count_down(&host, &ticker, 15).await.unwrap();

        assert_eq!(outcome, IntervalOutcome::Interrupted);
        assert_eq!(host.published(), vec![15, 14, 13, 12, 11, 10]);
        assert_eq!(ticker.ticks.load(Ordering::SeqCst), 6);
    }

    #[tokio::test]
    async fn interrupt_while_zero_is_showing() {
        let host = Host::new();
        let ticker = ScriptedTicker {
            host: &host,
            ticks: AtomicUsize::new(0),
            stop_at: Some(0),
        };

        assert_eq!(
            count_down(&host, &ticker, 1).await.unwrap(),
            IntervalOutcome::Interrupted
        );
        assert_eq!(host.published(), vec![1, 0]);
        assert_eq!(host.completions.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn inactive_host_never_ticks() {
        let host = Host::new();
        host.active.store(false, Ordering::SeqCst);
        let ticker = ScriptedTicker {
            host: &host,
            ticks: AtomicUsize::new(0),
            stop_at: None,
        };

        assert!(count_down(&host, &ticker, 5).await.unwrap().is_interrupted());
        assert!(host.published().is_empty());
        assert_eq!(ticker.ticks.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn completion_failure_propagates() {
        struct FailingHost;

        impl CountdownHost for FailingHost {
            fn publish_if_active(&self, _seconds: u32) -> bool {
                true
            }

            fn complete_if_active(&self) -> Result<bool> {
                Err(crate::error::CoreError::Io(std::io::Error::other("disk gone")))
            }
        }

        let host = Host::new();
        let ticker = ScriptedTicker {
            host: &host,
            ticks: AtomicUsize::new(0),
            stop_at: None,
        };
        assert!(count_down(&FailingHost, &ticker, 1).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_ticker_spaces_publications_one_second_apart() {
        let host = Host::new();
        let ticker = crate::timer::TokioTicker::default();
        let start = tokio::time::Instant::now();

        assert_eq!(
            count_down(&host, &ticker, 2).await.unwrap(),
            IntervalOutcome::Completed
        );
        assert_eq!(host.published(), vec![2, 1, 0]);
        assert!(start.elapsed() >= std::time::Duration::from_secs(3));
    }
}
