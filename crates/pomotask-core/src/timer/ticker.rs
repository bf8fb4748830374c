//! The countdown's only suspension point.

use std::time::Duration;

use async_trait::async_trait;

/// Waits out one tick of the countdown.
///
/// Production code sleeps on the tokio clock; tests either pause that clock
/// or supply their own ticker to drive the countdown step by step.
#[async_trait]
pub trait Ticker: Send + Sync {
    async fn tick(&self);
}

/// Sleeps a fixed period on the tokio timer.
#[derive(Debug, Clone, Copy)]
pub struct TokioTicker {
    period: Duration,
}

impl TokioTicker {
    pub fn new(period: Duration) -> Self {
        Self { period }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }
}

impl Default for TokioTicker {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

#[async_trait]
impl Ticker for TokioTicker {
    async fn tick(&self) {
        tokio::time::sleep(self.period).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn tick_waits_one_period() {
        let ticker = TokioTicker::default();
        let before = tokio::time::Instant::now();
        ticker.tick().await;
        let elapsed = before.elapsed();
        assert!(elapsed >= Duration::from_secs(1));
        assert!(elapsed < Duration::from_millis(1010));
    }
}
