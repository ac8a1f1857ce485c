use std::time::Duration;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

/// Fixed-period pacing for a single worker. Missed ticks are dropped, not
/// replayed.
pub struct RateLimiter {
    ticker: Option<Interval>,
}

impl RateLimiter {
    /// `None` or a zero interval disables pacing.
    pub fn new(interval: Option<Duration>) -> Self {
        let ticker = interval.filter(|period| !period.is_zero()).map(|period| {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            ticker
        });
        Self { ticker }
    }

    /// Cancel safe.
    pub async fn wait(&mut self) {
        if let Some(ticker) = self.ticker.as_mut() {
            ticker.tick().await;
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.ticker.is_some()
    }
}
