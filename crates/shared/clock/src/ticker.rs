use async_trait::async_trait;
use chrono::Duration;
use odyssey_core::Timestamp;
use odyssey_ports::{Clock, Ticker};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::{Interval, MissedTickBehavior};

/// Ticker on a real tokio interval
///
/// Fires immediately, then once per period. Missed ticks are delayed rather
/// than burst, so a slow poll never triggers a catch-up storm. Under
/// `tokio::time::pause` it runs on virtual time.
pub struct IntervalTicker {
    interval: Interval,
    clock: Arc<dyn Clock>,
}

impl IntervalTicker {
    pub fn new(period: std::time::Duration, clock: Arc<dyn Clock>) -> Self {
        let period = period.max(std::time::Duration::from_millis(1));
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval, clock }
    }
}

#[async_trait]
impl Ticker for IntervalTicker {
    async fn tick(&mut self) -> Option<Timestamp> {
        self.interval.tick().await;
        Some(self.clock.now())
    }
}

/// Ticker driven by a [`ManualClock`](crate::ManualClock)
///
/// Fires on its first call, then each time the clock reaches the next
/// deadline. Jumping several periods at once yields a single tick.
pub struct ClockTicker {
    time: watch::Receiver<Timestamp>,
    period: Duration,
    next_deadline: Option<Timestamp>,
}

impl ClockTicker {
    pub fn new(time: watch::Receiver<Timestamp>, period: Duration) -> Self {
        Self {
            time,
            period,
            next_deadline: None,
        }
    }
}

#[async_trait]
impl Ticker for ClockTicker {
    async fn tick(&mut self) -> Option<Timestamp> {
        loop {
            let now = *self.time.borrow_and_update();
            let due = self.next_deadline.is_none_or(|deadline| now >= deadline);
            if due {
                self.next_deadline = Some(now + self.period);
                return Some(now);
            }

            // Clock dropped
            if self.time.changed().await.is_err() {
                return None;
            }
        }
    }
}
