use chrono::{Duration, Utc};
use odyssey_core::Timestamp;
use odyssey_ports::Clock;
use std::sync::Arc;
use tokio::sync::watch;

use crate::ticker::ClockTicker;

/// Clock that only moves when told to
///
/// Every change is published on a watch channel, so [`ClockTicker`]s built
/// from it fire deterministically as a test advances time.
pub struct ManualClock {
    time: watch::Sender<Timestamp>,
}

impl ManualClock {
    /// Create a manual clock frozen at `start`
    pub fn new(start: Timestamp) -> Arc<Self> {
        let (time, _) = watch::channel(start);
        Arc::new(Self { time })
    }

    /// Create a manual clock frozen at the current wall time
    pub fn starting_now() -> Arc<Self> {
        Self::new(Utc::now())
    }

    /// Move time forward
    pub fn advance(&self, duration: Duration) {
        self.time.send_modify(|now| *now += duration);
    }

    /// Jump to an explicit time
    ///
    /// Moving backwards is allowed; tickers simply wait for their next deadline again.
    pub fn set_time(&self, time: Timestamp) {
        self.time.send_replace(time);
    }

    /// Receive every time change
    pub fn subscribe(&self) -> watch::Receiver<Timestamp> {
        self.time.subscribe()
    }

    /// Ticker firing once per `period` of manual time
    pub fn ticker(&self, period: Duration) -> ClockTicker {
        ClockTicker::new(self.subscribe(), period)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.time.borrow()
    }

    fn name(&self) -> &str {
        "ManualClock"
    }
}
