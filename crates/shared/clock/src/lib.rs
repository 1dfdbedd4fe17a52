//! Odyssey Clock Infrastructure
//!
//! Time and scheduling for classroom sessions:
//!
//! ```text
//! Clock (port)                     Ticker (port)
//!   ├── SystemClock (live)           ├── IntervalTicker (tokio interval)
//!   └── ManualClock (tests) ───────► └── ClockTicker (fires as ManualClock advances)
//!
//! ScheduledTask = Ticker + CancellationToken + callback per tick
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use odyssey_clock::{ManualClock, ScheduledTask};
//! use chrono::Duration;
//! use std::ops::ControlFlow;
//!
//! let clock = ManualClock::starting_now();
//! let task = ScheduledTask::spawn("poll", clock.ticker(Duration::seconds(5)), |now| async move {
//!     println!("tick at {now}");
//!     ControlFlow::Continue(())
//! });
//!
//! clock.advance(Duration::seconds(5)); // second tick
//! task.shutdown().await;
//! ```

mod manual;
mod system;
mod task;
mod ticker;

pub use manual::ManualClock;
pub use system::SystemClock;
pub use task::{CancellationToken, ScheduledTask};
pub use ticker::{ClockTicker, IntervalTicker};

// Re-export the ports for convenience
pub use odyssey_ports::{Clock, Ticker};
