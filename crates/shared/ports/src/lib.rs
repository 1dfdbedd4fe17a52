//! Odyssey Ports
//!
//! Port definitions (traits) for the Investment Odyssey engine.
//! These define the boundaries between game logic and infrastructure:
//! time, scheduling, the shared session store and the leaderboard.

mod clock;
mod error;
mod leaderboard;
mod store;
mod ticker;

pub use clock::Clock;
pub use error::{StoreError, StoreResult};
pub use leaderboard::{Leaderboard, LeaderboardEntry};
pub use store::{ParticipantSummary, SessionStore};
pub use ticker::Ticker;
