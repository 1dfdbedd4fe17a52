//! Odyssey Session
//!
//! Round-synchronized classroom sessions. One instructor drives the rounds;
//! every student follows by polling the shared store.
//!
//! ```text
//!  InstructorConsole                SessionStore                 StudentClient (×N)
//!  ─────────────────               ──────────────               ──────────────────
//!  advance_round ──CAS──────────►  Session {round, version}
//!                ──put(round,TA)─► MarketState[round][TA] ◄──── poll (SessionReconciler)
//!                                  PlayerState[student]   ◄──── trade / inject / flush
//!  end_game (gaps only) ────────►  Leaderboard            ◄──── game over (own summary)
//! ```
//!
//! The store is the only coordination point: clients share no memory, and
//! only the instructor writes authoritative market records.

// Application layer
pub mod application;

// Infrastructure layer
pub mod infrastructure;

// Cross-cutting concerns
pub mod error;
pub mod model;

// Re-export main types for convenience
pub use application::{
    DEFAULT_POLL_INTERVAL, InstructorConsole, ReconcilerConfig, RoundMachine, RoundTransition,
    SessionReconciler, StudentClient, StudentSettings, SyncPhase,
};
pub use error::{Result, SessionError};
pub use infrastructure::{InMemoryLeaderboard, InMemorySessionStore};
pub use model::{GameSummary, SyncOutcome};
