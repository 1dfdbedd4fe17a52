//! Round state machine
//!
//! ```text
//!            advance                 advance (round == max)
//! Created ─────────────► InProgress ─────────────────────────► Completed
//!    │                    │   ▲   │                                ▲
//!    │                    │   └───┘ advance (round < max)          │
//!    └────────────────────┴────────────── end ─────────────────────┘
//! ```
//!
//! Pure decisions only; the instructor console performs the writes.

use odyssey_core::{Session, SessionStatus, Timestamp};

use crate::error::{Result, SessionError};

/// Outcome of a valid transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundTransition {
    /// A new round begins and needs a new market
    Advanced { from: u32, to: u32 },
    /// The game ends at `final_round`; the market is frozen
    Completed { final_round: u32 },
}

pub struct RoundMachine;

impl RoundMachine {
    /// Decide what advancing the session means
    pub fn advance(session: &Session) -> Result<RoundTransition> {
        if session.status.is_terminal() {
            return Err(SessionError::InvalidTransition {
                action: "advance",
                status: session.status,
            });
        }

        if session.current_round >= session.max_rounds {
            Ok(RoundTransition::Completed {
                final_round: session.current_round,
            })
        } else {
            Ok(RoundTransition::Advanced {
                from: session.current_round,
                to: session.current_round + 1,
            })
        }
    }

    /// End the game early
    pub fn end(session: &Session) -> Result<RoundTransition> {
        if session.status.is_terminal() {
            return Err(SessionError::InvalidTransition {
                action: "end",
                status: session.status,
            });
        }

        Ok(RoundTransition::Completed {
            final_round: session.current_round,
        })
    }

    /// Copy of the session with the transition applied
    pub fn apply(session: &Session, transition: RoundTransition, now: Timestamp) -> Session {
        let mut next = session.clone();
        match transition {
            RoundTransition::Advanced { to, .. } => {
                next.current_round = to;
                next.status = SessionStatus::InProgress;
            }
            RoundTransition::Completed { final_round } => {
                next.current_round = final_round;
                next.status = SessionStatus::Completed;
            }
        }
        next.updated_at = now;
        next
    }
}
