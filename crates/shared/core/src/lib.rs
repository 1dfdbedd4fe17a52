//! Odyssey Core Domain
//!
//! Pure domain types for the Investment Odyssey classroom game.
//! This crate contains no async, no I/O, and is 100% unit testable.
//!
//! - [`MarketState`]: prices, history and CPI for one round
//! - [`PlayerState`]: one student's cash, holdings and trade history
//! - [`Session`]: the round counter and status an instructor drives

pub mod entities;
pub mod values;

// Re-export commonly used types at crate root
pub use entities::{
    AssetId, BitcoinCycle, DEFAULT_MAX_ROUNDS, INITIAL_CPI, MarketState, PlayerState, Session,
    SessionStatus, Trade, TradeAction, TradeId, UnknownAsset,
};
pub use values::{
    AUTHORITATIVE_OWNER, Amount, EPSILON, Price, Quantity, STARTING_CASH, SectionId, SessionId,
    StudentId, Timestamp,
};
