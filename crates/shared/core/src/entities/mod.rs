mod asset;
mod market_state;
mod player_state;
mod session;
mod trade;

pub use asset::{AssetId, UnknownAsset};
pub use market_state::{BitcoinCycle, INITIAL_CPI, MarketState};
pub use player_state::PlayerState;
pub use session::{DEFAULT_MAX_ROUNDS, Session, SessionStatus};
pub use trade::{Trade, TradeAction, TradeId};
