pub mod leaderboard;
pub mod memory_store;

pub use leaderboard::InMemoryLeaderboard;
pub use memory_store::InMemorySessionStore;
