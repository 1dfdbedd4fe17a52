use async_trait::async_trait;
use odyssey_core::Timestamp;

/// Port for periodic scheduling
///
/// Polling loops wait on a ticker instead of sleeping directly, so the
/// same loop can run on a real interval or on a manually driven clock.
#[async_trait]
pub trait Ticker: Send {
    /// Wait for the next tick and return the time it fired at
    ///
    /// Returns `None` once the underlying time source is gone; the
    /// caller should stop looping.
    async fn tick(&mut self) -> Option<Timestamp>;
}
