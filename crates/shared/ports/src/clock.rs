use odyssey_core::Timestamp;

/// Port for time abstraction
///
/// Lets sessions and trades be stamped by:
/// - Real system time in a live classroom
/// - A manually advanced clock in deterministic tests
pub trait Clock: Send + Sync {
    /// Get the current time according to this clock
    fn now(&self) -> Timestamp;

    /// Get the clock's name/identifier for debugging
    fn name(&self) -> &str {
        "Clock"
    }
}
