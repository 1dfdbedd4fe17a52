use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Asset price in dollars
pub type Price = f64;

/// Units of an asset held or traded (fractional units allowed)
pub type Quantity = f64;

/// Dollar amount (cash, trade notional, portfolio value)
pub type Amount = f64;

/// Timestamp in UTC
pub type Timestamp = DateTime<Utc>;

/// Identifier of a classroom game session
pub type SessionId = Uuid;

/// Identifier of a student participant
pub type StudentId = String;

/// Identifier of a class section
pub type SectionId = String;

/// Quantities and amounts closer than this are treated as equal
pub const EPSILON: f64 = 1e-6;

/// Cash every player starts the game with
pub const STARTING_CASH: Amount = 10_000.0;

/// Owner id under which the instructor writes the authoritative market record
pub const AUTHORITATIVE_OWNER: &str = "TA_DEFAULT";
