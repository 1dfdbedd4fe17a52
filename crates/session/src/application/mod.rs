pub mod instructor;
pub mod reconciler;
pub mod round_machine;
pub mod student;

pub use instructor::InstructorConsole;
pub use reconciler::{DEFAULT_POLL_INTERVAL, ReconcilerConfig, SessionReconciler, SyncPhase};
pub use round_machine::{RoundMachine, RoundTransition};
pub use student::{StudentClient, StudentSettings};
