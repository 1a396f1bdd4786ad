mod controller;
mod runner;
mod state;

use thiserror::Error;
use uuid::Uuid;

pub use controller::{ScanController, ScanHandle};
pub use state::{FailReason, ScanPhase, ScanSession};

/// Caller-side validation errors. These are rejected synchronously before
/// any session object exists; they are not session failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScanError {
    #[error("no profile selected")]
    NoProfileSelected,
    #[error("scale reads {grams:.0}g, below the {min:.0}g minimum to start a scan")]
    WeightBelowMinimum { grams: f64, min: f64 },
    #[error("session {0} is not the active session")]
    SessionNotActive(Uuid),
}
