//! Per-worker operation outcomes
//!
//! A striped read or write reports an integer status the way the client
//! library does: negative values are negated errno codes, non-negative values
//! are successes whose meaning depends on the operation (bytes transferred for
//! blocking calls, submission status for asynchronous calls).
//!
//! A worker that could not even build its session never reaches the
//! operation, so its outcome is `SetupFailed` rather than a status.

use crate::error::StriperError;

/// Raw status returned by a striped operation
pub type Status = i64;

/// Outcome of one worker's participation in a parallel access
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessResult {
    /// Session creation failed; no operation was attempted
    SetupFailed(StriperError),
    /// The operation ran and returned this status
    Completed(Status),
}

impl AccessResult {
    /// Status of a completed operation, `None` when setup failed
    pub fn status(&self) -> Option<Status> {
        match self {
            AccessResult::Completed(status) => Some(*status),
            AccessResult::SetupFailed(_) => None,
        }
    }

    /// True when the operation ran and reported success
    pub fn is_success(&self) -> bool {
        matches!(self, AccessResult::Completed(status) if *status >= 0)
    }

    /// Setup error, if this worker never got a session
    pub fn setup_error(&self) -> Option<&StriperError> {
        match self {
            AccessResult::SetupFailed(e) => Some(e),
            AccessResult::Completed(_) => None,
        }
    }

    /// Operation failure as an error, if the operation returned a negative status
    pub fn operation_error(&self) -> Option<StriperError> {
        match self {
            AccessResult::Completed(status) if *status < 0 => {
                Some(StriperError::Operation { status: *status })
            }
            _ => None,
        }
    }

    /// Convert into a `Result`: setup failures and negative statuses are errors
    pub fn into_result(self) -> Result<Status, StriperError> {
        match self {
            AccessResult::SetupFailed(e) => Err(e),
            AccessResult::Completed(status) if status < 0 => {
                Err(StriperError::Operation { status })
            }
            AccessResult::Completed(status) => Ok(status),
        }
    }
}
