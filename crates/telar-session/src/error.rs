//! Error types for session operations.
//!
//! The coordination protocol itself is exception-free: missing fields are
//! no-ops and validation failures surface as invalid-name lists. The only
//! fallible seam is the external submit handler.

use telar_contract::SubmitError;
use thiserror::Error;

/// Result type alias for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors that can escape a session controller.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The external submit handler failed. Fields were re-enabled and the
    /// loading flag cleared before this was propagated; no reset ran.
    #[error(transparent)]
    Submit(#[from] SubmitError),
}
