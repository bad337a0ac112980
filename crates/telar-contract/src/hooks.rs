//! Session callback contracts.
//!
//! The session controller reports outward through two seams: a
//! `SubmitHandler` that receives the assembled value, and `SessionHooks`
//! for per-field change and invalid-data notifications.

use async_trait::async_trait;
use serde_json::Value;
use telar_state::FieldPath;
use thiserror::Error;

/// Failure reported by an external submit handler.
///
/// A failing handler is treated as a failed submission: the session
/// re-enables its fields, clears the loading flag, skips reset, and
/// propagates this error to the caller.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The handler rejected the submission with a message.
    #[error("submit handler failed: {0}")]
    Handler(String),

    /// The handler failed with an underlying error.
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl SubmitError {
    /// Create a handler failure from a message.
    #[inline]
    pub fn handler(message: impl Into<String>) -> Self {
        SubmitError::Handler(message.into())
    }
}

/// Receives the assembled session value when a submission passes validation.
#[async_trait]
pub trait SubmitHandler: Send + Sync {
    /// Handle a validated submission.
    ///
    /// Return `Ok(true)` to signal success (the session resets afterwards
    /// if configured to), `Ok(false)` to accept without reset.
    async fn on_submit(&self, data: Value) -> Result<bool, SubmitError>;
}

/// Per-field notifications from a session. All methods default to no-ops.
pub trait SessionHooks: Send + Sync {
    /// A still-registered field's ledger entry was updated.
    fn on_change(&self, _name: &FieldPath, _value: Option<&Value>, _valid: bool) {}

    /// A submission was rejected; `names` lists the invalid fields in
    /// registry order.
    fn on_invalid_data(&self, _names: &[FieldPath]) {}
}

/// Hooks implementation that ignores every notification.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopHooks;

impl SessionHooks for NoopHooks {}
