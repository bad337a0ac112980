//! Field handle contract.
//!
//! A `FieldHandle` is the capability set an input component exposes to a
//! form session: identity, async value access, mutation, and the optional
//! behaviors (validation, reset, disable). Optional behaviors are defaulted
//! trait methods rather than presence checks scattered through call sites.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How a validity check is being invoked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckMode {
    /// Bookkeeping check: the field must not surface visible error state.
    /// Used at subscribe time and during bulk value propagation.
    Passive,
    /// Committing check during aggregation: the field may update its own
    /// visible error state.
    Committing,
}

impl CheckMode {
    /// Returns true for a committing check.
    #[inline]
    pub fn is_committing(self) -> bool {
        matches!(self, CheckMode::Committing)
    }
}

/// Static flags a field declares about itself.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FieldCapabilities {
    /// The field edits a whole sub-object, not a scalar leaf. Bulk value
    /// propagation hands it the entire top-level value instead of
    /// flattening into leaves.
    pub object: bool,
    /// Leave this field untouched during `reset()`: no reset side effect,
    /// no re-validation, ledger entry unchanged.
    pub skip_reset_on_submit: bool,
}

impl FieldCapabilities {
    /// Capabilities with no flags set.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the field as editing a whole sub-object.
    #[inline]
    pub fn object(mut self) -> Self {
        self.object = true;
        self
    }

    /// Exclude the field from reset-after-submit.
    #[inline]
    pub fn skip_reset_on_submit(mut self) -> Self {
        self.skip_reset_on_submit = true;
        self
    }
}

/// The capability contract an input component exposes to a session.
///
/// Required: identity, value access, value mutation. Everything else has a
/// default: `check` returns `None` ("no validator" — the session records
/// such a field as invalid), and `reset`/`set_disabled` are no-ops, which
/// the session silently skips.
///
/// Handles are registered on mount and deregistered on unmount; the session
/// holds a non-owning `Arc` reference only for the duration of the
/// subscription.
///
/// # Example
///
/// ```
/// use async_trait::async_trait;
/// use serde_json::Value;
/// use std::sync::Mutex;
/// use telar_contract::{CheckMode, FieldHandle};
///
/// struct AgeField {
///     value: Mutex<Value>,
/// }
///
/// #[async_trait]
/// impl FieldHandle for AgeField {
///     fn name(&self) -> String {
///         "age".into()
///     }
///
///     async fn value(&self) -> Option<Value> {
///         Some(self.value.lock().unwrap().clone())
///     }
///
///     fn set_value(&self, value: Value) {
///         *self.value.lock().unwrap() = value;
///     }
///
///     async fn check(&self, candidate: Option<Value>, _mode: CheckMode) -> Option<bool> {
///         Some(candidate.and_then(|v| v.as_i64()).is_some_and(|age| age >= 18))
///     }
/// }
/// ```
#[async_trait]
pub trait FieldHandle: Send + Sync {
    /// The field's dotted identifier. An empty identity makes subscribe a
    /// silent no-op.
    fn name(&self) -> String;

    /// Current value of the field. `None` means the field has no value yet;
    /// aggregation writes it as an empty-string leaf.
    async fn value(&self) -> Option<Value>;

    /// Push a value into the field.
    fn set_value(&self, value: Value);

    /// Validate a candidate value.
    ///
    /// The default returns `None`, meaning the field has no validator; the
    /// session ledger records that as invalid. `candidate` is `None` for
    /// the initial subscribe-time check.
    async fn check(&self, _candidate: Option<Value>, _mode: CheckMode) -> Option<bool> {
        None
    }

    /// Reset side effect. Default: nothing.
    fn reset(&self) {}

    /// Enable/disable side effect. Default: nothing.
    fn set_disabled(&self, _disabled: bool) {}

    /// Static flags for this field.
    fn capabilities(&self) -> FieldCapabilities {
        FieldCapabilities::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Bare;

    #[async_trait]
    impl FieldHandle for Bare {
        fn name(&self) -> String {
            "bare".into()
        }

        async fn value(&self) -> Option<Value> {
            None
        }

        fn set_value(&self, _value: Value) {}
    }

    #[tokio::test]
    async fn defaults_mean_no_validator_and_no_side_effects() {
        let field = Bare;
        assert_eq!(field.check(None, CheckMode::Passive).await, None);
        assert_eq!(field.capabilities(), FieldCapabilities::default());
        // No-ops must not panic.
        field.reset();
        field.set_disabled(true);
    }

    #[test]
    fn capabilities_builder() {
        let caps = FieldCapabilities::new().object().skip_reset_on_submit();
        assert!(caps.object);
        assert!(caps.skip_reset_on_submit);
    }

    #[test]
    fn check_mode_serde_and_flag() {
        assert!(CheckMode::Committing.is_committing());
        assert!(!CheckMode::Passive.is_committing());
        let json = serde_json::to_string(&CheckMode::Passive).unwrap();
        assert_eq!(json, "\"passive\"");
    }
}
