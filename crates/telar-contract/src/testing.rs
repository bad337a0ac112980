//! Shared test fixtures for crates that depend on `telar-contract`.
//!
//! Gated behind the `test-support` cargo feature so production builds are
//! unaffected. Enable via
//! `[dev-dependencies] telar-contract = { ..., features = ["test-support"] }`.

use crate::{CheckMode, FieldCapabilities, FieldHandle, SessionHooks, SubmitError, SubmitHandler};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use telar_state::FieldPath;

type Validator = Box<dyn Fn(Option<&Value>) -> bool + Send + Sync>;

/// A scriptable field handle that counts every call it receives.
///
/// The counters exist so tests can assert that change detection suppressed
/// redundant `set_value`/`check` rounds.
pub struct StubField {
    name: String,
    caps: FieldCapabilities,
    initial: Option<Value>,
    value: Mutex<Option<Value>>,
    validator: Option<Validator>,
    set_value_calls: AtomicUsize,
    check_calls: AtomicUsize,
    reset_calls: AtomicUsize,
    disabled: Mutex<Option<bool>>,
}

impl StubField {
    /// Create a stub with no value and no validator.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            caps: FieldCapabilities::default(),
            initial: None,
            value: Mutex::new(None),
            validator: None,
            set_value_calls: AtomicUsize::new(0),
            check_calls: AtomicUsize::new(0),
            reset_calls: AtomicUsize::new(0),
            disabled: Mutex::new(None),
        }
    }

    /// Set the initial value (also the value `reset` restores).
    pub fn with_value(mut self, value: Value) -> Self {
        self.initial = Some(value.clone());
        self.value = Mutex::new(Some(value));
        self
    }

    /// Install a validator over the candidate value.
    pub fn with_validator(
        mut self,
        validator: impl Fn(Option<&Value>) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.validator = Some(Box::new(validator));
        self
    }

    /// Install a validator that accepts everything.
    pub fn always_valid(self) -> Self {
        self.with_validator(|_| true)
    }

    /// Mark the stub as a whole-object field.
    pub fn object(mut self) -> Self {
        self.caps = self.caps.object();
        self
    }

    /// Exclude the stub from reset-after-submit.
    pub fn skip_reset_on_submit(mut self) -> Self {
        self.caps = self.caps.skip_reset_on_submit();
        self
    }

    /// Current stored value.
    pub fn current(&self) -> Option<Value> {
        self.value.lock().unwrap().clone()
    }

    /// Number of `set_value` calls received.
    pub fn set_value_calls(&self) -> usize {
        self.set_value_calls.load(Ordering::SeqCst)
    }

    /// Number of `check` calls received.
    pub fn check_calls(&self) -> usize {
        self.check_calls.load(Ordering::SeqCst)
    }

    /// Number of `reset` calls received.
    pub fn reset_calls(&self) -> usize {
        self.reset_calls.load(Ordering::SeqCst)
    }

    /// Last disabled flag forwarded to the field, if any.
    pub fn last_disabled(&self) -> Option<bool> {
        *self.disabled.lock().unwrap()
    }
}

#[async_trait]
impl FieldHandle for StubField {
    fn name(&self) -> String {
        self.name.clone()
    }

    async fn value(&self) -> Option<Value> {
        self.value.lock().unwrap().clone()
    }

    fn set_value(&self, value: Value) {
        self.set_value_calls.fetch_add(1, Ordering::SeqCst);
        *self.value.lock().unwrap() = Some(value);
    }

    async fn check(&self, candidate: Option<Value>, _mode: CheckMode) -> Option<bool> {
        self.check_calls.fetch_add(1, Ordering::SeqCst);
        self.validator.as_ref().map(|v| v(candidate.as_ref()))
    }

    fn reset(&self) {
        self.reset_calls.fetch_add(1, Ordering::SeqCst);
        *self.value.lock().unwrap() = self.initial.clone();
    }

    fn set_disabled(&self, disabled: bool) {
        *self.disabled.lock().unwrap() = Some(disabled);
    }

    fn capabilities(&self) -> FieldCapabilities {
        self.caps
    }
}

/// Hooks implementation that records every notification.
#[derive(Default)]
pub struct RecordingHooks {
    changes: Mutex<Vec<(FieldPath, Option<Value>, bool)>>,
    invalid_batches: Mutex<Vec<Vec<FieldPath>>>,
}

impl RecordingHooks {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// All `on_change` notifications received so far.
    pub fn changes(&self) -> Vec<(FieldPath, Option<Value>, bool)> {
        self.changes.lock().unwrap().clone()
    }

    /// All `on_invalid_data` batches received so far.
    pub fn invalid_batches(&self) -> Vec<Vec<FieldPath>> {
        self.invalid_batches.lock().unwrap().clone()
    }
}

impl SessionHooks for RecordingHooks {
    fn on_change(&self, name: &FieldPath, value: Option<&Value>, valid: bool) {
        self.changes
            .lock()
            .unwrap()
            .push((name.clone(), value.cloned(), valid));
    }

    fn on_invalid_data(&self, names: &[FieldPath]) {
        self.invalid_batches.lock().unwrap().push(names.to_vec());
    }
}

/// Scripted outcome for [`StubSubmitHandler`].
#[derive(Clone, Debug)]
pub enum SubmitScript {
    /// Resolve with the given acceptance flag.
    Accept(bool),
    /// Fail with a handler error.
    Fail(String),
}

/// Submit handler that records submissions and resolves per script.
pub struct StubSubmitHandler {
    script: SubmitScript,
    submitted: Mutex<Vec<Value>>,
}

impl StubSubmitHandler {
    /// Handler that resolves `Ok(accepted)`.
    pub fn accepting(accepted: bool) -> Self {
        Self {
            script: SubmitScript::Accept(accepted),
            submitted: Mutex::new(Vec::new()),
        }
    }

    /// Handler that fails every submission.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            script: SubmitScript::Fail(message.into()),
            submitted: Mutex::new(Vec::new()),
        }
    }

    /// Every assembled value the handler has received.
    pub fn submitted(&self) -> Vec<Value> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl SubmitHandler for StubSubmitHandler {
    async fn on_submit(&self, data: Value) -> Result<bool, SubmitError> {
        self.submitted.lock().unwrap().push(data);
        match &self.script {
            SubmitScript::Accept(accepted) => Ok(*accepted),
            SubmitScript::Fail(message) => Err(SubmitError::handler(message.clone())),
        }
    }
}
