//! Session controller: the submit/reset/bulk-set lifecycle over one
//! registry.
//!
//! All registry, ledger, and session-value mutation happens under a single
//! async mutex. Per-field awaits (value pulls, validity checks, the submit
//! handler) run off-lock against snapshots taken at the start of each walk,
//! and every post-await ledger write re-checks registry membership — a
//! field unsubscribing mid-walk degrades to a no-op, never a panic.

use crate::aggregate::{aggregate, collect_raw, AggregationResult};
use crate::error::{SessionError, SessionResult};
use crate::registry::{SessionRegistry, ValidityLedger};
use serde_json::Value;
use std::sync::Arc;
use telar_contract::{CheckMode, FieldHandle, NoopHooks, SessionHooks, SubmitHandler};
use telar_state::{flatten, resolve, FieldPath};
use tokio::sync::Mutex;
use tracing::{debug, trace, warn};
use uuid::Uuid;

/// What a call to [`SessionController::submit`] did.
#[derive(Clone, Debug, PartialEq)]
pub enum SubmitOutcome {
    /// No submit handler is configured; nothing ran.
    Skipped,
    /// Aggregation failed; the invalid paths were reported to the hooks in
    /// registry order. Loading/disabled state untouched.
    Rejected {
        /// Invalid field paths, in subscription order.
        invalid: Vec<FieldPath>,
    },
    /// The handler ran to completion.
    Completed {
        /// The handler's acceptance flag.
        accepted: bool,
        /// Whether the session reset afterwards.
        reset: bool,
    },
}

struct SessionState {
    registry: SessionRegistry,
    ledger: ValidityLedger,
    value: Value,
    loaded: bool,
    submit_disabled: bool,
    loading: bool,
    disabled_all: bool,
}

impl SessionState {
    fn recompute_gating(&mut self) {
        self.submit_disabled = self.ledger.has_invalid();
    }
}

struct Inner {
    id: String,
    reset_after_submit: bool,
    id_key: Option<String>,
    submit_handler: Option<Arc<dyn SubmitHandler>>,
    hooks: Arc<dyn SessionHooks>,
    state: Mutex<SessionState>,
}

/// Coordinates one form session: fields subscribe and unsubscribe, bulk
/// values propagate in, and submission is gated on the validity ledger.
///
/// The controller is a cheap handle (`Arc` inner); clone it freely and hand
/// clones to whoever needs the upward surface. There is deliberately no
/// process-global slot — the owning caller holds the handle.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use serde_json::json;
/// use telar_session::SessionController;
///
/// # async fn demo(field: Arc<dyn telar_contract::FieldHandle>) {
/// let session = SessionController::builder()
///     .value(json!({"name": "", "age": 0}))
///     .build();
///
/// session.subscribe(field).await;
/// session.set_values(json!({"name": "Al", "age": 20})).await;
/// assert!(!session.submit_disabled().await);
/// # }
/// ```
#[derive(Clone)]
pub struct SessionController {
    inner: Arc<Inner>,
}

/// Builder for [`SessionController`].
pub struct SessionControllerBuilder {
    value: Value,
    reset_after_submit: bool,
    id_key: Option<String>,
    submit_handler: Option<Arc<dyn SubmitHandler>>,
    hooks: Arc<dyn SessionHooks>,
}

impl Default for SessionControllerBuilder {
    fn default() -> Self {
        Self {
            value: Value::Object(Default::default()),
            reset_after_submit: true,
            id_key: None,
            submit_handler: None,
            hooks: Arc::new(NoopHooks),
        }
    }
}

impl SessionControllerBuilder {
    /// Initial session value the form edits.
    pub fn value(mut self, value: Value) -> Self {
        self.value = value;
        self
    }

    /// Reset fields after an accepted submission (default: true).
    pub fn reset_after_submit(mut self, reset: bool) -> Self {
        self.reset_after_submit = reset;
        self
    }

    /// Top-level key that identifies the record being edited.
    pub fn id_key(mut self, key: impl Into<String>) -> Self {
        self.id_key = Some(key.into());
        self
    }

    /// External submit handler. Without one, `submit()` is a no-op.
    pub fn submit_handler(mut self, handler: Arc<dyn SubmitHandler>) -> Self {
        self.submit_handler = Some(handler);
        self
    }

    /// Per-field change / invalid-data hooks.
    pub fn hooks(mut self, hooks: Arc<dyn SessionHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Build the controller.
    pub fn build(self) -> SessionController {
        SessionController {
            inner: Arc::new(Inner {
                id: Uuid::new_v4().to_string(),
                reset_after_submit: self.reset_after_submit,
                id_key: self.id_key,
                submit_handler: self.submit_handler,
                hooks: self.hooks,
                state: Mutex::new(SessionState {
                    registry: SessionRegistry::new(),
                    ledger: ValidityLedger::new(),
                    value: self.value,
                    loaded: false,
                    // Disabled until a first check proves otherwise.
                    submit_disabled: true,
                    loading: false,
                    disabled_all: false,
                }),
            }),
        }
    }
}

impl SessionController {
    /// Start building a controller.
    pub fn builder() -> SessionControllerBuilder {
        SessionControllerBuilder::default()
    }

    /// Unique id of this session.
    pub fn session_id(&self) -> &str {
        &self.inner.id
    }

    // ===== Registry lifecycle =====

    /// Register a field for this session.
    ///
    /// A handle reporting an empty identity is ignored. The field's passive
    /// check runs immediately and seeds the ledger (no validator counts as
    /// invalid); if the session has already completed its first bulk load,
    /// the matching session-value leaf is propagated into the field right
    /// away, so late joiners catch up.
    pub async fn subscribe(&self, handle: Arc<dyn FieldHandle>) {
        let path = FieldPath::parse(&handle.name());
        if path.is_empty() {
            trace!(session = %self.inner.id, "ignoring field with empty identity");
            return;
        }

        {
            let mut state = self.inner.state.lock().await;
            state.registry.insert(path.clone(), Arc::clone(&handle));
            state.ledger.insert(path.clone(), false);
        }

        let valid = handle
            .check(None, CheckMode::Passive)
            .await
            .unwrap_or(false);

        let loaded = {
            let mut state = self.inner.state.lock().await;
            if !state.ledger.record(&path, valid) {
                // Unsubscribed while the check was in flight.
                return;
            }
            state.recompute_gating();
            state.loaded
        };
        debug!(session = %self.inner.id, field = %path, valid, "field subscribed");
        self.inner.hooks.on_change(&path, None, valid);

        if loaded {
            let source = self.inner.state.lock().await.value.clone();
            self.set_field_value(&path, &source).await;
        }
    }

    /// Deregister a field. No-op if the path is not registered.
    ///
    /// Gating is recomputed: an invalid field vanishing from the ledger
    /// re-enables submission immediately rather than on the next unrelated
    /// change.
    pub async fn unsubscribe(&self, path: &FieldPath) {
        let mut state = self.inner.state.lock().await;
        if state.registry.remove(path).is_some() {
            state.ledger.remove(path);
            state.recompute_gating();
            debug!(session = %self.inner.id, field = %path, "field unsubscribed");
        }
    }

    // ===== Bulk value propagation =====

    /// Replace the session value and propagate it into registered fields.
    ///
    /// Object-valued top-level keys are flattened into leaves unless the
    /// key's own handle is a whole-object field. Each leaf with a
    /// registered handle is compared (deep equality) against the field's
    /// live value; only a genuine change triggers `set_value`, a passive
    /// re-check, and a ledger update. Unregistered leaves are skipped.
    /// Marks the session loaded.
    pub async fn set_values(&self, new_value: Value) {
        {
            let mut state = self.inner.state.lock().await;
            state.value = new_value.clone();
        }

        if let Value::Object(map) = &new_value {
            for (key, key_value) in map {
                let key_path = FieldPath::parse(key);
                let object_field = {
                    let state = self.inner.state.lock().await;
                    state
                        .registry
                        .get(&key_path)
                        .is_some_and(|h| h.capabilities().object)
                };

                if key_value.is_object() && !object_field {
                    for (leaf_path, leaf_value) in flatten(key_path, key_value) {
                        self.apply_leaf(&leaf_path, leaf_value).await;
                    }
                } else {
                    self.apply_leaf(&key_path, key_value.clone()).await;
                }
            }
        }

        let mut state = self.inner.state.lock().await;
        state.loaded = true;
        state.recompute_gating();
        debug!(session = %self.inner.id, "bulk value propagation complete");
    }

    /// Resync one field from a value holder.
    ///
    /// Resolves the field's leaf inside `source` and runs the single-field
    /// bulk-set path: change detection, `set_value`, passive check, ledger
    /// update, gating recompute. Absent leaf or unregistered field: no-op.
    pub async fn set_field_value(&self, path: &FieldPath, source: &Value) {
        let Some(leaf) = resolve(path, source).cloned() else {
            trace!(session = %self.inner.id, field = %path, "no leaf to propagate");
            return;
        };
        self.apply_leaf(path, leaf).await;
        let mut state = self.inner.state.lock().await;
        state.recompute_gating();
    }

    /// Change-detected single-leaf update. Does not recompute gating; the
    /// caller does that once its walk is complete.
    async fn apply_leaf(&self, path: &FieldPath, incoming: Value) {
        let handle = {
            let state = self.inner.state.lock().await;
            state.registry.get(path).cloned()
        };
        let Some(handle) = handle else {
            return;
        };

        let current = handle.value().await;
        if current.as_ref() == Some(&incoming) {
            trace!(session = %self.inner.id, field = %path, "leaf unchanged, skipping");
            return;
        }

        handle.set_value(incoming.clone());
        let valid = handle
            .check(Some(incoming.clone()), CheckMode::Passive)
            .await
            .unwrap_or(false);

        let recorded = {
            let mut state = self.inner.state.lock().await;
            state.ledger.record(path, valid)
        };
        if recorded {
            debug!(session = %self.inner.id, field = %path, valid, "leaf propagated");
            self.inner.hooks.on_change(path, Some(&incoming), valid);
        }
    }

    /// Inbound field-initiated change notification.
    ///
    /// A field that edits itself (a keystroke, a picker) reports its new
    /// value and its own validity verdict here. The ledger entry is updated
    /// only while the field is still registered; a recorded update fires
    /// `on_change` and recomputes gating. The session value is untouched —
    /// the live field value flows in at the next aggregation.
    pub async fn report_field_change(&self, path: &FieldPath, value: Option<&Value>, valid: bool) {
        let recorded = {
            let mut state = self.inner.state.lock().await;
            let recorded = state.ledger.record(path, valid);
            if recorded {
                state.recompute_gating();
            }
            recorded
        };
        if recorded {
            debug!(session = %self.inner.id, field = %path, valid, "field reported change");
            self.inner.hooks.on_change(path, value, valid);
        } else {
            trace!(session = %self.inner.id, field = %path, "change report from unregistered field");
        }
    }

    // ===== Submission lifecycle =====

    /// Aggregate and hand the assembled value to the submit handler.
    ///
    /// Without a handler this is a no-op. A failed aggregation reports the
    /// ordered invalid paths through the hooks and leaves loading/disabled
    /// state untouched. A handler error is a failed submission: fields are
    /// re-enabled, loading cleared, no reset, and the error propagates.
    pub async fn submit(&self) -> SessionResult<SubmitOutcome> {
        let Some(handler) = self.inner.submit_handler.clone() else {
            debug!(session = %self.inner.id, "submit ignored, no handler configured");
            return Ok(SubmitOutcome::Skipped);
        };

        match self.run_aggregate().await {
            AggregationResult::Invalid(invalid) => {
                debug!(
                    session = %self.inner.id,
                    invalid = invalid.len(),
                    "submission rejected by validation"
                );
                self.inner.hooks.on_invalid_data(&invalid);
                Ok(SubmitOutcome::Rejected { invalid })
            }
            AggregationResult::Assembled(data) => {
                {
                    let mut state = self.inner.state.lock().await;
                    state.loading = true;
                }
                self.disable_all(true).await;

                let result = handler.on_submit(data).await;

                self.disable_all(false).await;
                {
                    let mut state = self.inner.state.lock().await;
                    state.loading = false;
                }

                match result {
                    Err(err) => {
                        warn!(session = %self.inner.id, error = %err, "submit handler failed");
                        Err(SessionError::Submit(err))
                    }
                    Ok(accepted) => {
                        let mut did_reset = false;
                        if accepted && self.inner.reset_after_submit {
                            self.reset().await;
                            did_reset = true;
                        }
                        debug!(session = %self.inner.id, accepted, reset = did_reset, "submission completed");
                        Ok(SubmitOutcome::Completed {
                            accepted,
                            reset: did_reset,
                        })
                    }
                }
            }
        }
    }

    /// Reset every field not flagged skip-reset-on-submit.
    ///
    /// Skipped fields keep both their value and their ledger entry; the
    /// others run their reset side effect, re-check passively, and update
    /// the ledger. Gating is recomputed afterwards.
    pub async fn reset(&self) {
        let fields = {
            let state = self.inner.state.lock().await;
            state.registry.snapshot()
        };

        for (path, handle) in fields {
            if handle.capabilities().skip_reset_on_submit {
                continue;
            }
            handle.reset();
            let valid = handle
                .check(None, CheckMode::Passive)
                .await
                .unwrap_or(false);
            let recorded = {
                let mut state = self.inner.state.lock().await;
                state.ledger.record(&path, valid)
            };
            if recorded {
                self.inner.hooks.on_change(&path, None, valid);
            }
        }

        let mut state = self.inner.state.lock().await;
        state.recompute_gating();
        debug!(session = %self.inner.id, "session reset");
    }

    /// Disable or enable every field that implements the capability.
    pub async fn disable_all(&self, disabled: bool) {
        let fields = {
            let mut state = self.inner.state.lock().await;
            state.disabled_all = disabled;
            state.registry.snapshot()
        };
        for (_, handle) in &fields {
            handle.set_disabled(disabled);
        }
    }

    // ===== Upward surface =====

    /// Aggregate and return the assembled value, or `None` if any field is
    /// invalid.
    pub async fn get_values(&self) -> Option<Value> {
        self.run_aggregate().await.into_value()
    }

    /// Whether a full aggregation currently passes.
    pub async fn is_valid(&self) -> bool {
        self.run_aggregate().await.is_valid()
    }

    /// Unvalidated raw aggregation, for diagnostics only.
    pub async fn raw_values(&self) -> Value {
        let (fields, mut working) = {
            let state = self.inner.state.lock().await;
            (state.registry.snapshot(), state.value.clone())
        };
        let raw = collect_raw(&fields, &mut working).await;
        let mut state = self.inner.state.lock().await;
        state.value = working;
        debug!(session = %self.inner.id, "raw session snapshot collected");
        raw
    }

    /// Force the loading flag.
    pub async fn set_loading(&self, loading: bool) {
        self.inner.state.lock().await.loading = loading;
    }

    /// Whether a submission is in flight.
    pub async fn loading(&self) -> bool {
        self.inner.state.lock().await.loading
    }

    /// Whether the fields are currently force-disabled.
    pub async fn disabled(&self) -> bool {
        self.inner.state.lock().await.disabled_all
    }

    /// Derived submit gating: true iff any ledger entry is invalid.
    pub async fn submit_disabled(&self) -> bool {
        self.inner.state.lock().await.submit_disabled
    }

    /// Whether the first bulk load has completed.
    pub async fn loaded(&self) -> bool {
        self.inner.state.lock().await.loaded
    }

    /// Registered field paths in subscription order.
    pub async fn field_names(&self) -> Vec<FieldPath> {
        self.inner.state.lock().await.registry.paths().to_vec()
    }

    /// Ordered snapshot of the registry.
    pub async fn fields(&self) -> Vec<(FieldPath, Arc<dyn FieldHandle>)> {
        self.inner.state.lock().await.registry.snapshot()
    }

    /// Last-known validity of one field.
    pub async fn field_validity(&self, path: &FieldPath) -> Option<bool> {
        self.inner.state.lock().await.ledger.get(path)
    }

    /// The id leaf of the session value, per the configured id key.
    pub async fn id_value(&self) -> Option<Value> {
        let key = self.inner.id_key.as_deref()?;
        let state = self.inner.state.lock().await;
        state
            .value
            .as_object()
            .and_then(|obj| obj.get(key))
            .cloned()
    }

    /// Aggregate against the live session value, writing valid leaves back
    /// even when the aggregation fails.
    async fn run_aggregate(&self) -> AggregationResult {
        let (fields, mut working) = {
            let state = self.inner.state.lock().await;
            (state.registry.snapshot(), state.value.clone())
        };
        let result = aggregate(&fields, &mut working).await;
        let mut state = self.inner.state.lock().await;
        state.value = working;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use telar_contract::testing::StubField;

    #[tokio::test]
    async fn builder_defaults() {
        let session = SessionController::builder().build();
        assert!(session.submit_disabled().await);
        assert!(!session.loaded().await);
        assert!(!session.loading().await);
        assert!(session.field_names().await.is_empty());
        assert!(!session.session_id().is_empty());
    }

    #[tokio::test]
    async fn empty_identity_is_ignored() {
        let session = SessionController::builder().build();
        session.subscribe(Arc::new(StubField::new(""))).await;
        assert!(session.field_names().await.is_empty());
    }

    #[tokio::test]
    async fn subscribe_seeds_ledger_and_gating() {
        let session = SessionController::builder().build();
        session
            .subscribe(Arc::new(StubField::new("a").always_valid()))
            .await;
        assert_eq!(
            session.field_validity(&FieldPath::parse("a")).await,
            Some(true)
        );
        assert!(!session.submit_disabled().await);
    }

    #[tokio::test]
    async fn field_without_validator_gates_submission_off() {
        let session = SessionController::builder().build();
        session.subscribe(Arc::new(StubField::new("a"))).await;
        assert_eq!(
            session.field_validity(&FieldPath::parse("a")).await,
            Some(false)
        );
        assert!(session.submit_disabled().await);
    }

    #[tokio::test]
    async fn unsubscribe_recomputes_gating() {
        let session = SessionController::builder().build();
        session
            .subscribe(Arc::new(StubField::new("good").always_valid()))
            .await;
        session
            .subscribe(Arc::new(StubField::new("bad").with_validator(|_| false)))
            .await;
        assert!(session.submit_disabled().await);

        session.unsubscribe(&FieldPath::parse("bad")).await;
        assert!(!session.submit_disabled().await);
        assert_eq!(session.field_names().await, vec![FieldPath::parse("good")]);
    }

    #[tokio::test]
    async fn late_joiner_receives_pending_value() {
        let session = SessionController::builder().build();
        session.set_values(json!({"name": "Al"})).await;
        assert!(session.loaded().await);

        let field = Arc::new(StubField::new("name").always_valid());
        session.subscribe(Arc::clone(&field) as Arc<dyn FieldHandle>).await;
        assert_eq!(field.current(), Some(json!("Al")));
    }

    #[tokio::test]
    async fn early_joiner_gets_nothing_before_first_load() {
        let session = SessionController::builder()
            .value(json!({"name": "Al"}))
            .build();
        let field = Arc::new(StubField::new("name").always_valid());
        session.subscribe(Arc::clone(&field) as Arc<dyn FieldHandle>).await;
        // First bulk load has not happened; nothing propagates yet.
        assert_eq!(field.current(), None);
    }

    #[tokio::test]
    async fn id_value_resolves_configured_key() {
        let session = SessionController::builder()
            .id_key("id")
            .value(json!({"id": 7, "name": "Al"}))
            .build();
        assert_eq!(session.id_value().await, Some(json!(7)));
    }

    #[tokio::test]
    async fn submit_without_handler_is_noop() {
        let session = SessionController::builder().build();
        assert_eq!(session.submit().await.unwrap(), SubmitOutcome::Skipped);
    }

    #[tokio::test]
    async fn change_report_from_unregistered_field_is_ignored() {
        let session = SessionController::builder().build();
        session
            .subscribe(Arc::new(StubField::new("a").always_valid()))
            .await;
        session
            .report_field_change(&FieldPath::parse("ghost"), Some(&json!(1)), false)
            .await;
        assert!(!session.submit_disabled().await);
        assert_eq!(
            session.field_validity(&FieldPath::parse("ghost")).await,
            None
        );
    }

    #[tokio::test]
    async fn disable_all_forwards_to_fields() {
        let session = SessionController::builder().build();
        let field = Arc::new(StubField::new("a").always_valid());
        session.subscribe(Arc::clone(&field) as Arc<dyn FieldHandle>).await;

        session.disable_all(true).await;
        assert!(session.disabled().await);
        assert_eq!(field.last_disabled(), Some(true));

        session.disable_all(false).await;
        assert_eq!(field.last_disabled(), Some(false));
    }
}
