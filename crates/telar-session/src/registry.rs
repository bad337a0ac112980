//! The field registry and its validity ledger.
//!
//! `SessionRegistry` is the mutable map of field path to handle for one
//! active session; `ValidityLedger` is the parallel map of last-known
//! validity. The two hold the same key set at all times — entries are added
//! and removed together by the controller — and the ledger, not the
//! registry, is authoritative for submit gating.

use std::collections::HashMap;
use std::sync::Arc;
use telar_contract::FieldHandle;
use telar_state::FieldPath;

/// Insertion-ordered map of field path to handle.
///
/// Iteration order is subscription order; re-inserting an existing key
/// replaces the handle without moving it. The registry holds non-owning
/// `Arc` references: dropping an entry never tears down the field
/// component itself.
#[derive(Default)]
pub struct SessionRegistry {
    order: Vec<FieldPath>,
    handles: HashMap<FieldPath, Arc<dyn FieldHandle>>,
}

impl SessionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a handle. Replacement keeps the original position.
    pub fn insert(&mut self, path: FieldPath, handle: Arc<dyn FieldHandle>) {
        if self.handles.insert(path.clone(), handle).is_none() {
            self.order.push(path);
        }
    }

    /// Remove a handle. Returns it if it was registered.
    pub fn remove(&mut self, path: &FieldPath) -> Option<Arc<dyn FieldHandle>> {
        let removed = self.handles.remove(path);
        if removed.is_some() {
            self.order.retain(|p| p != path);
        }
        removed
    }

    /// Look up a handle.
    pub fn get(&self, path: &FieldPath) -> Option<&Arc<dyn FieldHandle>> {
        self.handles.get(path)
    }

    /// Whether a field is registered.
    pub fn contains(&self, path: &FieldPath) -> bool {
        self.handles.contains_key(path)
    }

    /// Number of registered fields.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Registered paths in subscription order.
    pub fn paths(&self) -> &[FieldPath] {
        &self.order
    }

    /// Ordered snapshot of the registry.
    ///
    /// Aggregation and bulk propagation iterate a snapshot taken at start,
    /// so fields subscribed mid-walk are not seen by the walk in flight.
    pub fn snapshot(&self) -> Vec<(FieldPath, Arc<dyn FieldHandle>)> {
        self.order
            .iter()
            .filter_map(|p| self.handles.get(p).map(|h| (p.clone(), Arc::clone(h))))
            .collect()
    }
}

/// Last-known validity per registered field.
#[derive(Clone, Debug, Default)]
pub struct ValidityLedger {
    entries: HashMap<FieldPath, bool>,
}

impl ValidityLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry (at subscribe).
    pub fn insert(&mut self, path: FieldPath, valid: bool) {
        self.entries.insert(path, valid);
    }

    /// Remove an entry (at unsubscribe).
    pub fn remove(&mut self, path: &FieldPath) -> Option<bool> {
        self.entries.remove(path)
    }

    /// Update an entry only if the field is still tracked.
    ///
    /// Returns whether the update landed. This is the guard that makes
    /// post-await writes safe against a concurrent unsubscribe.
    pub fn record(&mut self, path: &FieldPath, valid: bool) -> bool {
        match self.entries.get_mut(path) {
            Some(entry) => {
                *entry = valid;
                true
            }
            None => false,
        }
    }

    /// Last-known validity for a field.
    pub fn get(&self, path: &FieldPath) -> Option<bool> {
        self.entries.get(path).copied()
    }

    /// Whether any tracked field is invalid. Authoritative for gating.
    pub fn has_invalid(&self) -> bool {
        self.entries.values().any(|valid| !valid)
    }

    /// Number of tracked fields.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the ledger is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use telar_contract::testing::StubField;

    fn field(name: &str) -> Arc<dyn FieldHandle> {
        Arc::new(StubField::new(name))
    }

    #[test]
    fn registry_preserves_insertion_order() {
        let mut registry = SessionRegistry::new();
        registry.insert(FieldPath::parse("b"), field("b"));
        registry.insert(FieldPath::parse("a"), field("a"));
        registry.insert(FieldPath::parse("c"), field("c"));

        let order: Vec<String> = registry.paths().iter().map(|p| p.to_string()).collect();
        assert_eq!(order, ["b", "a", "c"]);
    }

    #[test]
    fn reinsert_keeps_position() {
        let mut registry = SessionRegistry::new();
        registry.insert(FieldPath::parse("a"), field("a"));
        registry.insert(FieldPath::parse("b"), field("b"));
        registry.insert(FieldPath::parse("a"), field("a"));

        let order: Vec<String> = registry.paths().iter().map(|p| p.to_string()).collect();
        assert_eq!(order, ["a", "b"]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn remove_is_noop_when_absent() {
        let mut registry = SessionRegistry::new();
        assert!(registry.remove(&FieldPath::parse("ghost")).is_none());
        registry.insert(FieldPath::parse("a"), field("a"));
        assert!(registry.remove(&FieldPath::parse("a")).is_some());
        assert!(registry.is_empty());
    }

    #[test]
    fn snapshot_iterates_in_order() {
        let mut registry = SessionRegistry::new();
        registry.insert(FieldPath::parse("z"), field("z"));
        registry.insert(FieldPath::parse("a"), field("a"));

        let snapshot = registry.snapshot();
        assert_eq!(snapshot[0].0, FieldPath::parse("z"));
        assert_eq!(snapshot[1].0, FieldPath::parse("a"));
    }

    #[test]
    fn ledger_record_requires_existing_entry() {
        let mut ledger = ValidityLedger::new();
        assert!(!ledger.record(&FieldPath::parse("a"), true));

        ledger.insert(FieldPath::parse("a"), false);
        assert!(ledger.record(&FieldPath::parse("a"), true));
        assert_eq!(ledger.get(&FieldPath::parse("a")), Some(true));
    }

    #[test]
    fn ledger_gating_flag() {
        let mut ledger = ValidityLedger::new();
        assert!(!ledger.has_invalid());

        ledger.insert(FieldPath::parse("a"), true);
        ledger.insert(FieldPath::parse("b"), false);
        assert!(ledger.has_invalid());

        ledger.remove(&FieldPath::parse("b"));
        assert!(!ledger.has_invalid());
    }
}
