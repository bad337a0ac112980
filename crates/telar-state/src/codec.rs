//! Flatten, resolve, and write dotted paths against nested values.
//!
//! Objects are decomposed key by key; arrays and every other non-object
//! value are opaque leaves. This asymmetry is load-bearing: a field whose
//! value is an array is one field, not one field per element.
//!
//! None of these functions fail. `resolve` reports absence as `None`, and
//! `write` degrades a non-object intermediate by replacing it with a fresh
//! object rather than erroring.

use crate::FieldPath;
use serde_json::{Map, Value};

/// Flatten a named value into `(leaf path, leaf value)` pairs.
///
/// A non-array object recurses into each key, extending the base path.
/// Anything else (scalars, arrays, null) is a single leaf. An empty object
/// yields no pairs.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use telar_state::{flatten, FieldPath};
///
/// let leaves = flatten(FieldPath::parse("address"), &json!({"city": "X", "zip": "1"}));
/// assert_eq!(leaves.len(), 2);
/// assert_eq!(leaves[0].0.to_string(), "address.city");
/// ```
pub fn flatten(base: FieldPath, value: &Value) -> Vec<(FieldPath, Value)> {
    match value {
        Value::Object(map) => {
            let mut leaves = Vec::new();
            for (key, child) in map {
                leaves.extend(flatten(base.clone().key(key), child));
            }
            leaves
        }
        other => vec![(base, other.clone())],
    }
}

/// Resolve a path inside a nested value.
///
/// Walks `root` one key at a time and returns `None` the instant an
/// intermediate key is absent or the current level is not an object.
/// The empty path resolves to `root` itself.
pub fn resolve<'a>(path: &FieldPath, root: &'a Value) -> Option<&'a Value> {
    let mut current = root;
    for key in path.iter() {
        current = current.as_object()?.get(key)?;
    }
    Some(current)
}

/// Write a value at a path, creating intermediate objects as needed.
///
/// Mutates `root` in place. A non-object intermediate (including a
/// non-object root) is overwritten with a fresh object so the write always
/// lands. Writing at the empty path replaces `root` wholesale.
pub fn write(path: &FieldPath, root: &mut Value, value: Value) {
    let Some(last) = path.last() else {
        *root = value;
        return;
    };

    let mut current = root;
    for key in &path.segments()[..path.len() - 1] {
        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
        current = current
            .as_object_mut()
            .expect("level was just coerced to an object")
            .entry(key.clone())
            .or_insert_with(|| Value::Object(Map::new()));
    }

    if !current.is_object() {
        *current = Value::Object(Map::new());
    }
    current
        .as_object_mut()
        .expect("level was just coerced to an object")
        .insert(last.to_owned(), value);
}
