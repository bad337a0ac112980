//! Round-trip properties for the path codec.

use serde_json::{json, Value};
use telar_state::{flatten, resolve, write, FieldPath};

#[test]
fn flatten_then_write_reassembles_the_object() {
    let original = json!({
        "name": "Al",
        "address": {"city": "X", "zip": "1"},
        "tags": ["a", "b"]
    });

    let mut rebuilt = json!({});
    for (path, leaf) in flatten(FieldPath::root(), &original) {
        write(&path, &mut rebuilt, leaf);
    }

    assert_eq!(rebuilt, original);
}

#[test]
fn resolve_write_round_trip_for_every_leaf() {
    let doc = json!({
        "a": {"b": {"c": 1}},
        "top": true
    });

    for (path, _) in flatten(FieldPath::root(), &doc) {
        let leaf = resolve(&path, &doc).expect("flattened leaf must resolve");
        let mut fresh = json!({});
        write(&path, &mut fresh, leaf.clone());
        assert_eq!(resolve(&path, &fresh), Some(leaf));
    }
}

#[test]
fn nested_path_example_from_the_field_contract() {
    // { address: { city: "X", zip: "1" } } flattens to exactly two leaves.
    let leaves = flatten(
        FieldPath::parse("address"),
        &json!({"city": "X", "zip": "1"}),
    );
    assert_eq!(
        leaves,
        vec![
            (FieldPath::parse("address.city"), json!("X")),
            (FieldPath::parse("address.zip"), json!("1")),
        ]
    );

    // Writing ("address.city", "Y") into {} yields { address: { city: "Y" } }.
    let mut doc = json!({});
    write(&FieldPath::parse("address.city"), &mut doc, json!("Y"));
    assert_eq!(doc, json!({"address": {"city": "Y"}}));
}

#[test]
fn resolve_never_panics_on_hostile_shapes() {
    let shapes = [
        json!(null),
        json!(42),
        json!([1, 2, 3]),
        json!({"a": {"b": null}}),
        Value::String("".into()),
    ];
    let path = FieldPath::parse("a.b.c");
    for shape in &shapes {
        // Absence, not an error.
        assert!(resolve(&path, shape).is_none());
    }
}
