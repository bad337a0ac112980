//! Dotted field paths and the nested-value codec for form sessions.
//!
//! `telar-state` is the lowest layer of the telar stack: it knows how a
//! dotted field identifier (`"address.city"`) maps onto a location inside a
//! nested `serde_json::Value`, and nothing else.
//!
//! # Core concepts
//!
//! - **FieldPath**: a dotted identifier decomposed into key segments
//! - **flatten**: decompose a nested object into `(leaf path, leaf value)`
//!   pairs; arrays are opaque leaves
//! - **resolve**: read the value at a path, `None` on any absence
//! - **write**: place a value at a path, creating (or overwriting)
//!   intermediate objects as needed
//!
//! # Quick start
//!
//! ```
//! use serde_json::json;
//! use telar_state::{flatten, resolve, write, FieldPath};
//!
//! let leaves = flatten(FieldPath::parse("address"), &json!({"city": "X", "zip": "1"}));
//! assert_eq!(leaves[0].0.to_string(), "address.city");
//!
//! let mut doc = json!({});
//! write(&FieldPath::parse("address.city"), &mut doc, json!("Y"));
//! assert_eq!(resolve(&FieldPath::parse("address.city"), &doc), Some(&json!("Y")));
//! ```

mod codec;
mod path;

pub use codec::{flatten, resolve, write};
pub use path::FieldPath;
