#![forbid(unsafe_code)]

//! Configuration maps and the preserve-nested merge.
//!
//! Overlay configuration is a JSON-like map ([`PropMap`]). Every update cycle
//! rebuilds the map from scratch, so a plain shallow merge would drop any
//! nested setting that the new map does not repeat. [`merge_preserve_nested`]
//! recurses into objects instead.
//!
//! # Invariants
//!
//! 1. Every key of `incoming` is present in the result.
//! 2. Keys only present in `existing` survive untouched.
//! 3. When both sides hold an object at the same key, the result is the
//!    recursive merge of the two objects.
//! 4. For any other pairing (null, bool, number, string, array, or an
//!    object meeting a non-object) the incoming value replaces the existing
//!    one outright. Arrays are never merged element-wise.
//!
//! # Example
//!
//! ```
//! use ftip_core::props::{PropMap, merge_preserve_nested};
//! use serde_json::json;
//!
//! let existing: PropMap = json!({"a": {"x": 1, "y": 2}}).as_object().unwrap().clone();
//! let incoming: PropMap = json!({"a": {"y": 3}}).as_object().unwrap().clone();
//!
//! let merged = merge_preserve_nested(&existing, incoming);
//! assert_eq!(serde_json::Value::Object(merged), json!({"a": {"x": 1, "y": 3}}));
//! ```

use serde_json::{Map, Value};

/// Configuration map passed to the overlay engine.
pub type PropMap = Map<String, Value>;

/// Space-separated class tokens synced onto the overlay root element.
pub const CLASS_NAME_KEY: &str = "className";

/// Positioning sub-options. Creation always takes this from the source's
/// live configuration.
pub const POSITIONING_KEY: &str = "popperOptions";

/// Ordered overrides list. Stored as an array, so it is replaced on merge.
pub const OVERRIDES_KEY: &str = "overrides";

/// Per-target content. Never part of group-level configuration updates.
pub const CONTENT_KEY: &str = "content";

/// Merge `incoming` on top of `existing`, recursing into nested objects.
#[must_use]
pub fn merge_preserve_nested(existing: &PropMap, incoming: PropMap) -> PropMap {
    let mut merged = existing.clone();
    for (key, value) in incoming {
        let next = match merged.remove(&key) {
            Some(current) => merge_value(current, value),
            None => value,
        };
        merged.insert(key, next);
    }
    merged
}

/// Merge a single value pair using the preserve-nested rule.
#[must_use]
pub fn merge_value(existing: Value, incoming: Value) -> Value {
    match (existing, incoming) {
        (Value::Object(current), Value::Object(next)) => {
            Value::Object(merge_preserve_nested(&current, next))
        }
        (_, next) => next,
    }
}
