//! Configuration documents.
//!
//! A configuration document is an ordered mapping from option name to a
//! JSON-like value. Documents are plain values: they are cloned, never
//! shared, and contain no cycles.

use serde_json::{Map, Value};

/// An ordered configuration document.
pub type Document = Map<String, Value>;

/// JavaScript-style truthiness, used by rules that accept loosely typed flags.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Remove a key, keeping the order of the remaining entries.
pub fn take(doc: &mut Document, key: &str) -> Option<Value> {
    doc.shift_remove(key)
}

/// Rename `from` to `to` in place, keeping its position.
///
/// If `to` is already present it wins and `from` is dropped. Returns `false`
/// when `from` was absent.
pub fn rename_key(doc: &mut Document, from: &str, to: &str) -> bool {
    if !doc.contains_key(from) {
        return false;
    }
    if doc.contains_key(to) {
        doc.shift_remove(from);
        return true;
    }

    let old = std::mem::take(doc);
    *doc = old
        .into_iter()
        .map(|(k, v)| if k == from { (to.to_string(), v) } else { (k, v) })
        .collect();
    true
}

/// Get a nested document, replacing a missing or non-object value with `{}`.
pub fn ensure_object<'a>(doc: &'a mut Document, key: &str) -> &'a mut Document {
    let slot = doc
        .entry(key.to_string())
        .or_insert_with(|| Value::Object(Document::new()));
    if !slot.is_object() {
        *slot = Value::Object(Document::new());
    }
    match slot {
        Value::Object(map) => map,
        _ => unreachable!("slot was just replaced with an object"),
    }
}

/// Get an array, replacing a missing or non-array value with `[]`.
pub fn ensure_array<'a>(doc: &'a mut Document, key: &str) -> &'a mut Vec<Value> {
    let slot = doc
        .entry(key.to_string())
        .or_insert_with(|| Value::Array(Vec::new()));
    if !slot.is_array() {
        *slot = Value::Array(Vec::new());
    }
    match slot {
        Value::Array(items) => items,
        _ => unreachable!("slot was just replaced with an array"),
    }
}

/// Push a string onto an array option unless it is already there.
pub fn push_unique(doc: &mut Document, key: &str, item: &str) {
    let items = ensure_array(doc, key);
    if !items.iter().any(|v| v.as_str() == Some(item)) {
        items.push(Value::String(item.to_string()));
    }
}

/// Wrap a scalar in a one-element array; arrays are returned unchanged.
pub fn into_array(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        other => vec![other],
    }
}
