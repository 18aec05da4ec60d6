//! Structural deep merge over [`serde_json::Value`].
//!
//! Values fall into three kinds, each with one rule:
//!
//! - **Sequence** (`Value::Array`): a sequence base is concatenated with the
//!   override. Elements are never merged or deduplicated.
//! - **Mapping** (`Value::Object`): keys are copied from the base, then every
//!   override key either merges recursively into a structural entry or
//!   replaces it.
//! - **Scalar** (everything else, `null` included): always replaced.
//!
//! Inputs are borrowed and never mutated. Key order follows first insertion,
//! so a replaced entry keeps the position of the key it replaced.
//!
//! # Key folding
//!
//! With `fold_keys` set every mapping key is lower-cased before insertion, so
//! `Content-Type` and `content-type` collapse into one entry and the last
//! write wins. Entries under a `headers` key are always folded, even when the
//! surrounding mapping is not.

use serde_json::{Map, Value};

/// Mapping key whose nested entries are always merged with folded keys.
pub const HEADERS_KEY: &str = "headers";

/// Deep merges `overrides` into `base`, returning a new value.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use tiller_merge::deep_merge;
///
/// let merged = deep_merge(&json!({"a": {"b": 2}, "c": "x"}), &json!({"a": {"b": 10}}), false);
/// assert_eq!(merged, json!({"a": {"b": 10}, "c": "x"}));
///
/// let merged = deep_merge(&json!([1, 2]), &json!([2, 3]), false);
/// assert_eq!(merged, json!([1, 2, 2, 3]));
/// ```
pub fn deep_merge(base: &Value, overrides: &Value, fold_keys: bool) -> Value {
    if let Value::Array(items) = base {
        return Value::Array(concat(items, overrides));
    }

    Value::Object(merge_maps(base.as_object(), overrides.as_object(), fold_keys))
}

/// Lower-cases the top-level keys of a mapping; later duplicates win.
///
/// Non-mapping values yield an empty mapping.
pub fn fold_keys(value: &Value) -> Value {
    deep_merge(&Value::Object(Map::new()), value, true)
}

fn concat(items: &[Value], overrides: &Value) -> Vec<Value> {
    let mut out = items.to_vec();
    match overrides {
        Value::Array(more) => out.extend(more.iter().cloned()),
        other => out.push(other.clone()),
    }
    out
}

fn merge_maps(
    base: Option<&Map<String, Value>>,
    overrides: Option<&Map<String, Value>>,
    fold: bool,
) -> Map<String, Value> {
    let mut out = Map::new();

    for (key, value) in base.into_iter().flatten() {
        out.insert(folded(key, fold), value.clone());
    }

    for (key, value) in overrides.into_iter().flatten() {
        let key = folded(key, fold);
        let merged = match out.get(&key) {
            Some(existing) if is_structural(value) => {
                merge_entry(existing, value, fold || key == HEADERS_KEY)
            }
            _ => value.clone(),
        };
        out.insert(key, merged);
    }

    out
}

fn merge_entry(existing: &Value, value: &Value, fold: bool) -> Value {
    match existing {
        Value::Array(_) => deep_merge(existing, value, fold),
        Value::Object(_) if value.is_object() => deep_merge(existing, value, fold),
        _ => value.clone(),
    }
}

fn is_structural(value: &Value) -> bool {
    matches!(value, Value::Array(_) | Value::Object(_))
}

fn folded(key: &str, fold: bool) -> String {
    if fold { key.to_lowercase() } else { key.to_owned() }
}
