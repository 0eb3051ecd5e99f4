//! Candidate sub-schemas reachable at a document pointer.
//!
//! `anyOf`/`oneOf` branches are not collapsed: every branch that could
//! govern the location contributes its own candidate.

use patchguard_json_pointer::is_array_token;
use serde_json::Value;

use crate::resolver::{is_unresolved, resolve_ref, PERMISSIVE};

/// The `type` keyword as a list; `None` when absent or empty.
pub fn declared_types(schema: &Value) -> Option<Vec<&str>> {
    match schema.as_object()?.get("type")? {
        Value::String(t) if !t.is_empty() => Some(vec![t.as_str()]),
        Value::Array(list) if !list.is_empty() => {
            Some(list.iter().filter_map(Value::as_str).collect())
        }
        _ => None,
    }
}

/// The branches of `anyOf`, or of `oneOf` when there is no `anyOf`.
pub(crate) fn alternatives(schema: &Value) -> Option<&Vec<Value>> {
    let map = schema.as_object()?;
    map.get("anyOf")
        .or_else(|| map.get("oneOf"))
        .and_then(Value::as_array)
}

/// A node that constrains nothing: `true`, `{}`, or an unresolvable ref.
pub fn is_permissive(schema: &Value) -> bool {
    match schema {
        Value::Bool(b) => *b,
        Value::Object(map) => map.is_empty() || is_unresolved(schema),
        _ => true,
    }
}

/// Schemas governing the value of property `key` inside `schema`.
pub fn candidates_for_property<'s>(schema: &'s Value, key: &str, root: &'s Value) -> Vec<&'s Value> {
    let schema = resolve_ref(schema, root);
    if schema == &Value::Bool(false) {
        return Vec::new();
    }
    if is_permissive(schema) || !schema.is_object() {
        return vec![&PERMISSIVE];
    }
    if let Some(branches) = alternatives(schema) {
        return branches
            .iter()
            .flat_map(|branch| candidates_for_property(branch, key, root))
            .collect();
    }
    if let Some(prop) = schema.get("properties").and_then(|p| p.get(key)) {
        return vec![resolve_ref(prop, root)];
    }
    match schema.get("additionalProperties") {
        Some(Value::Bool(false)) => Vec::new(),
        None | Some(Value::Bool(true)) | Some(Value::Null) => vec![&PERMISSIVE],
        Some(other) => vec![resolve_ref(other, root)],
    }
}

/// Schemas governing an element of the array described by `schema`.
pub fn candidates_for_index<'s>(schema: &'s Value, root: &'s Value) -> Vec<&'s Value> {
    let schema = resolve_ref(schema, root);
    if schema == &Value::Bool(false) {
        return Vec::new();
    }
    if is_permissive(schema) || !schema.is_object() {
        return vec![&PERMISSIVE];
    }
    if let Some(branches) = alternatives(schema) {
        return branches
            .iter()
            .flat_map(|branch| candidates_for_index(branch, root))
            .collect();
    }
    match schema.get("items") {
        Some(items @ Value::Object(_)) => vec![resolve_ref(items, root)],
        _ => vec![&PERMISSIVE],
    }
}

/// Walks `path` through `root`, returning every schema that may govern
/// the value found there.
///
/// A step that no candidate can follow falls back to the permissive
/// schema, so the result is never empty.
///
/// ```
/// use patchguard_json_schema::candidates_at_pointer;
/// use serde_json::json;
///
/// let schema = json!({
///     "type": "object",
///     "properties": {
///         "tags": {"type": "array", "items": {"type": "string"}}
///     }
/// });
/// let path = vec!["tags".to_string(), "0".to_string()];
/// assert_eq!(candidates_at_pointer(&schema, &path), vec![&json!({"type": "string"})]);
/// ```
pub fn candidates_at_pointer<'s>(root: &'s Value, path: &[String]) -> Vec<&'s Value> {
    let mut candidates: Vec<&'s Value> = vec![resolve_ref(root, root)];
    for token in path {
        let mut next = Vec::new();
        for schema in candidates {
            let schema = resolve_ref(schema, root);
            let types = declared_types(schema);
            let could_be = |t: &str| types.as_ref().map_or(true, |list| list.contains(&t));
            if schema == &Value::Bool(false) {
                continue;
            }
            if is_array_token(token) && could_be("array") {
                next.extend(candidates_for_index(schema, root));
                continue;
            }
            if could_be("object") {
                next.extend(candidates_for_property(schema, token, root));
            }
        }
        candidates = if next.is_empty() { vec![&PERMISSIVE] } else { next };
    }
    candidates
}

/// Whether any constraint in `schema` allows property `key`.
pub fn is_property_allowed(schema: &Value, key: &str, root: &Value) -> bool {
    let schema = resolve_ref(schema, root);
    match schema {
        Value::Bool(b) => *b,
        Value::Object(map) => {
            if alternatives(schema).is_some() {
                return true;
            }
            if map.get("properties").and_then(|p| p.get(key)).is_some() {
                return true;
            }
            !matches!(map.get("additionalProperties"), Some(Value::Bool(false)))
        }
        _ => true,
    }
}

/// Whether `schema` lists `key` under `required`.
pub fn is_required_by(schema: &Value, key: &str, root: &Value) -> bool {
    let schema = resolve_ref(schema, root);
    if alternatives(schema).is_some() {
        return false;
    }
    schema
        .get("required")
        .and_then(Value::as_array)
        .is_some_and(|req| req.iter().any(|r| r.as_str() == Some(key)))
}
