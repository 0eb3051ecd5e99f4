//! Structural application of patch operations.

use patchguard_json_pointer::{
    format_json_pointer, get, is_array_token, is_child, parse_array_index,
    resolve_parent_and_key_mut,
};
use patchguard_util::deep_equal;
use serde_json::{Map, Value};

use super::types::{ApplyError, PatchOp};

// ── Individual operation applicators ─────────────────────────────────────

fn apply_add(doc: &mut Value, path: &[String], value: Value, op: &'static str) -> Result<Option<Value>, ApplyError> {
    if path.is_empty() {
        return Ok(Some(std::mem::replace(doc, value)));
    }
    let parent_pointer = || format_json_pointer(&path[..path.len() - 1]);
    let (parent, key) = resolve_parent_and_key_mut(doc, path)
        .ok_or_else(|| ApplyError::PathNotFound { op, pointer: parent_pointer() })?;
    match parent {
        Value::Object(map) => Ok(map.insert(key.to_string(), value)),
        Value::Array(arr) => {
            let idx = if key == "-" {
                arr.len()
            } else {
                parse_array_index(key)
                    .filter(|idx| *idx <= arr.len())
                    .ok_or_else(|| ApplyError::InvalidIndex { op, token: key.to_string() })?
            };
            arr.insert(idx, value);
            Ok(None)
        }
        _ => Err(ApplyError::InvalidTarget { op, pointer: parent_pointer() }),
    }
}

fn apply_remove(doc: &mut Value, path: &[String], op: &'static str) -> Result<Value, ApplyError> {
    if path.is_empty() {
        return Err(ApplyError::RootRemoval);
    }
    let not_found = || ApplyError::PathNotFound { op, pointer: format_json_pointer(path) };
    let (parent, key) = resolve_parent_and_key_mut(doc, path).ok_or_else(not_found)?;
    match parent {
        Value::Object(map) => map.shift_remove(key).ok_or_else(not_found),
        Value::Array(arr) => match parse_array_index(key) {
            Some(idx) if idx < arr.len() => Ok(arr.remove(idx)),
            _ => Err(not_found()),
        },
        _ => Err(ApplyError::InvalidTarget { op, pointer: format_json_pointer(&path[..path.len() - 1]) }),
    }
}

fn apply_replace(doc: &mut Value, path: &[String], value: Value) -> Result<Option<Value>, ApplyError> {
    if path.is_empty() {
        return Ok(Some(std::mem::replace(doc, value)));
    }
    let not_found = || ApplyError::PathNotFound { op: "replace", pointer: format_json_pointer(path) };
    let (parent, key) = resolve_parent_and_key_mut(doc, path).ok_or_else(not_found)?;
    let slot = match parent {
        Value::Object(map) => map.get_mut(key),
        Value::Array(arr) => parse_array_index(key).and_then(|idx| arr.get_mut(idx)),
        _ => {
            return Err(ApplyError::InvalidTarget {
                op: "replace",
                pointer: format_json_pointer(&path[..path.len() - 1]),
            })
        }
    };
    let slot = slot.ok_or_else(not_found)?;
    Ok(Some(std::mem::replace(slot, value)))
}

fn apply_copy(doc: &mut Value, path: &[String], from: &[String]) -> Result<Option<Value>, ApplyError> {
    let src = get(doc, from)
        .cloned()
        .ok_or_else(|| ApplyError::FromNotFound { op: "copy", from: format_json_pointer(from) })?;
    apply_add(doc, path, src, "copy")
}

/// Remove-then-add. When the add half fails the source stays removed.
fn apply_move(doc: &mut Value, path: &[String], from: &[String]) -> Result<Option<Value>, ApplyError> {
    if get(doc, from).is_none() {
        return Err(ApplyError::FromNotFound { op: "move", from: format_json_pointer(from) });
    }
    if is_child(from, path) {
        return Err(ApplyError::MoveIntoChild {
            from: format_json_pointer(from),
            path: format_json_pointer(path),
        });
    }
    let value = apply_remove(doc, from, "move")?;
    apply_add(doc, path, value, "move")
}

fn apply_test(doc: &Value, path: &[String], value: &Value) -> Result<(), ApplyError> {
    let pointer = || format_json_pointer(path);
    let actual = get(doc, path).ok_or_else(|| ApplyError::PathNotFound { op: "test", pointer: pointer() })?;
    if deep_equal(actual, value) {
        Ok(())
    } else {
        Err(ApplyError::TestFailed { pointer: pointer() })
    }
}

// ── Public API ────────────────────────────────────────────────────────────

/// Apply a single operation in place, returning the value it displaced.
pub fn apply_op(doc: &mut Value, op: &PatchOp) -> Result<Option<Value>, ApplyError> {
    match op {
        PatchOp::Add { path, value } => apply_add(doc, path, value.clone(), "add"),
        PatchOp::Remove { path } => apply_remove(doc, path, "remove").map(Some),
        PatchOp::Replace { path, value } => apply_replace(doc, path, value.clone()),
        PatchOp::Copy { path, from } => apply_copy(doc, path, from),
        PatchOp::Move { path, from } => apply_move(doc, path, from),
        PatchOp::Test { path, value } => {
            apply_test(doc, path, value)?;
            Ok(None)
        }
    }
}

/// Apply operations in order; later operations see earlier effects.
pub fn apply_batch(mut doc: Value, ops: &[PatchOp]) -> Result<Value, ApplyError> {
    for op in ops {
        apply_op(&mut doc, op)?;
    }
    Ok(doc)
}

/// Creates the missing containers above `path` ahead of an `add`.
///
/// Each missing or `null` step becomes `[]` when the token after it is an
/// array position (`-` or digits) and `{}` otherwise. A step through a
/// scalar is an error.
pub fn ensure_parent_chain(doc: &mut Value, path: &[String]) -> Result<(), ApplyError> {
    let Some((_, parents)) = path.split_last() else {
        return Ok(());
    };
    let mut cur = doc;
    for (i, token) in parents.iter().enumerate() {
        let fresh = || {
            if is_array_token(&path[i + 1]) {
                Value::Array(Vec::new())
            } else {
                Value::Object(Map::new())
            }
        };
        let slot = match cur {
            Value::Array(arr) => {
                let idx = if token == "-" {
                    arr.len()
                } else {
                    parse_array_index(token)
                        .filter(|idx| *idx <= arr.len())
                        .ok_or_else(|| ApplyError::InvalidIndex { op: "add", token: token.clone() })?
                };
                if idx == arr.len() {
                    arr.push(fresh());
                }
                &mut arr[idx]
            }
            Value::Object(map) => map.entry(token.clone()).or_insert_with(fresh),
            _ => {
                return Err(ApplyError::InvalidTarget {
                    op: "add",
                    pointer: format_json_pointer(&path[..i]),
                })
            }
        };
        if slot.is_null() {
            *slot = fresh();
        }
        cur = slot;
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────
