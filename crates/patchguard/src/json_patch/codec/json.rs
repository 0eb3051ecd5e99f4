//! JSON codec for patch operations.
//!
//! Converts operations to and from the RFC 6902 wire shape
//! `{"op", "path", "value"?, "from"?}`.

use patchguard_json_pointer::{format_json_pointer, parse_json_pointer, validate_json_pointer, validate_path, Path};
use serde_json::{json, Value};

use crate::json_patch::types::{OpDecodeError, PatchOp};

// ── Deserialization ───────────────────────────────────────────────────────

/// Decode one wire operation.
///
/// Checks run in a fixed order: object shape, `op`/`path` presence,
/// `value` for add/replace/test, `from` for move/copy, the op name, and
/// finally pointer syntax.
pub fn from_json(op: &Value) -> Result<PatchOp, OpDecodeError> {
    let map = op.as_object().ok_or(OpDecodeError::NotAnObject)?;
    let (Some(name), Some(path)) = (
        map.get("op").and_then(Value::as_str),
        map.get("path").and_then(Value::as_str),
    ) else {
        return Err(OpDecodeError::MissingOpOrPath);
    };

    let value = map.get("value");
    if matches!(name, "add" | "replace" | "test") && value.is_none() {
        return Err(OpDecodeError::MissingValue(name.to_string()));
    }
    let from = map.get("from").and_then(Value::as_str);
    if matches!(name, "move" | "copy") && from.is_none() {
        return Err(OpDecodeError::MissingFrom(name.to_string()));
    }
    if !matches!(name, "add" | "remove" | "replace" | "copy" | "move" | "test") {
        return Err(OpDecodeError::Unsupported(name.to_string()));
    }

    let path = decode_pointer(path)?;
    let value = || value.cloned().unwrap_or(Value::Null);
    let from = || decode_pointer(from.unwrap_or_default());
    Ok(match name {
        "add" => PatchOp::Add { path, value: value() },
        "replace" => PatchOp::Replace { path, value: value() },
        "test" => PatchOp::Test { path, value: value() },
        "copy" => PatchOp::Copy { path, from: from()? },
        "move" => PatchOp::Move { path, from: from()? },
        _ => PatchOp::Remove { path },
    })
}

/// Parses a wire pointer, refusing oversized ones.
fn decode_pointer(pointer: &str) -> Result<Path, OpDecodeError> {
    validate_json_pointer(pointer)?;
    let path = parse_json_pointer(pointer)?;
    validate_path(&path)?;
    Ok(path)
}

/// Decode a list of wire operations, stopping at the first invalid one.
pub fn from_json_patch(ops: &[Value]) -> Result<Vec<PatchOp>, (usize, OpDecodeError)> {
    ops.iter()
        .enumerate()
        .map(|(i, op)| from_json(op).map_err(|e| (i, e)))
        .collect()
}

// ── Serialization ─────────────────────────────────────────────────────────

/// Serialize a [`PatchOp`] to its wire shape.
pub fn to_json(op: &PatchOp) -> Value {
    let path = format_json_pointer(op.path());
    match op {
        PatchOp::Add { value, .. } | PatchOp::Replace { value, .. } | PatchOp::Test { value, .. } => json!({
            "op": op.op_name(),
            "path": path,
            "value": value
        }),
        PatchOp::Remove { .. } => json!({"op": "remove", "path": path}),
        PatchOp::Copy { from, .. } | PatchOp::Move { from, .. } => json!({
            "op": op.op_name(),
            "path": path,
            "from": format_json_pointer(from)
        }),
    }
}

pub fn to_json_patch(ops: &[PatchOp]) -> Value {
    Value::Array(ops.iter().map(to_json).collect())
}
