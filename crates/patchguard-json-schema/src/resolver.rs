//! `$ref` resolution against the root schema.
//!
//! Only same-document references are followed: `#` and `#/...`. Anything
//! else is left unresolved and validates as the permissive schema.

use std::collections::HashSet;

use patchguard_json_pointer::{get, parse_json_pointer};
use serde_json::{Map, Value};

/// Upper bound on chained `$ref` hops followed in one resolution.
pub const MAX_REF_DEPTH: usize = 10;

/// The schema that accepts every value.
pub static PERMISSIVE: Value = Value::Bool(true);

/// Returns the `$ref` string of a schema node, if any.
pub fn ref_of(schema: &Value) -> Option<&str> {
    schema.as_object()?.get("$ref")?.as_str()
}

/// Looks up a same-document reference.
pub fn lookup_ref<'s>(reference: &str, root: &'s Value) -> Option<&'s Value> {
    let fragment = reference.strip_prefix('#')?;
    if fragment.is_empty() {
        return Some(root);
    }
    let path = parse_json_pointer(fragment).ok()?;
    get(root, &path)
}

/// Follows a `$ref` chain until a node without `$ref` is reached.
///
/// Stops after [`MAX_REF_DEPTH`] hops, on a repeated reference, or on a
/// reference that cannot be looked up. In those cases the last node reached
/// is returned and still carries its `$ref`; see [`is_unresolved`].
pub fn resolve_ref<'s>(schema: &'s Value, root: &'s Value) -> &'s Value {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut current = schema;
    for _ in 0..MAX_REF_DEPTH {
        let Some(reference) = ref_of(current) else {
            return current;
        };
        if !seen.insert(reference) {
            return current;
        }
        match lookup_ref(reference, root) {
            Some(target) => current = target,
            None => return current,
        }
    }
    current
}

/// Whether a node returned by [`resolve_ref`] is still a reference.
pub fn is_unresolved(schema: &Value) -> bool {
    ref_of(schema).is_some()
}

/// Returns a copy of `schema` with every resolvable `$ref` replaced by its
/// target.
///
/// A reference that recurs inside its own expansion is replaced by the
/// permissive schema. `definitions` and `$defs` are copied untouched.
pub fn inline_refs(schema: &Value, root: &Value) -> Value {
    let mut seen = Vec::new();
    inline(schema, root, &mut seen)
}

fn inline<'s>(schema: &'s Value, root: &'s Value, seen: &mut Vec<&'s str>) -> Value {
    let Value::Object(map) = schema else {
        return schema.clone();
    };

    if let Some(reference) = ref_of(schema) {
        if seen.contains(&reference) {
            log::warn!("recursive schema reference {reference} inlined as permissive");
            return PERMISSIVE.clone();
        }
        let resolved = resolve_ref(schema, root);
        if is_unresolved(resolved) {
            log::warn!("schema reference {reference} could not be resolved");
            return schema.clone();
        }
        seen.push(reference);
        let out = inline(resolved, root, seen);
        seen.pop();
        return out;
    }

    let mut out = Map::with_capacity(map.len());
    for (key, val) in map {
        let inlined = match (key.as_str(), val) {
            ("properties", Value::Object(props)) => Value::Object(
                props
                    .iter()
                    .map(|(k, v)| (k.clone(), inline(v, root, seen)))
                    .collect(),
            ),
            ("items" | "additionalProperties", Value::Object(_)) => inline(val, root, seen),
            ("anyOf" | "oneOf" | "allOf", Value::Array(branches)) => {
                Value::Array(branches.iter().map(|b| inline(b, root, seen)).collect())
            }
            _ => val.clone(),
        };
        out.insert(key.clone(), inlined);
    }
    Value::Object(out)
}
