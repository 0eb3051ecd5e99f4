//! Initial documents derived from a schema's `required` list.

use serde_json::{Map, Value};

use crate::candidates::declared_types;
use crate::resolver::resolve_ref;

/// Builds the starting object for an object schema.
///
/// Each `required` key is pre-populated with `[]`, `{}` or `null`
/// depending on the first type declared for it. Non-object schemas yield
/// an empty map.
pub fn skeleton_from_schema(schema: &Value) -> Map<String, Value> {
    let mut base = Map::new();
    let root = resolve_ref(schema, schema);
    if root.get("type").and_then(Value::as_str) != Some("object") {
        return base;
    }
    let props = root.get("properties").and_then(Value::as_object);
    let required = root.get("required").and_then(Value::as_array);

    for key in required.into_iter().flatten().filter_map(Value::as_str) {
        let first_type = props
            .and_then(|p| p.get(key))
            .map(|prop| resolve_ref(prop, schema))
            .and_then(declared_types)
            .and_then(|types| types.first().copied());
        let placeholder = match first_type {
            Some("array") => Value::Array(Vec::new()),
            Some("object") => Value::Object(Map::new()),
            _ => Value::Null,
        };
        base.insert(key.to_string(), placeholder);
    }
    base
}

/// Lays `document` over `skeleton`: keys present in the document win.
///
/// A document that is not an object is returned unchanged.
pub fn merge_skeleton(skeleton: Map<String, Value>, document: &Value) -> Value {
    match document {
        Value::Object(doc) => {
            let mut merged = skeleton;
            for (key, val) in doc {
                merged.insert(key.clone(), val.clone());
            }
            Value::Object(merged)
        }
        other => other.clone(),
    }
}
