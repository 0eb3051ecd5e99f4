//! Deterministic JSON serialization with sorted object keys.
//!
//! Two values that differ only in object key order produce the same text,
//! which makes the output usable as a set key for structural comparison.

use serde_json::Value;

use crate::strings::escape;

/// Serialize `value` to compact JSON with object keys sorted bytewise.
pub fn stringify(val: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, val);
    out
}

fn write_value(out: &mut String, val: &Value) {
    match val {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => {
            out.push('"');
            out.push_str(&escape(s));
            out.push('"');
        }
        Value::Array(arr) => {
            out.push('[');
            for (i, item) in arr.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(out, item);
            }
            out.push(']');
        }
        Value::Object(obj) => {
            let mut keys: Vec<&String> = obj.keys().collect();
            keys.sort_unstable();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push('"');
                out.push_str(&escape(key));
                out.push_str("\":");
                write_value(out, &obj[key.as_str()]);
            }
            out.push('}');
        }
    }
}
