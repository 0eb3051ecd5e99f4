#![allow(dead_code)]

use patchguard::{GuardedResult, PatchResult};
use serde_json::{json, Value};

/// A form-like report with a handful of populated sections.
pub fn report_doc() -> Value {
    json!({
        "metadata": {"title": "Quarterly report", "author": "Alice"},
        "sections": [
            {
                "section_name": "Overview",
                "fields": [
                    {"label": "Revenue", "value": 1500},
                    {"label": "Profit", "value": 300}
                ]
            },
            {
                "section_name": "Costs",
                "fields": [{"label": "Rent", "value": 1200}]
            }
        ]
    })
}

pub fn report_schema() -> Value {
    json!({
        "type": "object",
        "required": ["metadata", "sections"],
        "properties": {
            "metadata": {
                "type": "object",
                "required": ["title"],
                "properties": {
                    "title": {"type": "string"},
                    "author": {"type": "string"}
                },
                "additionalProperties": false
            },
            "sections": {
                "type": "array",
                "items": {"$ref": "#/$defs/section"}
            }
        },
        "$defs": {
            "section": {
                "type": "object",
                "required": ["section_name"],
                "properties": {
                    "section_name": {"type": "string", "minLength": 1},
                    "fields": {"type": "array", "items": {"$ref": "#/$defs/field"}}
                },
                "additionalProperties": false
            },
            "field": {
                "type": "object",
                "required": ["label"],
                "properties": {
                    "label": {"type": "string"},
                    "value": {"type": ["number", "string", "null"]}
                }
            }
        }
    })
}

pub fn messages(result: &PatchResult) -> Vec<&str> {
    result.errors.iter().map(|e| e.message.as_str()).collect()
}

/// Asserts a rejected batch whose first error starts with `prefix` and
/// which left `original` as the reported document.
pub fn assert_rejected(out: &GuardedResult, prefix: &str, original: &Value) {
    assert!(!out.is_ok(), "expected rejection, got {:?}", out.result.final_doc);
    let first = out.result.errors.first().map(|e| e.message.as_str()).unwrap_or_default();
    assert!(first.starts_with(prefix), "message {first:?} does not start with {prefix:?}");
    assert_eq!(&out.result.final_doc, original);
}
