//! Batch application of wire patch operations, optionally checked against
//! a JSON Schema.
//!
//! Without a schema, operations are applied structurally and missing
//! parents of an `add` are created on the way. With a schema, every
//! operation is first checked against the sub-schemas that govern its
//! target, applied, and then the whole document is validated again.
//!
//! Processing never stops at the first failure: every operation gets its
//! own diagnostic so the caller sees the complete picture. The caller is
//! expected to keep its previous document unless the result is `ok`.

use log::debug;
use patchguard_json_pointer::{get, parse_array_index};
use patchguard_json_schema::{
    candidates_at_pointer, is_property_allowed, is_required_by, merge_skeleton,
    skeleton_from_schema, ValidationError, Validator,
};
use patchguard_util::schema_type_name;
use serde_json::Value;

use crate::json_patch::{
    apply_op, ensure_parent_chain, from_json, ErrorKind, OpDecodeError, PatchError, PatchOp,
    PatchResult,
};

/// Whole-document violations listed in a post-condition message.
pub const MAX_POST_ERRORS_SHOWN: usize = 5;

/// Applies `patches` to a copy of `document`.
///
/// An empty batch succeeds without touching the document.
///
/// ```
/// use patchguard::apply_patches;
/// use serde_json::json;
///
/// let result = apply_patches(&json!({}), &[json!({"op": "add", "path": "/name", "value": "Alice"})], None);
/// assert!(result.ok);
/// assert_eq!(result.final_doc, json!({"name": "Alice"}));
/// ```
pub fn apply_patches(document: &Value, patches: &[Value], schema: Option<&Value>) -> PatchResult {
    if patches.is_empty() {
        return PatchResult::success(document.clone());
    }
    let result = match schema {
        None => apply_schemaless(document.clone(), patches),
        Some(schema) => SchemaChecker::new(schema).apply(document, patches),
    };
    debug!(
        "applied batch of {} operation(s): ok={} errors={}",
        patches.len(),
        result.ok,
        result.errors.len()
    );
    result
}

fn raw_path(raw: &Value) -> &str {
    raw.get("path").and_then(Value::as_str).unwrap_or("/")
}

fn decode_error(index: usize, raw: &Value, err: OpDecodeError) -> PatchError {
    let (pointer, kind) = match &err {
        OpDecodeError::NotAnObject | OpDecodeError::MissingOpOrPath => ("/", ErrorKind::PatchOpError),
        OpDecodeError::Pointer(_) => (raw_path(raw), ErrorKind::PointerError),
        _ => (raw_path(raw), ErrorKind::PatchOpError),
    };
    PatchError::new(index, raw, pointer, err.to_string(), kind)
}

// ── Schemaless mode ───────────────────────────────────────────────────────

fn apply_schemaless(mut doc: Value, patches: &[Value]) -> PatchResult {
    let mut errors = Vec::new();
    for (i, raw) in patches.iter().enumerate() {
        let op = match from_json(raw) {
            Ok(op) => op,
            Err(err) => {
                errors.push(decode_error(i, raw, err));
                continue;
            }
        };
        let applied = match &op {
            PatchOp::Add { path, .. } => ensure_parent_chain(&mut doc, path).and_then(|()| apply_op(&mut doc, &op)),
            _ => apply_op(&mut doc, &op),
        };
        if let Err(err) = applied {
            debug!("op {i} ({}) failed: {err}", op.op_name());
            errors.push(PatchError::new(
                i,
                raw,
                raw_path(raw),
                format!("failed to apply patch: {err}"),
                ErrorKind::PatchOpError,
            ));
        }
    }
    PatchResult::from_errors(errors, doc)
}

// ── Schema mode ───────────────────────────────────────────────────────────

struct SchemaChecker<'s> {
    schema: &'s Value,
    validator: Validator<'s>,
}

impl<'s> SchemaChecker<'s> {
    fn new(schema: &'s Value) -> Self {
        Self {
            schema,
            validator: Validator::new(schema),
        }
    }

    fn apply(&self, document: &Value, patches: &[Value]) -> PatchResult {
        let mut doc = merge_skeleton(skeleton_from_schema(self.schema), document);
        let mut errors = Vec::new();

        for (i, raw) in patches.iter().enumerate() {
            let op = match from_json(raw) {
                Ok(op) => op,
                Err(err) => {
                    errors.push(decode_error(i, raw, err));
                    continue;
                }
            };
            let pointer = raw_path(raw);
            let fail = |message: String, kind| PatchError::new(i, raw, pointer, message, kind);

            if let Err((message, kind)) = self.check_op(&doc, &op, pointer) {
                debug!("op {i} ({}) rejected at {pointer}: {message}", op.op_name());
                errors.push(fail(message, kind));
                continue;
            }

            let mut next = doc.clone();
            if let Err(err) = apply_op(&mut next, &op) {
                errors.push(fail(format!("failed to apply patch: {err}"), ErrorKind::PatchOpError));
                continue;
            }
            doc = next;

            let post = self.validator.validate_document(&doc);
            if !post.is_empty() {
                debug!("op {i} left the document with {} violation(s)", post.len());
                let mut message = join_errors(&post[..post.len().min(MAX_POST_ERRORS_SHOWN)]);
                if post.len() > MAX_POST_ERRORS_SHOWN {
                    message.push_str(" | ...");
                }
                errors.push(fail(
                    format!("post-operation document became invalid: {message}"),
                    ErrorKind::PostConditionViolation,
                ));
            }
        }
        PatchResult::from_errors(errors, doc)
    }

    /// Checks that run before an operation touches the document; the first
    /// failure wins.
    fn check_op(&self, doc: &Value, op: &PatchOp, pointer: &str) -> Result<(), (String, ErrorKind)> {
        let path = op.path();
        let target = get(doc, path);
        let parent_path = path.split_last().map_or(&path[..0], |(_, rest)| rest);
        let parent = if path.is_empty() { None } else { get(doc, parent_path) };
        let key = path.last().map(String::as_str).unwrap_or_default();

        if matches!(op, PatchOp::Replace { .. } | PatchOp::Remove { .. } | PatchOp::Test { .. }) && target.is_none() {
            return Err((
                format!("{} failed: path does not exist in current document", op.op_name()),
                ErrorKind::PointerError,
            ));
        }

        match op {
            PatchOp::Add { value, .. } => {
                if !path.is_empty() {
                    self.check_add_target(parent, parent_path, key, pointer)?;
                }
                if let Some(Value::Array(existing)) = target {
                    return Err((overwrite_blocked(pointer, existing.len(), value), ErrorKind::GuardRejection));
                }
            }
            PatchOp::Remove { .. } => {
                if path.is_empty() {
                    return Err((
                        "remove at root leaves the document undefined (incompatible with schema)".to_string(),
                        ErrorKind::PatchOpError,
                    ));
                }
                if matches!(parent, Some(Value::Object(_)))
                    && candidates_at_pointer(self.schema, parent_path)
                        .iter()
                        .any(|s| is_required_by(s, key, self.schema))
                {
                    return Err((
                        format!("remove invalid: \"{key}\" is required by parent schema"),
                        ErrorKind::SchemaViolation,
                    ));
                }
            }
            _ => {}
        }

        if let Some(value) = op.value() {
            let candidates = candidates_at_pointer(self.schema, path);
            let errors = self.validator.validate_candidates(&candidates, value, pointer);
            if !errors.is_empty() {
                let message = match op {
                    PatchOp::Test { .. } => format!("test value incompatible with schema: {}", join_errors(&errors)),
                    _ => format!(
                        "value incompatible with schema at path: {}{}",
                        join_errors(&errors),
                        shape_hint(&candidates, value, pointer)
                    ),
                };
                return Err((message, ErrorKind::SchemaViolation));
            }
        }
        Ok(())
    }

    fn check_add_target(
        &self,
        parent: Option<&Value>,
        parent_path: &[String],
        key: &str,
        pointer: &str,
    ) -> Result<(), (String, ErrorKind)> {
        match parent {
            None => Err((
                "add failed: parent path does not exist. \
                 Use inspect_keys to verify the parent path exists before adding."
                    .to_string(),
                ErrorKind::PointerError,
            )),
            Some(Value::Array(items)) => {
                let valid = key == "-" || parse_array_index(key).is_some_and(|idx| idx <= items.len());
                if valid {
                    return Ok(());
                }
                let n = items.len();
                let parent_pointer = pointer.rsplit_once('/').map_or("", |(head, _)| head);
                Err((
                    format!(
                        "add in array: invalid index '{key}'. Array has {n} items \
                         (valid indices: 0..{n}, or '-' to append). \
                         Use \"{parent_pointer}/-\" to append to the end."
                    ),
                    ErrorKind::PointerError,
                ))
            }
            Some(Value::Object(_)) => {
                let allowed = candidates_at_pointer(self.schema, parent_path)
                    .iter()
                    .any(|s| is_property_allowed(s, key, self.schema));
                if allowed {
                    Ok(())
                } else {
                    Err((
                        format!(
                            "add invalid: property \"{key}\" is not allowed by the parent schema. \
                             Check the TargetSchema to see which properties are allowed at this level."
                        ),
                        ErrorKind::SchemaViolation,
                    ))
                }
            }
            Some(_) => Ok(()),
        }
    }
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join(" | ")
}

fn overwrite_blocked(pointer: &str, existing: usize, value: &Value) -> String {
    match value {
        Value::Array(items) => format!(
            "DESTRUCTIVE OVERWRITE BLOCKED: path \"{pointer}\" currently holds an array with {existing} items. \
             Your \"add\" would REPLACE all existing data with a new array of {} items. \
             To APPEND items, use separate operations with \"{pointer}/-\" for each item. \
             Example: [{{\"op\":\"add\",\"path\":\"{pointer}/-\",\"value\":item1}}, ...]",
            items.len()
        ),
        other => format!(
            "DESTRUCTIVE OVERWRITE BLOCKED: path \"{pointer}\" currently holds an array with {existing} items. \
             Your \"add\" would REPLACE the entire array with a single {}. \
             To APPEND an item, use \"{pointer}/-\" as the path instead. \
             Example: {{\"op\":\"add\",\"path\":\"{pointer}/-\",\"value\":...}}",
            schema_type_name(other)
        ),
    }
}

/// Corrective advice for a container-shape mismatch, or an empty string.
fn shape_hint(candidates: &[&Value], value: &Value, pointer: &str) -> String {
    let actual = schema_type_name(value);
    for schema in candidates {
        match schema.get("type").and_then(Value::as_str) {
            Some("array") if actual == "object" => {
                return format!(
                    " HINT: The schema expects an array at \"{pointer}\", but you provided a single object. \
                     To append this object to the array, use path \"{pointer}/-\" instead."
                );
            }
            Some("array") if actual != "array" => {
                return format!(
                    " HINT: The schema expects an array at \"{pointer}\". \
                     To append an item, use path \"{pointer}/-\" with the item as value."
                );
            }
            Some("object") if actual == "array" => {
                return format!(
                    " HINT: The schema expects an object at \"{pointer}\", but you provided an array. \
                     Pass a single object as the value."
                );
            }
            _ => {}
        }
    }
    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn messages(result: &PatchResult) -> Vec<&str> {
        result.errors.iter().map(|e| e.message.as_str()).collect()
    }

    fn form_schema() -> Value {
        json!({
            "type": "object",
            "required": ["title", "sections"],
            "additionalProperties": false,
            "properties": {
                "title": {"type": "string"},
                "meta": {"type": "object"},
                "sections": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "required": ["name"],
                        "properties": {
                            "name": {"type": "string"},
                            "tags": {"type": "array", "items": {"type": "string"}}
                        }
                    }
                }
            }
        })
    }

    #[test]
    fn empty_batch_is_a_noop() {
        let doc = json!({"a": 1});
        let result = apply_patches(&doc, &[], Some(&form_schema()));
        assert!(result.ok);
        assert_eq!(result.final_doc, doc);
    }

    #[test]
    fn schemaless_creates_missing_parents() {
        let patches = [
            json!({"op": "add", "path": "/profile/emails/-", "value": "a@b.co"}),
            json!({"op": "add", "path": "/profile/name", "value": "Ann"}),
        ];
        let result = apply_patches(&json!({}), &patches, None);
        assert!(result.ok, "{:?}", result.errors);
        assert_eq!(result.final_doc, json!({"profile": {"emails": ["a@b.co"], "name": "Ann"}}));
    }

    #[test]
    fn schemaless_keeps_going_after_a_failure() {
        let patches = [
            json!({"op": "replace", "path": "/missing", "value": 1}),
            json!({"op": "frob", "path": "/x"}),
            json!({"op": "add", "path": "/ok", "value": true}),
        ];
        let result = apply_patches(&json!({}), &patches, None);
        assert!(!result.ok);
        assert_eq!(
            messages(&result),
            vec!["failed to apply patch: replace failed: /missing does not exist", "Operation not supported: frob"]
        );
        assert_eq!(result.errors[1].op_index, 1);
        assert_eq!(result.final_doc, json!({"ok": true}));
    }

    #[test]
    fn decode_errors_are_reported_per_op() {
        let patches = [json!(3), json!({"op": "add"}), json!({"op": "add", "path": "/a"}), json!({"op": "add", "path": "a", "value": 1})];
        let result = apply_patches(&json!({}), &patches, None);
        assert_eq!(
            messages(&result),
            vec![
                "invalid operation (not an object)",
                "invalid operation (missing op/path)",
                "operation \"add\" requires field \"value\"",
                "Invalid JSON Pointer (must start with \"/\"): a",
            ]
        );
        assert_eq!(result.errors[0].pointer, "/");
        assert_eq!(result.errors[3].kind, ErrorKind::PointerError);
    }

    #[test]
    fn schema_skeleton_fills_required_keys() {
        let patches = [json!({"op": "add", "path": "/sections/-", "value": {"name": "Intro"}})];
        let result = apply_patches(&json!({"title": "Form"}), &patches, Some(&form_schema()));
        assert!(result.ok, "{:?}", result.errors);
        assert_eq!(result.final_doc, json!({"title": "Form", "sections": [{"name": "Intro"}]}));
    }

    #[test]
    fn schema_mode_requires_existing_parent() {
        let patches = [json!({"op": "add", "path": "/meta/x/y", "value": 1})];
        let result = apply_patches(&json!({"title": "T"}), &patches, Some(&form_schema()));
        assert!(messages(&result)[0].starts_with("add failed: parent path does not exist."));
    }

    #[test]
    fn schema_mode_explains_bad_indices() {
        let patches = [json!({"op": "add", "path": "/sections/4", "value": {"name": "x"}})];
        let result = apply_patches(&json!({"title": "T"}), &patches, Some(&form_schema()));
        assert_eq!(
            messages(&result),
            vec![
                "add in array: invalid index '4'. Array has 0 items (valid indices: 0..0, or '-' to append). \
                 Use \"/sections/-\" to append to the end."
            ]
        );
    }

    #[test]
    fn schema_mode_refuses_unknown_properties() {
        let patches = [json!({"op": "add", "path": "/author", "value": "me"})];
        let result = apply_patches(&json!({"title": "T"}), &patches, Some(&form_schema()));
        assert!(messages(&result)[0].starts_with("add invalid: property \"author\" is not allowed"));
        assert_eq!(result.errors[0].kind, ErrorKind::SchemaViolation);
    }

    #[test]
    fn schema_mode_blocks_array_overwrite() {
        let doc = json!({"title": "T", "sections": [{"name": "a"}]});
        let patches = [json!({"op": "add", "path": "/sections", "value": {"name": "b"}})];
        let result = apply_patches(&doc, &patches, Some(&form_schema()));
        let message = messages(&result)[0];
        assert!(message.starts_with("DESTRUCTIVE OVERWRITE BLOCKED: path \"/sections\" currently holds an array with 1 items."));
        assert!(message.contains("REPLACE the entire array with a single object"));
        assert_eq!(result.final_doc, doc);
    }

    #[test]
    fn schema_mode_refuses_required_removal() {
        let doc = json!({"title": "T", "sections": []});
        let patches = [
            json!({"op": "remove", "path": "/title"}),
            json!({"op": "remove", "path": ""}),
            json!({"op": "remove", "path": "/nope"}),
        ];
        let result = apply_patches(&doc, &patches, Some(&form_schema()));
        assert_eq!(
            messages(&result),
            vec![
                "remove invalid: \"title\" is required by parent schema",
                "remove at root leaves the document undefined (incompatible with schema)",
                "remove failed: path does not exist in current document",
            ]
        );
    }

    #[test]
    fn value_errors_carry_hints() {
        let doc = json!({"title": "T", "sections": [{"name": "a", "tags": []}]});
        let patches = [json!({"op": "replace", "path": "/sections/0/tags", "value": {"t": 1}})];
        let result = apply_patches(&doc, &patches, Some(&form_schema()));
        assert_eq!(
            messages(&result),
            vec![
                "value incompatible with schema at path: /sections/0/tags: invalid type: expected array, received object \
                 HINT: The schema expects an array at \"/sections/0/tags\", but you provided a single object. \
                 To append this object to the array, use path \"/sections/0/tags/-\" instead."
            ]
        );
    }

    #[test]
    fn test_values_are_validated() {
        let doc = json!({"title": "T", "sections": []});
        let patches = [json!({"op": "test", "path": "/title", "value": 5})];
        let result = apply_patches(&doc, &patches, Some(&form_schema()));
        assert_eq!(
            messages(&result),
            vec!["test value incompatible with schema: /title: invalid type: expected string, received integer"]
        );
    }

    #[test]
    fn post_condition_catches_cross_field_effects() {
        let schema = json!({
            "type": "object",
            "properties": {"a": {"type": "integer"}, "b": {"type": "integer"}},
            "required": ["a", "b"]
        });
        let doc = json!({"a": 1, "b": 2});
        let patches = [json!({"op": "move", "path": "/c", "from": "/b"})];
        let result = apply_patches(&doc, &patches, Some(&schema));
        assert_eq!(
            messages(&result),
            vec!["post-operation document became invalid: /: required field missing: b"]
        );
        assert_eq!(result.errors[0].kind, ErrorKind::PostConditionViolation);
    }

    #[test]
    fn post_condition_lists_at_most_five_violations() {
        let keys = ["a", "b", "c", "d", "e", "f", "g"];
        let props: serde_json::Map<String, Value> =
            keys.iter().map(|k| (k.to_string(), json!({"type": "integer"}))).collect();
        let schema = json!({"type": "object", "required": keys, "properties": props});
        let patches = [json!({"op": "add", "path": "/a", "value": 1})];
        let result = apply_patches(&json!({}), &patches, Some(&schema));
        let message = messages(&result)[0];
        assert!(message.starts_with(
            "post-operation document became invalid: /b: invalid type: expected integer, received null | /c:"
        ));
        assert!(message.ends_with("/f: invalid type: expected integer, received null | ..."));
        assert_eq!(result.final_doc["a"], json!(1));
    }

    #[test]
    fn failed_move_does_not_touch_the_document() {
        let schema = json!({"type": "object"});
        let doc = json!({"a": 1, "l": []});
        let patches = [json!({"op": "move", "path": "/l/3", "from": "/a"})];
        let result = apply_patches(&doc, &patches, Some(&schema));
        assert_eq!(messages(&result), vec!["failed to apply patch: move in array: invalid index: 3"]);
        assert_eq!(result.final_doc, doc);
    }
}
