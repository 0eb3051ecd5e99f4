//! Shallow summaries of the value at a pointer.

use indexmap::IndexMap;
use patchguard_json_pointer::{append_token, parse_json_pointer_lenient, ParseOptions};
use patchguard_util::json_type_name;
use patchguard_util::strings::char_len;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::canonical_index;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InspectOptions {
    pub max_keys: usize,
    pub max_array_items: usize,
    pub max_string_length: usize,
    /// Objects below this depth get a per-key type preview.
    pub max_depth_preview: usize,
    pub include_value: bool,
    pub try_url_decode: bool,
}

impl Default for InspectOptions {
    fn default() -> Self {
        Self {
            max_keys: 50,
            max_array_items: 20,
            max_string_length: 300,
            max_depth_preview: 2,
            include_value: true,
            try_url_decode: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Inspection {
    pub found: bool,
    /// The pointer as given.
    pub pointer: String,
    #[serde(flatten)]
    pub detail: InspectDetail,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum InspectDetail {
    Found(Found),
    Missing(Missing),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Found {
    pub resolved_pointer: String,
    #[serde(flatten)]
    pub summary: Summary,
}

/// Where and why the walk stopped.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Missing {
    pub at_pointer: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_keys_preview: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_keys_truncated: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encountered_type: Option<&'static str>,
}

impl Missing {
    fn new(at_pointer: String, message: String) -> Self {
        Self {
            at_pointer,
            message,
            container_type: None,
            container_length: None,
            available_keys_preview: None,
            available_keys_truncated: None,
            encountered_type: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Summary {
    Null(ScalarPreview),
    Boolean(ScalarPreview),
    Number(ScalarPreview),
    String(ScalarPreview),
    Array(ArrayPreview),
    Object(ObjectPreview),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScalarPreview {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_preview: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuePreview {
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_preview: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemPreview {
    pub index: usize,
    #[serde(flatten)]
    pub preview: ValuePreview,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ItemsPreview {
    Items(Vec<ItemPreview>),
    DepthLimit(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrayPreview {
    pub length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub truncated: Option<bool>,
    pub items_preview: ItemsPreview,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectPreview {
    pub count: usize,
    pub preview_count: usize,
    pub truncated: bool,
    pub keys_preview: Vec<String>,
    pub shallow_preview: Option<IndexMap<String, ValuePreview>>,
}

/// Walks `pointer` and summarises what it finds there.
///
/// ```
/// use patchguard::inspect::{inspect_keys, InspectOptions};
/// use serde_json::json;
///
/// let doc = json!({"sections": [{"name": "Intro"}]});
/// let found = inspect_keys(&doc, "sections", &InspectOptions::default());
/// assert!(found.found);
///
/// let missing = inspect_keys(&doc, "/sections/3", &InspectOptions::default());
/// assert!(!missing.found);
/// ```
pub fn inspect_keys(document: &Value, pointer: &str, options: &InspectOptions) -> Inspection {
    let parse = ParseOptions {
        url_decode: options.try_url_decode,
    };
    let tokens = parse_json_pointer_lenient(pointer, &parse);
    let miss = |detail: Missing| Inspection {
        found: false,
        pointer: pointer.to_string(),
        detail: InspectDetail::Missing(detail),
    };

    let mut current = document;
    let mut walked = String::new();
    for token in &tokens {
        let next = append_token(&walked, token);
        match current {
            Value::Array(items) => {
                let Some(idx) = canonical_index(token) else {
                    return miss(Missing {
                        container_type: Some("array"),
                        container_length: Some(items.len()),
                        ..Missing::new(next, format!("Expected a numeric index for array, but received token '{token}'."))
                    });
                };
                let Some(item) = items.get(idx) else {
                    return miss(Missing {
                        container_type: Some("array"),
                        container_length: Some(items.len()),
                        ..Missing::new(next, format!("The index is out of range: {idx} (len={}).", items.len()))
                    });
                };
                current = item;
            }
            Value::Object(map) => {
                let Some(child) = map.get(token) else {
                    let keys: Vec<String> = map.keys().take(options.max_keys).cloned().collect();
                    return miss(Missing {
                        container_type: Some("object"),
                        available_keys_truncated: Some(keys.len() < map.len()),
                        available_keys_preview: Some(keys),
                        ..Missing::new(next, format!("The key was not found: '{token}'."))
                    });
                };
                current = child;
            }
            scalar => {
                let kind = json_type_name(scalar);
                let at = if walked.is_empty() { "/".to_string() } else { walked };
                return miss(Missing {
                    encountered_type: Some(kind),
                    ..Missing::new(at, format!("It's not possible to navigate inside a value of type '{kind}'."))
                });
            }
        }
        walked = next;
    }

    Inspection {
        found: true,
        pointer: pointer.to_string(),
        detail: InspectDetail::Found(Found {
            resolved_pointer: if pointer.is_empty() { "/".to_string() } else { pointer.to_string() },
            summary: summarize(current, options, 0),
        }),
    }
}

fn preview_primitive(value: &Value, options: &InspectOptions) -> Option<Value> {
    if !options.include_value {
        return None;
    }
    Some(match value {
        Value::String(s) if char_len(s) > options.max_string_length => {
            let kept: String = s.chars().take(options.max_string_length).collect();
            Value::String(format!("{kept}\u{2026}(truncated, len={})", char_len(s)))
        }
        other => other.clone(),
    })
}

fn value_preview(value: &Value, options: &InspectOptions) -> ValuePreview {
    ValuePreview {
        kind: json_type_name(value),
        value_preview: match value {
            Value::Array(_) | Value::Object(_) => None,
            scalar => preview_primitive(scalar, options),
        },
    }
}

fn summarize(value: &Value, options: &InspectOptions, depth: usize) -> Summary {
    let scalar = || ScalarPreview {
        value_preview: preview_primitive(value, options),
    };
    match value {
        Value::Null => Summary::Null(scalar()),
        Value::Bool(_) => Summary::Boolean(scalar()),
        Value::Number(_) => Summary::Number(scalar()),
        Value::String(_) => Summary::String(scalar()),
        Value::Array(items) if depth >= options.max_depth_preview => Summary::Array(ArrayPreview {
            length: items.len(),
            preview_count: None,
            truncated: None,
            items_preview: ItemsPreview::DepthLimit(format!("[preview depth limit {}]", options.max_depth_preview)),
        }),
        Value::Array(items) => {
            let previews: Vec<ItemPreview> = items
                .iter()
                .take(options.max_array_items)
                .enumerate()
                .map(|(index, item)| ItemPreview {
                    index,
                    preview: value_preview(item, options),
                })
                .collect();
            Summary::Array(ArrayPreview {
                length: items.len(),
                preview_count: Some(previews.len()),
                truncated: Some(previews.len() < items.len()),
                items_preview: ItemsPreview::Items(previews),
            })
        }
        Value::Object(map) => {
            let keys: Vec<String> = map.keys().take(options.max_keys).cloned().collect();
            let shallow_preview = (depth < options.max_depth_preview).then(|| {
                keys.iter()
                    .map(|k| (k.clone(), value_preview(&map[k.as_str()], options)))
                    .collect()
            });
            Summary::Object(ObjectPreview {
                count: map.len(),
                preview_count: keys.len(),
                truncated: keys.len() < map.len(),
                keys_preview: keys,
                shallow_preview,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn doc() -> Value {
        json!({
            "title": "Report",
            "sections": [
                {"name": "Intro", "fields": [1, 2]},
                {"name": "Body", "fields": []}
            ],
            "a/b": {"c": null}
        })
    }

    fn wire(pointer: &str) -> Value {
        serde_json::to_value(inspect_keys(&doc(), pointer, &InspectOptions::default())).unwrap()
    }

    #[test]
    fn root_object_summary() {
        assert_eq!(
            wire(""),
            json!({
                "found": true,
                "pointer": "",
                "resolvedPointer": "/",
                "type": "object",
                "count": 3,
                "previewCount": 3,
                "truncated": false,
                "keysPreview": ["title", "sections", "a/b"],
                "shallowPreview": {
                    "title": {"type": "string", "valuePreview": "Report"},
                    "sections": {"type": "array"},
                    "a/b": {"type": "object"}
                }
            })
        );
    }

    #[test]
    fn array_summary() {
        assert_eq!(
            wire("/sections/0/fields"),
            json!({
                "found": true,
                "pointer": "/sections/0/fields",
                "resolvedPointer": "/sections/0/fields",
                "type": "array",
                "length": 2,
                "previewCount": 2,
                "truncated": false,
                "itemsPreview": [
                    {"index": 0, "type": "number", "valuePreview": 1},
                    {"index": 1, "type": "number", "valuePreview": 2}
                ]
            })
        );
    }

    #[test]
    fn scalar_and_escaped_keys() {
        assert_eq!(
            wire("sections/1/name"),
            json!({"found": true, "pointer": "sections/1/name", "resolvedPointer": "sections/1/name", "type": "string", "valuePreview": "Body"})
        );
        assert_eq!(wire("/a~1b/c")["type"], json!("null"));
        assert_eq!(wire("/a%2Fb/c")["found"], json!(true));
    }

    #[test]
    fn missing_key_lists_siblings() {
        assert_eq!(
            wire("/sections/0/label"),
            json!({
                "found": false,
                "pointer": "/sections/0/label",
                "atPointer": "/sections/0/label",
                "message": "The key was not found: 'label'.",
                "containerType": "object",
                "availableKeysPreview": ["name", "fields"],
                "availableKeysTruncated": false
            })
        );
    }

    #[test]
    fn array_miss_reasons() {
        let out = wire("/sections/7");
        assert_eq!(out["message"], json!("The index is out of range: 7 (len=2)."));
        assert_eq!(out["containerLength"], json!(2));
        let out = wire("/sections/-");
        assert_eq!(out["message"], json!("Expected a numeric index for array, but received token '-'."));
    }

    #[test]
    fn cannot_walk_into_scalars() {
        let out = inspect_keys(&doc(), "/title/x", &InspectOptions::default());
        assert!(!out.found);
        let InspectDetail::Missing(missing) = out.detail else {
            panic!("expected a miss");
        };
        assert_eq!(missing.at_pointer, "/title");
        assert_eq!(missing.encountered_type, Some("string"));
        assert_eq!(missing.message, "It's not possible to navigate inside a value of type 'string'.");
    }

    #[test]
    fn limits_apply() {
        let options = InspectOptions {
            max_keys: 1,
            max_string_length: 3,
            include_value: true,
            ..InspectOptions::default()
        };
        let out = serde_json::to_value(inspect_keys(&doc(), "", &options)).unwrap();
        assert_eq!(out["keysPreview"], json!(["title"]));
        assert_eq!(out["truncated"], json!(true));
        assert_eq!(out["shallowPreview"]["title"]["valuePreview"], json!("Rep\u{2026}(truncated, len=6)"));

        let hidden = InspectOptions {
            include_value: false,
            max_depth_preview: 0,
            ..InspectOptions::default()
        };
        let out = serde_json::to_value(inspect_keys(&doc(), "/sections", &hidden)).unwrap();
        assert_eq!(out["itemsPreview"], json!("[preview depth limit 0]"));
        let out = serde_json::to_value(inspect_keys(&doc(), "/title", &hidden)).unwrap();
        assert_eq!(out.get("valuePreview"), None);
    }
}
