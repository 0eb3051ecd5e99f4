//! Strict reads with precise failure reasons and a size-bounded copy of
//! the value.

use patchguard_json_pointer::{parse_json_pointer_lenient, ParseOptions};
use patchguard_truncator::{render, TruncatorConfig};
use patchguard_util::json_type_name;
use patchguard_util::strings::char_len;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use thiserror::Error;

use super::canonical_index;

/// Bounds applied to the returned copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadOptions {
    pub max_string_length: usize,
    pub max_depth: usize,
    pub max_array_items: usize,
    pub max_object_keys: usize,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            max_string_length: 160,
            max_depth: 6,
            max_array_items: 50,
            max_object_keys: 50,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReadError {
    #[error("Cannot traverse '{token}': encountered null at token index {index}")]
    NullTraversal { token: String, index: usize },
    #[error("Invalid array index '-': not readable for read_value")]
    AppendToken,
    #[error("Invalid array index token '{token}' at token index {index}")]
    InvalidIndex { token: String, index: usize },
    #[error("Array index out of range: {index} (length {len})")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("Property not found: '{token}' at token index {index}")]
    PropertyNotFound { token: String, index: usize },
    #[error("Cannot traverse into non-container type '{kind}' at token index {index}")]
    NotAContainer { kind: &'static str, index: usize },
}

impl ReadError {
    pub fn to_report(&self, path: &str) -> Value {
        json!({"found": false, "error": self.to_string(), "path": path})
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadStats {
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub returned_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_key_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub returned_key_count: Option<usize>,
}

/// A successful read.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRead {
    pub path: String,
    pub value_type: &'static str,
    pub value: Value,
    pub value_truncated: bool,
    /// What was cut at the top level of the value.
    pub notes: Vec<String>,
    pub stats: ReadStats,
    pub limits: ReadOptions,
}

impl ValueRead {
    pub fn to_report(&self) -> Value {
        json!({
            "found": true,
            "path": self.path,
            "valueType": self.value_type,
            "value": self.value,
            "valueTruncated": self.value_truncated,
            "notes": self.notes,
            "stats": self.stats,
            "limits": self.limits,
        })
    }
}

/// Reads the value at `path`.
///
/// A missing leading `/` is tolerated; tokens are not percent-decoded.
/// Array positions must be canonical indices and `-` is refused.
pub fn read_value(document: &Value, path: &str, options: &ReadOptions) -> Result<ValueRead, ReadError> {
    let tokens = parse_json_pointer_lenient(path, &ParseOptions { url_decode: false });
    let mut current = document;
    for (index, token) in tokens.iter().enumerate() {
        current = match current {
            Value::Null => {
                return Err(ReadError::NullTraversal {
                    token: token.clone(),
                    index,
                })
            }
            Value::Array(items) => {
                if token == "-" {
                    return Err(ReadError::AppendToken);
                }
                let idx = canonical_index(token).ok_or_else(|| ReadError::InvalidIndex {
                    token: token.clone(),
                    index,
                })?;
                items.get(idx).ok_or(ReadError::IndexOutOfRange {
                    index: idx,
                    len: items.len(),
                })?
            }
            Value::Object(map) => map.get(token).ok_or_else(|| ReadError::PropertyNotFound {
                token: token.clone(),
                index,
            })?,
            scalar => {
                return Err(ReadError::NotAContainer {
                    kind: json_type_name(scalar),
                    index,
                })
            }
        };
    }

    let sanitized = sanitize(current, options, 0);
    Ok(ValueRead {
        path: path.to_string(),
        value_type: json_type_name(current),
        value: sanitized.value,
        value_truncated: sanitized.truncated,
        notes: sanitized.notes,
        stats: sanitized.stats,
        limits: options.clone(),
    })
}

/// Reads `path` and renders the outcome as bounded text.
pub fn render_read(
    document: &Value,
    path: &str,
    options: &ReadOptions,
    limit: usize,
    config: &TruncatorConfig,
) -> String {
    let report = match read_value(document, path, options) {
        Ok(read) => read.to_report(),
        Err(err) => err.to_report(path),
    };
    render(&report, limit, config)
}

struct Sanitized {
    value: Value,
    truncated: bool,
    notes: Vec<String>,
    stats: ReadStats,
}

impl Sanitized {
    fn plain(value: Value, stats: ReadStats) -> Self {
        Self {
            value,
            truncated: false,
            notes: Vec::new(),
            stats,
        }
    }

    fn changed(&self) -> bool {
        self.truncated || !self.notes.is_empty()
    }

    fn mark_nested(&mut self, nested_changed: bool) {
        if nested_changed {
            self.truncated = true;
            self.notes.push("Nested values were sanitized/truncated for JSON safety".to_string());
        }
    }
}

fn sanitize(value: &Value, options: &ReadOptions, depth: usize) -> Sanitized {
    let kind = json_type_name(value);
    let stats = ReadStats {
        kind,
        ..ReadStats::default()
    };
    match value {
        Value::String(s) => {
            let len = char_len(s);
            if len > options.max_string_length {
                let kept: String = s.chars().take(options.max_string_length).collect();
                Sanitized {
                    value: Value::String(format!("{kept}\u{2026}")),
                    truncated: true,
                    notes: vec![format!("String truncated to max_string_length={}", options.max_string_length)],
                    stats: ReadStats {
                        original_length: Some(len),
                        ..stats
                    },
                }
            } else {
                Sanitized::plain(value.clone(), ReadStats { length: Some(len), ..stats })
            }
        }
        Value::Array(_) | Value::Object(_) if depth >= options.max_depth => Sanitized {
            value: Value::String("[MaxDepth]".to_string()),
            truncated: true,
            notes: vec![format!(
                "Max depth reached (max_depth={}); replaced with '[MaxDepth]'",
                options.max_depth
            )],
            stats,
        },
        Value::Array(items) => {
            let children: Vec<Sanitized> = items
                .iter()
                .take(options.max_array_items)
                .map(|item| sanitize(item, options, depth + 1))
                .collect();
            let nested_changed = children.iter().any(Sanitized::changed);
            let mut out = Sanitized::plain(
                Value::Null,
                ReadStats {
                    original_length: Some(items.len()),
                    returned_length: Some(children.len()),
                    ..stats
                },
            );
            if items.len() > options.max_array_items {
                out.truncated = true;
                out.notes.push(format!("Array truncated to max_array_items={}", options.max_array_items));
            }
            out.mark_nested(nested_changed);
            out.value = Value::Array(children.into_iter().map(|c| c.value).collect());
            out
        }
        Value::Object(map) => {
            let children: Vec<(&String, Sanitized)> = map
                .iter()
                .take(options.max_object_keys)
                .map(|(k, v)| (k, sanitize(v, options, depth + 1)))
                .collect();
            let nested_changed = children.iter().any(|(_, c)| c.changed());
            let mut out = Sanitized::plain(
                Value::Null,
                ReadStats {
                    original_key_count: Some(map.len()),
                    returned_key_count: Some(children.len()),
                    ..stats
                },
            );
            if map.len() > options.max_object_keys {
                out.truncated = true;
                out.notes.push(format!("Object truncated to max_object_keys={}", options.max_object_keys));
            }
            out.mark_nested(nested_changed);
            out.value = Value::Object(children.into_iter().map(|(k, c)| (k.clone(), c.value)).collect::<Map<_, _>>());
            out
        }
        scalar => Sanitized::plain(scalar.clone(), stats),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn doc() -> Value {
        json!({
            "name": "Alice",
            "age": 30,
            "active": true,
            "none": null,
            "tags": ["a", "b"],
            "nested": {"deep": {"x": 1}}
        })
    }

    fn read(path: &str) -> Result<ValueRead, ReadError> {
        read_value(&doc(), path, &ReadOptions::default())
    }

    #[test]
    fn reads_scalars_with_stats() {
        let out = read("/name").unwrap();
        assert_eq!(out.value, json!("Alice"));
        assert_eq!(out.value_type, "string");
        assert_eq!(out.stats.length, Some(5));
        assert!(!out.value_truncated);
        assert_eq!(read("age").unwrap().value_type, "number");
        assert_eq!(read("/active").unwrap().value, json!(true));
        assert_eq!(read("/none").unwrap().value_type, "null");
    }

    #[test]
    fn reads_containers_and_root() {
        let out = read("/tags").unwrap();
        assert_eq!(out.value, json!(["a", "b"]));
        assert_eq!(out.stats.original_length, Some(2));
        assert_eq!(read("/tags/1").unwrap().value, json!("b"));
        assert_eq!(read("").unwrap().value, doc());
        assert_eq!(read("/").unwrap().value_type, "object");
    }

    #[test]
    fn precise_errors() {
        let cases = [
            ("/missing", "Property not found: 'missing' at token index 0"),
            ("/tags/5", "Array index out of range: 5 (length 2)"),
            ("/tags/01", "Invalid array index token '01' at token index 1"),
            ("/tags/-", "Invalid array index '-': not readable for read_value"),
            ("/name/first", "Cannot traverse into non-container type 'string' at token index 1"),
            ("/none/x", "Cannot traverse 'x': encountered null at token index 1"),
        ];
        for (path, message) in cases {
            assert_eq!(read(path).unwrap_err().to_string(), message, "path {path}");
        }
    }

    #[test]
    fn long_strings_are_cut() {
        let document = json!({"s": "x".repeat(200)});
        let out = read_value(&document, "/s", &ReadOptions::default()).unwrap();
        assert_eq!(out.value.as_str().map(|s| s.chars().count()), Some(161));
        assert!(out.value_truncated);
        assert_eq!(out.notes, vec!["String truncated to max_string_length=160"]);
        assert_eq!(out.stats.original_length, Some(200));
    }

    #[test]
    fn containers_are_bounded() {
        let document = json!({"l": (0..60).collect::<Vec<_>>()});
        let out = read_value(&document, "/l", &ReadOptions::default()).unwrap();
        assert_eq!(out.value.as_array().map(Vec::len), Some(50));
        assert_eq!(out.notes, vec!["Array truncated to max_array_items=50"]);
        assert_eq!(out.stats.returned_length, Some(50));

        let options = ReadOptions {
            max_object_keys: 2,
            ..ReadOptions::default()
        };
        let out = read_value(&doc(), "", &options).unwrap();
        assert_eq!(out.value, json!({"name": "Alice", "age": 30}));
        assert_eq!(out.stats.original_key_count, Some(6));
    }

    #[test]
    fn depth_is_bounded() {
        let options = ReadOptions {
            max_depth: 1,
            ..ReadOptions::default()
        };
        let out = read_value(&doc(), "/nested", &options).unwrap();
        assert_eq!(out.value, json!({"deep": "[MaxDepth]"}));
        assert_eq!(out.notes, vec!["Nested values were sanitized/truncated for JSON safety"]);
        assert!(out.value_truncated);
    }

    #[test]
    fn reports_have_a_found_flag() {
        assert_eq!(read("/age").unwrap().to_report()["found"], json!(true));
        let err = read("/nope").unwrap_err().to_report("/nope");
        assert_eq!(err, json!({"found": false, "error": "Property not found: 'nope' at token index 0", "path": "/nope"}));
    }

    #[test]
    fn rendered_reads_fit_the_limit() {
        let document = json!({"items": (0..200).map(|i| json!({"id": i, "label": format!("item number {i}")})).collect::<Vec<_>>()});
        let text = render_read(&document, "/items", &ReadOptions::default(), 600, &TruncatorConfig::default());
        assert!(text.chars().count() <= 600);
        assert!(text.contains("\"found\": true"));
    }
}
