//! Depth-first search for keys or scalar values, returning pointers.

use patchguard_json_pointer::append_token;
use patchguard_util::strings::char_len;
use patchguard_util::{json_type_name, levenshtein};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Strings longer than this (after normalisation) are only matched by
/// equality or containment.
const FUZZY_MAX_LEN: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchKind {
    Key,
    #[default]
    Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    pub query: String,
    #[serde(rename = "type")]
    pub kind: SearchKind,
    pub fuzzy_match: bool,
    pub include_pointers: bool,
    /// Unbounded when absent.
    pub limit: Option<usize>,
    pub max_value_length: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            query: String::new(),
            kind: SearchKind::Value,
            fuzzy_match: false,
            include_pointers: false,
            limit: None,
            max_value_length: 120,
        }
    }
}

impl SearchOptions {
    pub fn value(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn key(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            kind: SearchKind::Key,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SearchMatch {
    Key {
        pointer: String,
        key: String,
    },
    Value {
        pointer: String,
        value: Value,
        #[serde(rename = "valueType")]
        value_type: &'static str,
        #[serde(rename = "valueTruncated")]
        value_truncated: bool,
    },
}

impl SearchMatch {
    pub fn pointer(&self) -> &str {
        match self {
            SearchMatch::Key { pointer, .. } | SearchMatch::Value { pointer, .. } => pointer,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub matches: Vec<SearchMatch>,
    pub count: usize,
    /// Set once the limit stopped the walk.
    pub truncated: bool,
    pub limit: Option<usize>,
    pub max_value_length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pointers: Option<Vec<String>>,
}

/// Searches `document` for keys or scalar values matching the query.
///
/// Object members are visited in document order; each member's key is
/// checked before its value, and a container is searched before its next
/// sibling.
pub fn search_pointer(document: &Value, options: &SearchOptions) -> SearchResult {
    let mut search = Search {
        options,
        matches: Vec::new(),
        truncated: false,
    };
    search.visit(document, "");

    let pointers = options
        .include_pointers
        .then(|| search.matches.iter().map(|m| m.pointer().to_string()).collect());
    SearchResult {
        count: search.matches.len(),
        matches: search.matches,
        truncated: search.truncated,
        limit: options.limit,
        max_value_length: options.max_value_length,
        pointers,
    }
}

struct Search<'o> {
    options: &'o SearchOptions,
    matches: Vec<SearchMatch>,
    truncated: bool,
}

impl Search<'_> {
    fn full(&mut self) -> bool {
        let full = self.options.limit.is_some_and(|limit| self.matches.len() >= limit);
        if full {
            self.truncated = true;
        }
        full
    }

    fn visit(&mut self, node: &Value, pointer: &str) {
        if self.full() {
            return;
        }
        match node {
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    if self.full() {
                        break;
                    }
                    let child = append_token(pointer, &i.to_string());
                    self.collect_value(item, &child);
                    self.visit(item, &child);
                }
            }
            Value::Object(map) => {
                for (key, value) in map {
                    if self.full() {
                        break;
                    }
                    let child = append_token(pointer, key);
                    self.collect_key(key, &child);
                    self.collect_value(value, &child);
                    self.visit(value, &child);
                }
            }
            _ => {}
        }
    }

    fn collect_key(&mut self, key: &str, pointer: &str) {
        if self.options.kind != SearchKind::Key || !self.matches_query(key) || self.full() {
            return;
        }
        self.matches.push(SearchMatch::Key {
            pointer: pointer.to_string(),
            key: key.to_string(),
        });
    }

    fn collect_value(&mut self, value: &Value, pointer: &str) {
        if self.options.kind != SearchKind::Value || self.full() {
            return;
        }
        let Some(comparable) = comparable_string(value) else {
            return;
        };
        if !self.matches_query(&comparable) {
            return;
        }
        let max = self.options.max_value_length;
        let (stored, value_truncated) = match value {
            Value::String(s) if char_len(s) > max => {
                let kept: String = s.chars().take(max).collect();
                (Value::String(format!("{kept}\u{2026}")), true)
            }
            other => (other.clone(), false),
        };
        self.matches.push(SearchMatch::Value {
            pointer: pointer.to_string(),
            value: stored,
            value_type: json_type_name(value),
            value_truncated,
        });
    }

    fn matches_query(&self, candidate: &str) -> bool {
        if self.options.fuzzy_match {
            fuzzy_match(candidate, &self.options.query)
        } else {
            candidate == self.options.query
        }
    }
}

/// The text a scalar is compared as. Containers have none.
fn comparable_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some("null".to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// Decomposes, drops combining marks, lowercases and trims.
fn normalize_for_match(s: &str) -> String {
    let folded: String = s.nfd().filter(|c| !is_combining_mark(*c)).collect();
    folded.to_lowercase().trim().to_string()
}

fn fuzzy_match(a: &str, b: &str) -> bool {
    let a = normalize_for_match(a);
    let b = normalize_for_match(b);
    if a.contains(&b) || b.contains(&a) {
        return true;
    }
    let (len_a, len_b) = (char_len(&a), char_len(&b));
    if len_a.max(len_b) > FUZZY_MAX_LEN {
        return false;
    }
    // floor(0.34 * n) without going through floats
    let threshold = (len_a.min(len_b) * 34 / 100).clamp(1, 3);
    levenshtein(&a, &b) <= threshold
}
