//! Working tree for truncation and its text rendering.
//!
//! The tree mirrors a JSON value but can hold [`Node::Elided`] in place of
//! dropped array items and [`Key::Elided`] in place of dropped object keys.

use indexmap::IndexMap;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum Key {
    Name(String),
    Elided,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Node {
    Scalar(Value),
    Str(String),
    Array(Vec<Node>),
    Object(IndexMap<Key, Node>),
    Elided,
}

impl From<&Value> for Node {
    fn from(value: &Value) -> Self {
        match value {
            Value::String(s) => Node::Str(s.clone()),
            Value::Array(items) => Node::Array(items.iter().map(Node::from).collect()),
            Value::Object(map) => Node::Object(
                map.iter()
                    .map(|(k, v)| (Key::Name(k.clone()), Node::from(v)))
                    .collect(),
            ),
            scalar => Node::Scalar(scalar.clone()),
        }
    }
}

impl Node {
    pub(crate) fn is_elided(&self) -> bool {
        matches!(self, Node::Elided)
    }

    /// Whether this is `[...]` or `{...}`.
    pub(crate) fn is_fully_collapsed(&self) -> bool {
        match self {
            Node::Array(items) => items.len() == 1 && items[0].is_elided(),
            Node::Object(map) => map.len() == 1 && map.contains_key(&Key::Elided),
            _ => false,
        }
    }

    /// Rendered length in chars.
    pub(crate) fn size(&self, indent_width: usize) -> usize {
        self.render(indent_width).chars().count()
    }

    pub(crate) fn render(&self, indent_width: usize) -> String {
        let mut out = String::new();
        self.write(indent_width, 0, &mut out);
        out
    }

    fn write(&self, indent_width: usize, level: usize, out: &mut String) {
        match self {
            Node::Elided => out.push_str("..."),
            Node::Str(s) => out.push_str(&Value::String(s.clone()).to_string()),
            Node::Scalar(v) => out.push_str(&v.to_string()),
            Node::Array(items) if items.is_empty() => out.push_str("[]"),
            Node::Object(map) if map.is_empty() => out.push_str("{}"),
            Node::Array(_) | Node::Object(_) if self.is_fully_collapsed() => {
                out.push_str(if matches!(self, Node::Array(_)) { "[...]" } else { "{...}" });
            }
            Node::Array(items) => {
                out.push_str("[\n");
                for (i, item) in items.iter().enumerate() {
                    // No comma after a `...` marker.
                    if i > 0 {
                        out.push_str(if items[i - 1].is_elided() { "\n" } else { ",\n" });
                    }
                    indent(indent_width, level + 1, out);
                    item.write(indent_width, level + 1, out);
                }
                out.push('\n');
                indent(indent_width, level, out);
                out.push(']');
            }
            Node::Object(map) => {
                out.push_str("{\n");
                let mut previous_elided = false;
                for (i, (key, val)) in map.iter().enumerate() {
                    if i > 0 {
                        out.push_str(if previous_elided { "\n" } else { ",\n" });
                    }
                    indent(indent_width, level + 1, out);
                    match key {
                        Key::Elided => out.push_str("..."),
                        Key::Name(name) => {
                            out.push_str(&Value::String(name.clone()).to_string());
                            out.push_str(": ");
                            val.write(indent_width, level + 1, out);
                        }
                    }
                    previous_elided = *key == Key::Elided || val.is_elided();
                }
                out.push('\n');
                indent(indent_width, level, out);
                out.push('}');
            }
        }
    }
}

fn indent(width: usize, level: usize, out: &mut String) {
    out.extend(std::iter::repeat(' ').take(width * level));
}
