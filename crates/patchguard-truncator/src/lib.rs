//! Bounded rendering of JSON values.
//!
//! [`render`] prints a value as indented text and, when that text is longer
//! than the budget, shrinks the value until it fits:
//!
//! 1. long strings are cut to one shared maximum length, the largest that
//!    fits (found by binary search);
//! 2. the deepest arrays lose items from the middle outwards, leaving a
//!    `...` marker, until they read `[...]`;
//! 3. the deepest objects lose keys the same way, until they read `{...}`.
//!
//! After any change the loop starts again from step 1. Shallow structure is
//! kept longest. When no step applies any more, a top-level container is
//! collapsed to its marker and a top-level string is cut to fit.
//!
//! The output is not JSON: dropped items render as `...`, and fully
//! collapsed containers as `[...]` and `{...}`.
//!
//! ```
//! use patchguard_truncator::{render, TruncatorConfig};
//! use serde_json::json;
//!
//! let value = json!({"tags": ["a", "b", "c", "d", "e"]});
//! let config = TruncatorConfig { indent_width: 2, ..Default::default() };
//! assert_eq!(
//!     render(&value, 55, &config),
//!     "{\n  \"tags\": [\n    \"a\",\n    \"b\",\n    ...\n    \"e\"\n  ]\n}"
//! );
//! ```

mod config;
mod node;
mod strategy;

pub use config::TruncatorConfig;

use serde_json::Value;

use node::Node;
use strategy::{
    clip, clip_strings, collapse_arrays_at, collapse_objects_at, deepest_array, deepest_object,
    longest_string,
};

/// Budget used when embedding documents in prompts and tool results.
pub const DEFAULT_RENDER_LIMIT: usize = 6000;

/// Renders `value` within `limit` chars using `config`.
pub fn render(value: &Value, limit: usize, config: &TruncatorConfig) -> String {
    Truncator::new(*config).render(value, limit)
}

/// Renders values under a char budget.
#[derive(Debug, Clone, Copy, Default)]
pub struct Truncator {
    config: TruncatorConfig,
}

impl Truncator {
    pub fn new(config: TruncatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TruncatorConfig {
        &self.config
    }

    /// Renders `value` without any truncation.
    pub fn render_full(&self, value: &Value) -> String {
        Node::from(value).render(self.config.indent_width)
    }

    /// Renders `value`, shrinking it until the text is at most `limit`
    /// chars long or nothing more can be dropped.
    pub fn render(&self, value: &Value, limit: usize) -> String {
        let width = self.config.indent_width;
        let mut node = Node::from(value);

        while node.size(width) > limit {
            if let Some(next) = self.shorten_strings(&node, limit) {
                node = next;
                continue;
            }
            if let Some(depth) = deepest_array(&node, 0) {
                log::debug!("collapsing arrays at depth {depth}");
                collapse_arrays_at(&mut node, 0, depth, self.config.min_array_items_for_collapse);
                continue;
            }
            if let Some(depth) = deepest_object(&node, 0) {
                log::debug!("collapsing objects at depth {depth}");
                collapse_objects_at(&mut node, 0, depth, self.config.min_object_keys_for_collapse);
                continue;
            }
            match self.collapse_root(&node, limit) {
                Some(next) => node = next,
                None => break,
            }
        }
        node.render(width)
    }

    /// Cuts long strings to a shared maximum length. Returns `None` when no
    /// string can be shortened.
    fn shorten_strings(&self, node: &Node, limit: usize) -> Option<Node> {
        let width = self.config.indent_width;
        let ellipsis = self.config.ellipsis_size;
        let min_len = self.config.min_string_len_for_truncation;
        let longest = longest_string(node, min_len)?;

        let mut base = node.clone();
        clip_strings(&mut base, min_len, ellipsis);
        if base == *node {
            return None;
        }
        if base.size(width) > limit {
            log::debug!("strings cut to {min_len} chars, still over {limit}");
            return Some(base);
        }

        let (mut low, mut high) = (min_len, longest);
        let mut best = base;
        while low <= high {
            let mid = low + (high - low) / 2;
            let mut attempt = node.clone();
            clip_strings(&mut attempt, mid, ellipsis);
            if attempt.size(width) <= limit {
                best = attempt;
                low = mid + 1;
            } else if mid == 0 {
                break;
            } else {
                high = mid - 1;
            }
        }
        Some(best)
    }

    /// Last resort once nothing nested can shrink.
    fn collapse_root(&self, node: &Node, limit: usize) -> Option<Node> {
        match node {
            Node::Array(items) if !items.is_empty() && !node.is_fully_collapsed() => {
                log::debug!("collapsing top-level array");
                Some(Node::Array(vec![Node::Elided]))
            }
            Node::Object(map) if !map.is_empty() && !node.is_fully_collapsed() => {
                log::debug!("collapsing top-level object");
                let mut collapsed = indexmap::IndexMap::new();
                collapsed.insert(node::Key::Elided, Node::Elided);
                Some(Node::Object(collapsed))
            }
            Node::Str(s) => {
                let width = self.config.indent_width;
                let fits = |keep: usize| Node::Str(clip(s, keep)).size(width) <= limit;
                if !fits(0) {
                    return Some(Node::Elided).filter(|elided| elided.size(width) <= limit);
                }
                let (mut low, mut high) = (0, s.chars().count());
                while low < high {
                    let mid = low + (high - low + 1) / 2;
                    if fits(mid) {
                        low = mid;
                    } else {
                        high = mid - 1;
                    }
                }
                Some(Node::Str(clip(s, low))).filter(|next| next != node)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn truncator() -> Truncator {
        Truncator::default()
    }

    #[test]
    fn fits_unchanged() {
        let value = json!({"name": "Alice", "tags": ["x", "y"]});
        let full = truncator().render_full(&value);
        assert_eq!(truncator().render(&value, full.len()), full);
        assert_eq!(truncator().render(&value, 10_000), full);
    }

    #[test]
    fn null_renders_as_null() {
        assert_eq!(truncator().render(&Value::Null, 100), "null");
    }

    #[test]
    fn strings_cut_to_largest_fitting_length() {
        let long = "abcdefghijklmnopqrstuvwxyz0123456789";
        let value = json!({"a": long, "b": long});
        let full = truncator().render_full(&value);
        let limit = full.len() - 10;
        let out = truncator().render(&value, limit);
        assert!(out.chars().count() <= limit);
        // both strings cut to 31 chars
        assert!(out.contains("\"abcdefghijklmnopqrstuvwxyz01...\""));
    }

    #[test]
    fn short_strings_are_never_cut() {
        let value = json!(["aaaaaaaaaaaaaaaaaaaaaaa", "bbbbbbbbbbbbbbbbbbbbbbb", "ccc"]);
        let out = truncator().render(&value, 40);
        assert!(!out.contains("a..."));
        assert!(out.chars().count() <= 40);
    }

    #[test]
    fn deep_detail_goes_first() {
        let value = json!({
            "sections": [
                {"title": "Intro", "fields": [1, 2, 3, 4, 5, 6, 7, 8]},
                {"title": "Body", "fields": [9, 10, 11, 12, 13, 14, 15, 16]}
            ]
        });
        let limit = truncator().render_full(&value).len() - 40;
        let out = truncator().render(&value, limit);
        assert!(out.chars().count() <= limit);
        assert!(out.contains("\"Intro\""));
        assert!(out.contains("\"Body\""));
        assert!(out.contains("..."));
    }

    #[test]
    fn tiny_budget_collapses_root() {
        let value = json!({"a": [1, 2, 3], "b": {"c": "d"}});
        assert_eq!(truncator().render(&value, 5), "{...}");
        assert_eq!(truncator().render(&json!([{"k": "v"}]), 5), "[...]");
    }

    #[test]
    fn top_level_string_is_cut_to_fit() {
        let value = json!("x".repeat(100));
        let out = truncator().render(&value, 12);
        assert_eq!(out, "\"xxxxxxx...\"");
        assert_eq!(truncator().render(&value, 4), "...");
    }
}
