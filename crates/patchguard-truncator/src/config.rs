use serde::{Deserialize, Serialize};

/// Tuning knobs for [`crate::render`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TruncatorConfig {
    /// Spaces per nesting level.
    pub indent_width: usize,
    /// Strings of at most this many chars are never shortened.
    pub min_string_len_for_truncation: usize,
    /// Chars reserved for the `...` marker when a string is cut.
    pub ellipsis_size: usize,
    /// A partially collapsed array with no more real items than this
    /// collapses to `[...]`.
    pub min_array_items_for_collapse: usize,
    /// A partially collapsed object with no more real keys than this
    /// collapses to `{...}`.
    pub min_object_keys_for_collapse: usize,
}

impl Default for TruncatorConfig {
    fn default() -> Self {
        Self {
            indent_width: 4,
            min_string_len_for_truncation: 23,
            ellipsis_size: 3,
            min_array_items_for_collapse: 2,
            min_object_keys_for_collapse: 2,
        }
    }
}
