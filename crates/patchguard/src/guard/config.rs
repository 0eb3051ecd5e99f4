use serde::{Deserialize, Serialize};

/// Thresholds of the destructive-edit heuristics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GuardConfig {
    /// The shrinkage guard only looks at documents with more leaves than this.
    pub shrinkage_min_items: usize,
    /// A batch may not leave fewer than this fraction of the leaves.
    pub shrinkage_ratio: f64,
    /// An object `replace` is checked for data loss above this many leaves.
    pub data_loss_min_items: usize,
    /// Removing an object with more leaves than this is refused when the
    /// pointer is at most `remove_object_max_depth` tokens deep.
    pub remove_object_min_leaves: usize,
    pub remove_object_max_depth: usize,
    /// A scalar may not replace a container with more leaves than this.
    pub type_downgrade_min_leaves: usize,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            shrinkage_min_items: 10,
            shrinkage_ratio: 0.5,
            data_loss_min_items: 5,
            remove_object_min_leaves: 2,
            remove_object_max_depth: 3,
            type_downgrade_min_leaves: 1,
        }
    }
}
