use serde_json::Value;

/// Counts the scalar leaves of a value.
///
/// A scalar (including `null`) counts as one; a container counts as the
/// sum over its children, so an empty container counts as zero.
///
/// ```
/// use patchguard_util::count_leaves;
/// use serde_json::json;
///
/// assert_eq!(count_leaves(&json!({"a": [1, 2], "b": {"c": null}, "d": []})), 3);
/// ```
pub fn count_leaves(value: &Value) -> usize {
    match value {
        Value::Array(arr) => arr.iter().map(count_leaves).sum(),
        Value::Object(obj) => obj.values().map(count_leaves).sum(),
        _ => 1,
    }
}
