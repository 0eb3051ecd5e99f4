//! Post-apply detection of batches that drop most of the document.

use patchguard_util::count_leaves;
use serde_json::Value;

use super::GuardConfig;
use crate::json_patch::{ErrorKind, PatchError};

/// Whole-number percentage of `before` that is gone in `after`.
pub(crate) fn loss_percent(before: usize, after: usize) -> usize {
    let kept = (after as f64 / before as f64 * 100.0) as usize;
    100usize.saturating_sub(kept)
}

/// Compares leaf counts before and after a successful batch.
///
/// Returns a batch-level error when a document with more than
/// `shrinkage_min_items` leaves would keep fewer than `shrinkage_ratio`
/// of them.
pub fn check_shrinkage(before: &Value, after: &Value, config: &GuardConfig) -> Option<PatchError> {
    let old = count_leaves(before);
    let new = count_leaves(after);
    if old <= config.shrinkage_min_items || (new as f64) >= old as f64 * config.shrinkage_ratio {
        return None;
    }
    Some(PatchError::batch(
        format!(
            "SHRINKAGE GUARD: patches would reduce document from {old} to {new} values ({}% data loss). \
             This likely means you replaced a container instead of appending. \
             Use \"/-\" to append to arrays, or update individual fields instead of replacing objects.",
            loss_percent(old, new)
        ),
        ErrorKind::GuardRejection,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn leaves(n: usize) -> Value {
        Value::Array((0..n).map(|i| json!(i)).collect())
    }

    #[test]
    fn boundary_at_half() {
        let config = GuardConfig::default();
        let err = check_shrinkage(&leaves(11), &leaves(5), &config).unwrap();
        assert!(err.message.starts_with("SHRINKAGE GUARD: patches would reduce document from 11 to 5 values (55% data loss)."));
        assert_eq!(err.op_index, -1);
        assert!(check_shrinkage(&leaves(11), &leaves(6), &config).is_none());
    }

    #[test]
    fn small_documents_are_exempt() {
        assert!(check_shrinkage(&leaves(10), &leaves(0), &GuardConfig::default()).is_none());
    }

    #[test]
    fn percent_is_truncated() {
        assert_eq!(loss_percent(11, 5), 55);
        assert_eq!(loss_percent(12, 1), 92);
        assert_eq!(loss_percent(3, 0), 100);
    }
}
