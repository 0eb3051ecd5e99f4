//! Drops array appends whose item is already present.
//!
//! Re-submitting an addition that was already applied is a common retry
//! pattern; filtering it makes the retry a no-op instead of a duplicate.

use std::collections::{HashMap, HashSet};

use log::info;
use patchguard_util::{canonical_json, clip_chars};
use serde_json::Value;

use super::resolve_lenient;

const PREVIEW_CHARS: usize = 120;

/// Splits `patches` into the ones to apply and skip messages for the
/// dropped duplicates.
///
/// Only `add` operations whose path ends in `/-` are considered. Items are
/// compared by their canonical (key-sorted) serialization against the
/// target array's current items and against items queued earlier in the
/// same batch.
pub fn filter_duplicate_appends(patches: &[Value], document: &Value) -> (Vec<Value>, Vec<String>) {
    let mut existing: HashMap<&str, HashSet<String>> = HashMap::new();
    let mut queued: HashMap<&str, HashSet<String>> = HashMap::new();
    let mut kept = Vec::with_capacity(patches.len());
    let mut skipped = Vec::new();

    for patch in patches {
        let append_to = patch
            .get("op")
            .and_then(Value::as_str)
            .filter(|op| *op == "add")
            .and_then(|_| patch.get("path").and_then(Value::as_str))
            .and_then(|path| path.strip_suffix("/-").map(|array| (path, array)));
        let Some((path, array_path)) = append_to else {
            kept.push(patch.clone());
            continue;
        };

        let canonical = canonical_json(patch.get("value").unwrap_or(&Value::Null));
        let present = existing.entry(array_path).or_insert_with(|| match resolve_lenient(document, array_path) {
            Some(Value::Array(items)) => items.iter().map(canonical_json).collect(),
            _ => HashSet::new(),
        });
        let batch = queued.entry(array_path).or_default();

        if present.contains(&canonical) || batch.contains(&canonical) {
            info!("skipping duplicate append at {path}");
            skipped.push(format!(
                "DUPLICATE SKIPPED at \"{path}\": identical item already exists in the array. Preview: {}",
                clip_chars(&canonical, PREVIEW_CHARS)
            ));
            continue;
        }
        batch.insert(canonical);
        kept.push(patch.clone());
    }
    (kept, skipped)
}
