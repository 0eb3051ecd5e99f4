//! Heuristics that reject a batch before any operation is applied.
//!
//! Each check looks for a pattern that is schema-valid but almost always
//! a mistake by an automated caller: replacing an array it meant to append
//! to, swapping a populated object for a scalar, or deleting a container
//! full of data. Every patch yields at most one error; the first failing
//! check wins.

use patchguard_util::{clip_chars, count_leaves, json_type_name};
use serde_json::Value;

use super::{resolve_lenient, GuardConfig};
use crate::json_patch::{ErrorKind, PatchError};

/// Runs the checks with the default thresholds.
pub fn pre_validate(patches: &[Value], document: &Value) -> Vec<PatchError> {
    pre_validate_with(patches, document, &GuardConfig::default())
}

pub fn pre_validate_with(patches: &[Value], document: &Value, config: &GuardConfig) -> Vec<PatchError> {
    patches
        .iter()
        .enumerate()
        .filter(|(_, patch)| patch.is_object())
        .filter_map(|(i, patch)| {
            check_patch(patch, document, config).map(|(message, kind)| {
                let path = patch.get("path").and_then(Value::as_str).unwrap_or_default();
                PatchError::new(i, patch, path, message, kind)
            })
        })
        .collect()
}

fn check_patch(patch: &Value, document: &Value, config: &GuardConfig) -> Option<(String, ErrorKind)> {
    let op = patch.get("op").and_then(Value::as_str).unwrap_or_default();
    let path = patch.get("path").and_then(Value::as_str).unwrap_or_default();
    let value = patch.get("value").unwrap_or(&Value::Null);

    if !path.is_empty() && !path.starts_with('/') {
        return Some((
            format!("Invalid JSON Pointer: \"{path}\" must start with \"/\". Did you mean \"/{path}\"?"),
            ErrorKind::PointerError,
        ));
    }
    let guard = |message: Option<String>| message.map(|m| (m, ErrorKind::GuardRejection));

    // Root forms never reach the container checks below.
    let current = if path.is_empty() { None } else { resolve_lenient(document, path) };

    match op {
        "add" => {
            if let Some(Value::Array(items)) = current {
                return guard(Some(add_over_array(path, items.len(), value)));
            }
            if path.is_empty() || path == "/" {
                let existing = count_leaves(document);
                if existing > 0 {
                    return guard(Some(format!(
                        "DESTRUCTIVE: \"add\" at root would REPLACE the entire document ({existing} existing values). \
                         Add to specific paths instead (e.g., /metadata, /sections/-)."
                    )));
                }
            }
        }
        "replace" => {
            if let Some(message) = current.and_then(|cur| replace_container(path, cur, value, config)) {
                return guard(Some(message));
            }
        }
        "remove" => {
            if let Some(message) = current.and_then(|cur| remove_container(path, cur, config)) {
                return guard(Some(message));
            }
        }
        _ => return None,
    }

    if matches!(op, "add" | "replace") {
        return guard(current.and_then(|cur| type_downgrade(path, cur, value, config)));
    }
    None
}

fn add_over_array(path: &str, n: usize, value: &Value) -> String {
    match value {
        Value::Array(items) => format!(
            "DESTRUCTIVE OVERWRITE: \"{path}\" already contains an array with {n} items. \
             Your \"add\" would REPLACE ALL existing data with a new array of {} items. \
             To APPEND items, use \"{path}/-\" for each: \
             [{{\"op\":\"add\",\"path\":\"{path}/-\",\"value\":item1}}, ...]",
            items.len()
        ),
        Value::Object(_) => format!(
            "DESTRUCTIVE OVERWRITE: \"{path}\" already contains an array with {n} items. \
             Your \"add\" would REPLACE the entire array with a single object. \
             To APPEND, use \"{path}/-\": {{\"op\":\"add\",\"path\":\"{path}/-\",\"value\":{{...}}}}"
        ),
        scalar => format!(
            "TYPE DOWNGRADE: \"{path}\" already contains an array with {n} items. \
             Your \"add\" would REPLACE the entire array with a {}. \
             To APPEND, use \"{path}/-\": {{\"op\":\"add\",\"path\":\"{path}/-\",\"value\":...}}",
            json_type_name(scalar)
        ),
    }
}

fn replace_container(path: &str, current: &Value, value: &Value, config: &GuardConfig) -> Option<String> {
    match current {
        Value::Array(items) if !items.is_empty() => Some(format!(
            "DESTRUCTIVE REPLACE: \"{path}\" is an array with {} items. \
             Replacing it would DISCARD all existing data. \
             To update specific items, use \"replace\" on individual indices (e.g., \"{path}/0/value\"). \
             To append new items, use \"add\" with \"{path}/-\".",
            items.len()
        )),
        Value::Object(map) if !map.is_empty() => {
            let nested = count_leaves(current);
            match value {
                Value::Array(_) => None,
                Value::Object(_) => {
                    let new = count_leaves(value);
                    let shrinks = (new as f64) < nested as f64 * config.shrinkage_ratio;
                    (shrinks && nested > config.data_loss_min_items).then(|| {
                        format!(
                            "SIGNIFICANT DATA LOSS: replacing \"{path}\" would reduce content from {nested} to {new} values \
                             ({}% loss). Consider updating individual fields instead.",
                            super::shrinkage::loss_percent(nested, new)
                        )
                    })
                }
                scalar => Some(format!(
                    "TYPE DOWNGRADE: \"{path}\" is an object with {} keys ({nested} nested values). \
                     Replacing it with a {} would DESTROY all nested data. \
                     To update a specific field, use \"{path}/fieldName\" as the path.",
                    map.len(),
                    json_type_name(scalar)
                )),
            }
        }
        _ => None,
    }
}

fn remove_container(path: &str, current: &Value, config: &GuardConfig) -> Option<String> {
    let depth = path.split('/').count() - 1;
    let nested = count_leaves(current);
    match current {
        Value::Array(items) if !items.is_empty() => Some(format!(
            "DATA LOSS WARNING: removing \"{path}\" would delete an array with {} items ({nested} total nested values). \
             If you need to remove specific items, use their full path (e.g., \"{path}/0\").",
            items.len()
        )),
        Value::Object(map) if nested > config.remove_object_min_leaves && depth <= config.remove_object_max_depth => {
            Some(format!(
                "DATA LOSS WARNING: removing \"{path}\" would delete an object with {} keys ({nested} total nested values). \
                 If you need to remove specific fields, use their full path (e.g., \"{path}/fieldName\").",
                map.len()
            ))
        }
        _ => None,
    }
}

fn type_downgrade(path: &str, current: &Value, value: &Value, config: &GuardConfig) -> Option<String> {
    let kind = match current {
        Value::Array(_) => "array",
        Value::Object(_) => "object",
        _ => return None,
    };
    if value.is_null() || value.is_array() || value.is_object() {
        return None;
    }
    let nested = count_leaves(current);
    if nested <= config.type_downgrade_min_leaves {
        return None;
    }
    let shown = value.to_string();
    Some(format!(
        "TYPE DOWNGRADE: \"{path}\" is a {kind} with {nested} nested values. \
         Replacing it with a {} ({}) would DESTROY all nested data. Update specific fields instead.",
        json_type_name(value),
        clip_chars(&shown, 60)
    ))
}
