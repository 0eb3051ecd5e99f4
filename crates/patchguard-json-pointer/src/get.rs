use serde_json::Value;

use crate::util::{parse_array_index, parse_json_pointer};
use crate::JsonPointerError;

/// Get a value from a JSON document by path.
///
/// Returns `None` when any step misses: a missing key, an out-of-range or
/// non-numeric array token, `-`, or a step into a scalar.
///
/// # Example
///
/// ```
/// use patchguard_json_pointer::get;
/// use serde_json::json;
///
/// let doc = json!({"foo": {"bar": [10, 20]}});
/// let path = vec!["foo".to_string(), "bar".to_string(), "1".to_string()];
/// assert_eq!(get(&doc, &path), Some(&json!(20)));
/// assert_eq!(get(&doc, &["foo".to_string(), "bar".to_string(), "-".to_string()]), None);
/// ```
pub fn get<'a>(val: &'a Value, path: &[String]) -> Option<&'a Value> {
    let mut current = val;
    for step in path {
        current = step_into(current, step)?;
    }
    Some(current)
}

/// Get a mutable reference to a value in a JSON document by path.
pub fn get_mut<'a>(val: &'a mut Value, path: &[String]) -> Option<&'a mut Value> {
    let mut current = val;
    for step in path {
        current = match current {
            Value::Array(arr) => arr.get_mut(parse_array_index(step)?)?,
            Value::Object(map) => map.get_mut(step.as_str())?,
            _ => return None,
        };
    }
    Some(current)
}

/// Resolves a pointer string against a document.
///
/// # Errors
///
/// Fails only when the pointer cannot be parsed; an unresolvable pointer
/// is `Ok(None)`.
pub fn resolve<'a>(doc: &'a Value, pointer: &str) -> Result<Option<&'a Value>, JsonPointerError> {
    let path = parse_json_pointer(pointer)?;
    Ok(get(doc, &path))
}

fn step_into<'a>(current: &'a Value, step: &str) -> Option<&'a Value> {
    match current {
        Value::Array(arr) => arr.get(parse_array_index(step)?),
        Value::Object(map) => map.get(step),
        _ => None,
    }
}

/// Returns the container holding the last path step, and that step.
///
/// `None` for the root path or when the container does not resolve.
pub fn resolve_parent_and_key<'a, 'p>(
    doc: &'a Value,
    path: &'p [String],
) -> Option<(&'a Value, &'p str)> {
    let (key, parent_path) = path.split_last()?;
    let parent = get(doc, parent_path)?;
    Some((parent, key.as_str()))
}

/// Mutable variant of [`resolve_parent_and_key`].
pub fn resolve_parent_and_key_mut<'a, 'p>(
    doc: &'a mut Value,
    path: &'p [String],
) -> Option<(&'a mut Value, &'p str)> {
    let (key, parent_path) = path.split_last()?;
    let parent = get_mut(doc, parent_path)?;
    Some((parent, key.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(s: &str) -> Vec<String> {
        parse_json_pointer(s).unwrap()
    }

    #[test]
    fn test_get_scalar_root() {
        assert_eq!(get(&json!(123), &[]), Some(&json!(123)));
    }

    #[test]
    fn test_get_object_key() {
        let doc = json!({"foo": "bar", "nothing": null});
        assert_eq!(get(&doc, &path("/foo")), Some(&json!("bar")));
        assert_eq!(get(&doc, &path("/nothing")), Some(&Value::Null));
        assert_eq!(get(&doc, &path("/missing")), None);
    }

    #[test]
    fn test_get_array_bounds() {
        let doc = json!([1, 2, 3]);
        assert_eq!(get(&doc, &path("/0")), Some(&json!(1)));
        assert_eq!(get(&doc, &path("/3")), None);
        assert_eq!(get(&doc, &path("/-")), None);
        assert_eq!(get(&doc, &path("/x")), None);
        assert_eq!(get(&doc, &path("/-1")), None);
    }

    #[test]
    fn test_get_through_scalar() {
        let doc = json!({"a": 1, "b": null});
        assert_eq!(get(&doc, &path("/a/b")), None);
        assert_eq!(get(&doc, &path("/b/0")), None);
    }

    #[test]
    fn test_resolve_reports_parse_errors() {
        let doc = json!({"a": {"b": 2}});
        assert_eq!(resolve(&doc, "/a/b").unwrap(), Some(&json!(2)));
        assert_eq!(resolve(&doc, "/a/c").unwrap(), None);
        assert_eq!(resolve(&doc, "/").unwrap(), Some(&doc));
        assert!(resolve(&doc, "a/b").is_err());
    }

    #[test]
    fn test_get_mut_updates_in_place() {
        let mut doc = json!({"a": [{"b": 1}]});
        *get_mut(&mut doc, &path("/a/0/b")).unwrap() = json!(2);
        assert_eq!(doc, json!({"a": [{"b": 2}]}));
    }

    #[test]
    fn test_parent_and_key() {
        let doc = json!({"a": {"b": [1]}});
        let p = path("/a/b/0");
        let (parent, key) = resolve_parent_and_key(&doc, &p).unwrap();
        assert_eq!(parent, &json!([1]));
        assert_eq!(key, "0");
        assert!(resolve_parent_and_key(&doc, &[]).is_none());
        assert!(resolve_parent_and_key(&doc, &path("/x/y")).is_none());
    }
}
