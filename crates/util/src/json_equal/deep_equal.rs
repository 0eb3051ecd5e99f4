use serde_json::{Number, Value};

/// Performs a deep equality check between two JSON values.
///
/// Numbers compare by numeric value regardless of representation, so
/// `1 == 1.0`. Object key order is ignored; array order is not.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use patchguard_util::json_equal::deep_equal;
///
/// assert!(deep_equal(&json!({"a": 1, "b": [1.0]}), &json!({"b": [1], "a": 1.0})));
/// assert!(!deep_equal(&json!([1, 2]), &json!([2, 1])));
/// ```
pub fn deep_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => numbers_equal(a, b),
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Array(arr_a), Value::Array(arr_b)) => {
            arr_a.len() == arr_b.len() && arr_a.iter().zip(arr_b).all(|(x, y)| deep_equal(x, y))
        }
        (Value::Object(obj_a), Value::Object(obj_b)) => {
            obj_a.len() == obj_b.len()
                && obj_a
                    .iter()
                    .all(|(key, val_a)| obj_b.get(key).is_some_and(|val_b| deep_equal(val_a, val_b)))
        }
        _ => false,
    }
}

/// Numeric equality across integer and float representations.
pub fn numbers_equal(a: &Number, b: &Number) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x == y;
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_primitives() {
        assert!(deep_equal(&json!(null), &json!(null)));
        assert!(deep_equal(&json!("a"), &json!("a")));
        assert!(!deep_equal(&json!(true), &json!(1)));
        assert!(!deep_equal(&json!(null), &json!(false)));
    }

    #[test]
    fn test_numeric_cross_type() {
        assert!(deep_equal(&json!(1), &json!(1.0)));
        assert!(deep_equal(&json!(-3), &json!(-3.0)));
        assert!(!deep_equal(&json!(1), &json!(1.5)));
        assert!(deep_equal(&json!(u64::MAX), &json!(u64::MAX)));
    }

    #[test]
    fn test_objects_ignore_key_order() {
        assert!(deep_equal(&json!({"a": 1, "b": 2}), &json!({"b": 2, "a": 1})));
        assert!(!deep_equal(&json!({"a": 1}), &json!({"a": 1, "b": 2})));
        assert!(!deep_equal(&json!({"a": 1}), &json!({"b": 1})));
    }

    #[test]
    fn test_arrays_keep_order() {
        assert!(deep_equal(&json!([1, [2, 3]]), &json!([1.0, [2, 3.0]])));
        assert!(!deep_equal(&json!([1, 2]), &json!([1, 2, 3])));
    }
}
