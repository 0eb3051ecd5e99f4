use serde_json::Value;

/// The JSON type of a value: `null`, `boolean`, `number`, `string`,
/// `array` or `object`.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Like [`json_type_name`], but integral numbers (`3`, `3.0`) are
/// reported as `integer`.
pub fn schema_type_name(value: &Value) -> &'static str {
    match value {
        Value::Number(n) if is_integral(n) => "integer",
        other => json_type_name(other),
    }
}

/// Whether a number has no fractional part.
pub fn is_integral(n: &serde_json::Number) -> bool {
    if n.is_i64() || n.is_u64() {
        return true;
    }
    n.as_f64().is_some_and(|f| f.is_finite() && f.fract() == 0.0)
}
