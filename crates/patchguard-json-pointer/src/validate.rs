//! Validation functions for JSON Pointer.

use crate::JsonPointerError;

/// Maximum allowed pointer string length.
pub const MAX_POINTER_LENGTH: usize = 1024;

/// Maximum allowed path depth.
pub const MAX_PATH_LENGTH: usize = 256;

/// Validate a JSON Pointer string.
///
/// # Example
///
/// ```
/// use patchguard_json_pointer::validate_json_pointer;
///
/// validate_json_pointer("").unwrap();
/// validate_json_pointer("/").unwrap();
/// validate_json_pointer("/foo/bar").unwrap();
/// validate_json_pointer("foo").unwrap_err();
/// ```
pub fn validate_json_pointer(pointer: &str) -> Result<(), JsonPointerError> {
    if pointer.is_empty() {
        return Ok(());
    }
    if !pointer.starts_with('/') {
        return Err(JsonPointerError::MissingLeadingSlash(pointer.to_string()));
    }
    if pointer.len() > MAX_POINTER_LENGTH {
        return Err(JsonPointerError::PointerTooLong);
    }
    Ok(())
}

/// Validate a decoded path.
pub fn validate_path(path: &[String]) -> Result<(), JsonPointerError> {
    if path.len() > MAX_PATH_LENGTH {
        return Err(JsonPointerError::PathTooLong);
    }
    Ok(())
}

/// Whether `pointer` is a syntactically valid JSON Pointer: empty, or
/// starting with `/` and with every `~` followed by `0` or `1`.
pub fn is_well_formed(pointer: &str) -> bool {
    if pointer.is_empty() {
        return true;
    }
    if !pointer.starts_with('/') {
        return false;
    }
    let bytes = pointer.as_bytes();
    bytes
        .iter()
        .enumerate()
        .filter(|(_, &b)| b == b'~')
        .all(|(i, _)| matches!(bytes.get(i + 1), Some(b'0') | Some(b'1')))
}
