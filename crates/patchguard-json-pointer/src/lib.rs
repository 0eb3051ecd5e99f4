//! JSON Pointer (RFC 6901) utilities.
//!
//! Parsing is strict by default: apart from the root forms `""` and `"/"`,
//! a pointer must start with `/`. A lenient mode that tolerates a missing
//! leading slash and percent-encoded tokens is available for inbound paths
//! typed by hand.
//!
//! # Example
//!
//! ```
//! use patchguard_json_pointer::{format_json_pointer, get, parse_json_pointer};
//!
//! let path = parse_json_pointer("/foo/bar").unwrap();
//! assert_eq!(path, vec!["foo".to_string(), "bar".to_string()]);
//! assert_eq!(format_json_pointer(&path), "/foo/bar");
//!
//! let doc = serde_json::json!({"foo": {"bar": 42}});
//! assert_eq!(get(&doc, &path), Some(&serde_json::json!(42)));
//! ```

use thiserror::Error;

pub mod get;
pub mod util;
pub mod validate;

pub use get::{get, get_mut, resolve, resolve_parent_and_key, resolve_parent_and_key_mut};
pub use util::{
    append_token, escape_component, format_json_pointer, is_array_token, is_child,
    parse_array_index, parse_json_pointer, parse_json_pointer_lenient,
    percent_decode, unescape_component, ParseOptions,
};
pub use validate::{
    is_well_formed, validate_json_pointer, validate_path, MAX_PATH_LENGTH, MAX_POINTER_LENGTH,
};

/// A decoded JSON Pointer: the sequence of unescaped reference tokens.
pub type Path = Vec<String>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JsonPointerError {
    #[error("Invalid JSON Pointer (must start with \"/\"): {0}")]
    MissingLeadingSlash(String),
    #[error("JSON Pointer is longer than {} bytes", MAX_POINTER_LENGTH)]
    PointerTooLong,
    #[error("JSON Pointer has more than {} tokens", MAX_PATH_LENGTH)]
    PathTooLong,
}
