//! A practical JSON Schema subset: `$ref` resolution, candidate sub-schema
//! expansion at a document pointer, and a validator covering `anyOf`,
//! `allOf`, `oneOf`, `enum`, `type`, string formats and patterns, numeric
//! bounds, `items`, `required`, `properties` and `additionalProperties`.
//!
//! # Example
//!
//! ```
//! use patchguard_json_schema::Validator;
//! use serde_json::json;
//!
//! let schema = json!({
//!     "type": "object",
//!     "properties": {"age": {"type": "integer", "minimum": 0}},
//!     "required": ["age"]
//! });
//! let validator = Validator::new(&schema);
//! assert!(validator.validate_document(&json!({"age": 30})).is_empty());
//!
//! let errors = validator.validate_document(&json!({"age": -1}));
//! assert_eq!(errors[0].to_string(), "/age: number < minimum (0)");
//! ```

pub mod candidates;
pub mod formats;
pub mod resolver;
pub mod skeleton;
pub mod validator;

pub use candidates::{
    candidates_at_pointer, candidates_for_index, candidates_for_property, declared_types,
    is_permissive, is_property_allowed, is_required_by,
};
pub use formats::validate_format;
pub use resolver::{
    inline_refs, is_unresolved, lookup_ref, ref_of, resolve_ref, MAX_REF_DEPTH, PERMISSIVE,
};
pub use skeleton::{merge_skeleton, skeleton_from_schema};
pub use validator::{validate, ValidationError, Validator};
