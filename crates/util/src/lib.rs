//! patchguard-util - JSON value helpers shared by the patchguard crates.

pub mod json_equal;
pub mod json_leaves;
pub mod json_stable;
pub mod strings;
pub mod types;

pub use json_equal::{deep_equal, numbers_equal};
pub use json_leaves::count_leaves;
pub use json_stable::stringify as canonical_json;
pub use strings::{clip_chars, escape, levenshtein};
pub use types::{is_integral, json_type_name, schema_type_name};
