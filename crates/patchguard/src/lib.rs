//! patchguard: guarded JSON Patch application.
//!
//! A caller (typically a language model driving structured edits) submits
//! batches of RFC 6902 operations against a JSON document. Each batch is
//! screened for destructive edits, stripped of duplicate appends, checked
//! operation by operation against an optional JSON Schema, applied, and
//! finally compared with the original for large losses of data.
//!
//! ```
//! use patchguard::{guarded_apply, GuardConfig};
//! use serde_json::json;
//!
//! let doc = json!({"users": []});
//! let patches = [json!({"op": "add", "path": "/users/-", "value": {"name": "Alice"}})];
//! let out = guarded_apply(&doc, &patches, None, &GuardConfig::default());
//! assert!(out.is_ok());
//! assert_eq!(out.result.final_doc, json!({"users": [{"name": "Alice"}]}));
//! ```

pub mod checker;
pub mod guard;
pub mod inspect;
pub mod json_patch;
pub mod pipeline;

pub use checker::{apply_patches, MAX_POST_ERRORS_SHOWN};
pub use guard::{check_shrinkage, filter_duplicate_appends, pre_validate, pre_validate_with, GuardConfig};
pub use inspect::{inspect_keys, read_value, search_pointer};
pub use json_patch::{ErrorKind, PatchError, PatchOp, PatchResult};
pub use pipeline::{guarded_apply, GuardedResult};

pub use patchguard_truncator::{render, TruncatorConfig, DEFAULT_RENDER_LIMIT};
