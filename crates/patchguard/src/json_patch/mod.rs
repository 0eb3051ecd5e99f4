//! JSON Patch (RFC 6902) operations: decoding, encoding and application.
//!
//! The six standard operations are supported: `add`, `remove`, `replace`,
//! `copy`, `move` and `test`. Application is purely structural; schema
//! checks live in [`crate::checker`].

pub mod types;
pub mod apply;
pub mod codec;

pub use types::{ApplyError, ErrorKind, OpDecodeError, Path, PatchError, PatchOp, PatchResult};
pub use apply::{apply_batch, apply_op, ensure_parent_chain};
pub use codec::json::{from_json, from_json_patch, to_json, to_json_patch};
