//! Core types for patch application and its diagnostics.

use patchguard_json_pointer::JsonPointerError;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

pub use patchguard_json_pointer::Path;

// ── Errors ────────────────────────────────────────────────────────────────

/// Failure applying one structurally valid operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApplyError {
    #[error("{op} failed: {pointer} does not exist")]
    PathNotFound { op: &'static str, pointer: String },
    #[error("{op} in array: invalid index: {token}")]
    InvalidIndex { op: &'static str, token: String },
    #[error("{op}: parent is not object/array at {pointer}")]
    InvalidTarget { op: &'static str, pointer: String },
    #[error("remove at root is not allowed")]
    RootRemoval,
    #[error("test failed: value differs at {pointer}")]
    TestFailed { pointer: String },
    #[error("{op} failed: from={from} does not exist")]
    FromNotFound { op: &'static str, from: String },
    #[error("move failed: cannot move {from} into its own child {path}")]
    MoveIntoChild { from: String, path: String },
}

/// Failure decoding a wire operation into a [`PatchOp`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OpDecodeError {
    #[error("invalid operation (not an object)")]
    NotAnObject,
    #[error("invalid operation (missing op/path)")]
    MissingOpOrPath,
    #[error("operation \"{0}\" requires field \"value\"")]
    MissingValue(String),
    #[error("operation \"{0}\" requires field \"from\"")]
    MissingFrom(String),
    #[error("Operation not supported: {0}")]
    Unsupported(String),
    #[error(transparent)]
    Pointer(#[from] JsonPointerError),
}

/// Category of a [`PatchError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed or unresolvable path.
    PointerError,
    /// Structurally invalid operation, or a failure applying it.
    PatchOpError,
    /// The operation's value does not fit the schema at its target.
    SchemaViolation,
    /// Rejected by a guard heuristic.
    GuardRejection,
    /// The whole document stopped validating after the operation.
    PostConditionViolation,
}

// ── Op enum ───────────────────────────────────────────────────────────────

/// An RFC 6902 operation with decoded paths.
#[derive(Debug, Clone, PartialEq)]
pub enum PatchOp {
    Add { path: Path, value: Value },
    Remove { path: Path },
    Replace { path: Path, value: Value },
    Copy { path: Path, from: Path },
    Move { path: Path, from: Path },
    Test { path: Path, value: Value },
}

impl PatchOp {
    pub fn op_name(&self) -> &'static str {
        match self {
            PatchOp::Add { .. } => "add",
            PatchOp::Remove { .. } => "remove",
            PatchOp::Replace { .. } => "replace",
            PatchOp::Copy { .. } => "copy",
            PatchOp::Move { .. } => "move",
            PatchOp::Test { .. } => "test",
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            PatchOp::Add { path, .. }
            | PatchOp::Remove { path }
            | PatchOp::Replace { path, .. }
            | PatchOp::Copy { path, .. }
            | PatchOp::Move { path, .. }
            | PatchOp::Test { path, .. } => path,
        }
    }

    /// The literal value carried by `add`, `replace` and `test`.
    pub fn value(&self) -> Option<&Value> {
        match self {
            PatchOp::Add { value, .. } | PatchOp::Replace { value, .. } | PatchOp::Test { value, .. } => {
                Some(value)
            }
            _ => None,
        }
    }
}

// ── Result types ──────────────────────────────────────────────────────────

/// One diagnostic produced while processing a batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchError {
    /// Index of the offending operation, or `-1` for batch-level errors.
    pub op_index: i64,
    /// The operation as submitted.
    pub op: Option<Value>,
    pub pointer: String,
    pub message: String,
    #[serde(skip)]
    pub kind: ErrorKind,
}

impl PatchError {
    pub fn new(op_index: usize, op: &Value, pointer: impl Into<String>, message: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            op_index: i64::try_from(op_index).unwrap_or(i64::MAX),
            op: Some(op.clone()),
            pointer: pointer.into(),
            message: message.into(),
            kind,
        }
    }

    /// An error about the batch as a whole.
    pub fn batch(message: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            op_index: -1,
            op: None,
            pointer: "/".to_string(),
            message: message.into(),
            kind,
        }
    }
}

/// Outcome of a batch: `ok` exactly when `errors` is empty.
///
/// A rejected batch must not be committed; its `final_doc` is diagnostic
/// (the working copy at the point processing stopped, or the input
/// document for guard rejections).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchResult {
    pub ok: bool,
    pub errors: Vec<PatchError>,
    pub final_doc: Value,
}

impl PatchResult {
    pub fn from_errors(errors: Vec<PatchError>, final_doc: Value) -> Self {
        Self {
            ok: errors.is_empty(),
            errors,
            final_doc,
        }
    }

    pub fn success(final_doc: Value) -> Self {
        Self::from_errors(Vec::new(), final_doc)
    }

    /// The document a caller should keep: `final_doc` when `ok`, otherwise
    /// `previous`.
    pub fn commit(self, previous: Value) -> Value {
        if self.ok {
            self.final_doc
        } else {
            previous
        }
    }
}
