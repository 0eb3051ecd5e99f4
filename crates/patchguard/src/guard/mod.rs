//! Destructive-edit heuristics wrapped around patch application.
//!
//! Three stages, run by [`crate::pipeline::guarded_apply`]:
//! [`pre_validate`] rejects a whole batch before anything is applied,
//! [`filter_duplicate_appends`] drops appends that would duplicate an
//! item, and [`check_shrinkage`] rejects a successful batch that lost
//! most of the document's leaves.

pub mod config;
pub mod dedupe;
pub mod pre_validate;
pub mod shrinkage;

pub use config::GuardConfig;
pub use dedupe::filter_duplicate_appends;
pub use pre_validate::{pre_validate, pre_validate_with};
pub use shrinkage::check_shrinkage;

use patchguard_json_pointer::{get, parse_json_pointer_lenient, ParseOptions};
use serde_json::Value;

/// Looks a hand-typed pointer up; root forms yield the document itself.
///
/// Tokens are not percent-decoded, so the guards see the same slot the
/// applier will touch.
pub(crate) fn resolve_lenient<'a>(document: &'a Value, pointer: &str) -> Option<&'a Value> {
    let path = parse_json_pointer_lenient(pointer, &ParseOptions { url_decode: false });
    get(document, &path)
}
