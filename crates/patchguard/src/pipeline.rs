//! The full guarded flow: pre-validation, duplicate filtering, checked
//! application and the shrinkage guard.

use log::info;
use serde::Serialize;
use serde_json::Value;

use crate::checker::apply_patches;
use crate::guard::{check_shrinkage, filter_duplicate_appends, pre_validate_with, GuardConfig};
use crate::json_patch::{ErrorKind, PatchError, PatchResult};

/// A [`PatchResult`] plus the appends dropped as duplicates.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardedResult {
    #[serde(flatten)]
    pub result: PatchResult,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub duplicates_skipped: Vec<String>,
}

impl GuardedResult {
    fn plain(result: PatchResult) -> Self {
        Self {
            result,
            duplicates_skipped: Vec::new(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.result.ok
    }
}

/// Runs one batch through every guard stage.
///
/// Guard rejections report the input document as `finalDoc`. When every
/// operation turned out to be a duplicate append the batch is an `ok`
/// no-op.
pub fn guarded_apply(
    document: &Value,
    patches: &[Value],
    schema: Option<&Value>,
    config: &GuardConfig,
) -> GuardedResult {
    if patches.is_empty() {
        return GuardedResult::plain(PatchResult::from_errors(
            vec![PatchError::batch(
                "No patches provided. You must include a 'patches' array with at least one operation. \
                 Example: {\"op\":\"add\",\"path\":\"/sections/-\",\"value\":{\"section_name\":\"...\"}}",
                ErrorKind::PatchOpError,
            )],
            document.clone(),
        ));
    }

    let rejected = pre_validate_with(patches, document, config);
    if !rejected.is_empty() {
        info!("batch of {} rejected by pre-validation ({} error(s))", patches.len(), rejected.len());
        return GuardedResult::plain(PatchResult::from_errors(rejected, document.clone()));
    }

    let (patches, duplicates_skipped) = filter_duplicate_appends(patches, document);
    if patches.is_empty() {
        info!("every operation in the batch was a duplicate append");
        return GuardedResult {
            result: PatchResult::success(document.clone()),
            duplicates_skipped,
        };
    }

    let mut result = apply_patches(document, &patches, schema);
    if result.ok {
        if let Some(err) = check_shrinkage(document, &result.final_doc, config) {
            info!("batch rejected by shrinkage guard: {}", err.message);
            result = PatchResult::from_errors(vec![err], document.clone());
        }
    }
    GuardedResult {
        result,
        duplicates_skipped,
    }
}
