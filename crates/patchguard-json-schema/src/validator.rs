//! Runtime validation of a value against a schema node.
//!
//! Keywords are checked in a fixed order: `$ref`, `anyOf` (exclusive of
//! everything else), `allOf`, `oneOf`, `enum`, `type` (a mismatch stops
//! further checks), then the string, number, array and object keywords.

use std::collections::HashMap;

use patchguard_json_pointer::append_token;
use patchguard_util::{deep_equal, schema_type_name};
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::candidates::declared_types;
use crate::formats::validate_format;
use crate::resolver::{is_unresolved, ref_of, resolve_ref};

/// One schema violation, located by the pointer of the offending value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{pointer}: {message}")]
pub struct ValidationError {
    pub pointer: String,
    pub message: String,
}

/// Validates values against sub-schemas of one root schema.
///
/// `$ref`s are resolved lazily against the root. A reference that comes
/// back to itself without the validator having moved into the data is
/// treated as the permissive schema; a reference revisited deeper in the
/// data is followed again, so recursive schemas check recursive data to
/// its full depth.
///
/// Every `pattern` in the root schema is compiled once, up front.
#[derive(Debug, Clone)]
pub struct Validator<'s> {
    root: &'s Value,
    patterns: HashMap<&'s str, Result<Regex, regex::Error>>,
}

type ActiveRefs = Vec<(String, String)>;

impl<'s> Validator<'s> {
    pub fn new(root: &'s Value) -> Self {
        let mut patterns = HashMap::new();
        collect_patterns(root, &mut patterns);
        Self { root, patterns }
    }

    pub fn root(&self) -> &'s Value {
        self.root
    }

    /// Validates a whole document against the root schema.
    pub fn validate_document(&self, instance: &Value) -> Vec<ValidationError> {
        self.validate(self.root, instance, "")
    }

    /// Validates `instance` against `schema`, reporting pointers relative
    /// to `at`.
    pub fn validate(&self, schema: &Value, instance: &Value, at: &str) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        let mut active = ActiveRefs::new();
        self.check(schema, instance, at, &mut active, &mut errors);
        errors
    }

    pub fn is_valid(&self, schema: &Value, instance: &Value) -> bool {
        self.validate(schema, instance, "").is_empty()
    }

    /// Validates against every candidate and returns the smallest error
    /// list; empty when at least one candidate accepts the value.
    ///
    /// When all candidates fail, the branch with the fewest errors is only
    /// a guess at which one the caller meant.
    pub fn validate_candidates(
        &self,
        candidates: &[&Value],
        instance: &Value,
        at: &str,
    ) -> Vec<ValidationError> {
        candidates
            .iter()
            .map(|schema| self.validate(schema, instance, at))
            .min_by_key(Vec::len)
            .unwrap_or_default()
    }

    fn accepts(&self, schema: &Value, instance: &Value, at: &str, active: &mut ActiveRefs) -> bool {
        let mut scratch = Vec::new();
        self.check(schema, instance, at, active, &mut scratch);
        scratch.is_empty()
    }

    fn check(
        &self,
        schema: &Value,
        instance: &Value,
        at: &str,
        active: &mut ActiveRefs,
        errors: &mut Vec<ValidationError>,
    ) {
        let here = if at.is_empty() { "/" } else { at };

        let map = match schema {
            Value::Object(map) => map,
            Value::Bool(false) => {
                report(errors, here, "schema \"false\" does not accept any value");
                return;
            }
            _ => return,
        };

        if let Some(reference) = ref_of(schema) {
            let key = (reference.to_string(), at.to_string());
            if active.contains(&key) {
                log::warn!("recursive schema reference {reference} at {here} treated as permissive");
                return;
            }
            let target = resolve_ref(schema, self.root);
            if is_unresolved(target) {
                log::warn!("schema reference {reference} could not be resolved");
                return;
            }
            active.push(key);
            self.check(target, instance, at, active, errors);
            active.pop();
            return;
        }

        if let Some(branches) = map.get("anyOf").and_then(Value::as_array) {
            if !branches.iter().any(|b| self.accepts(b, instance, at, active)) {
                report(errors, here, "failed in anyOf (no alternative accepted the value)");
            }
            return;
        }

        if let Some(branches) = map.get("allOf").and_then(Value::as_array) {
            for branch in branches {
                self.check(branch, instance, at, active, errors);
            }
        }

        if let Some(branches) = map.get("oneOf").and_then(Value::as_array) {
            let matched = branches
                .iter()
                .filter(|b| self.accepts(b, instance, at, active))
                .count();
            if matched != 1 {
                report(
                    errors,
                    here,
                    format!("failed in oneOf (expected exactly one alternative to accept the value, {matched} did)"),
                );
            }
        }

        if let Some(values) = map.get("enum").and_then(Value::as_array) {
            if !values.iter().any(|v| deep_equal(v, instance)) {
                report(errors, here, format!("value is not in enum: {instance}"));
            }
        }

        if let Some(types) = declared_types(schema) {
            let actual = schema_type_name(instance);
            let matches = types.contains(&actual) || (actual == "integer" && types.contains(&"number"));
            if !matches {
                report(
                    errors,
                    here,
                    format!("invalid type: expected {}, received {actual}", types.join(" | ")),
                );
                return;
            }
        }

        match instance {
            Value::String(s) => {
                if let Some(pattern) = map.get("pattern").and_then(Value::as_str).filter(|p| !p.is_empty()) {
                    let compiled;
                    let regex = match self.patterns.get(pattern) {
                        Some(cached) => cached.as_ref(),
                        // a schema node from outside the root
                        None => {
                            compiled = Regex::new(pattern);
                            compiled.as_ref()
                        }
                    };
                    match regex {
                        Ok(re) if !re.is_match(s) => {
                            report(errors, here, format!("string does not match pattern: {pattern}"));
                        }
                        Ok(_) => {}
                        Err(e) => log::warn!("ignoring invalid schema pattern {pattern:?}: {e}"),
                    }
                }
                if let Some(format) = map.get("format").and_then(Value::as_str).filter(|f| !f.is_empty()) {
                    if !validate_format(format, instance) {
                        report(errors, here, format!("string does not respect format: {format}"));
                    }
                }
            }
            Value::Number(n) => {
                let x = n.as_f64().unwrap_or_default();
                if let Some(Value::Number(min)) = map.get("minimum") {
                    if min.as_f64().is_some_and(|min| x < min) {
                        report(errors, here, format!("number < minimum ({min})"));
                    }
                }
                if let Some(Value::Number(max)) = map.get("maximum") {
                    if max.as_f64().is_some_and(|max| x > max) {
                        report(errors, here, format!("number > maximum ({max})"));
                    }
                }
            }
            Value::Array(items) => {
                if let Some(item_schema @ (Value::Object(_) | Value::Bool(_))) = map.get("items") {
                    for (i, item) in items.iter().enumerate() {
                        let child = append_token(at, &i.to_string());
                        self.check(item_schema, item, &child, active, errors);
                    }
                }
            }
            Value::Object(obj) => {
                if let Some(required) = map.get("required").and_then(Value::as_array) {
                    for key in required.iter().filter_map(Value::as_str) {
                        if !obj.contains_key(key) {
                            report(errors, here, format!("required field missing: {key}"));
                        }
                    }
                }
                let props = map.get("properties").and_then(Value::as_object);
                for (key, val) in obj {
                    let child = append_token(at, key);
                    if let Some(prop_schema) = props.and_then(|p| p.get(key)) {
                        self.check(prop_schema, val, &child, active, errors);
                        continue;
                    }
                    match map.get("additionalProperties") {
                        Some(Value::Bool(false)) => report(
                            errors,
                            &child,
                            format!("property not allowed (additionalProperties=false): {key}"),
                        ),
                        Some(extra @ Value::Object(_)) => self.check(extra, val, &child, active, errors),
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }
}

fn report(errors: &mut Vec<ValidationError>, pointer: &str, message: impl Into<String>) {
    errors.push(ValidationError {
        pointer: pointer.to_string(),
        message: message.into(),
    });
}

/// Validates `value` against `schema`, resolving references in `root`.
/// Compiles every string under a `pattern` key, wherever it sits.
fn collect_patterns<'s>(node: &'s Value, out: &mut HashMap<&'s str, Result<Regex, regex::Error>>) {
    match node {
        Value::Object(map) => {
            if let Some(pattern) = map.get("pattern").and_then(Value::as_str).filter(|p| !p.is_empty()) {
                out.entry(pattern).or_insert_with(|| Regex::new(pattern));
            }
            map.values().for_each(|child| collect_patterns(child, out));
        }
        Value::Array(items) => items.iter().for_each(|child| collect_patterns(child, out)),
        _ => {}
    }
}

pub fn validate(root: &Value, schema: &Value, value: &Value, at: &str) -> Vec<ValidationError> {
    Validator::new(root).validate(schema, value, at)
}
