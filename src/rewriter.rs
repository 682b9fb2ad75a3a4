//! Record rewriting with per-path consistency tallies.
//!
//! Every applicable path is resolved against a pristine pass over the
//! document's original form, while replacements land in the working copy.
//! A document only succeeds when every expected string occurrence was both
//! found and rewritten.

use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::constants::rewriter::WRAP_TEXT_FIELD;
use crate::errors::RewrapError;
use crate::events::{DocumentEvents, ScalarKind};
use crate::path::{FieldPath, PathSegment};
use crate::resolver::IndexResolver;

/// What a wrapping write did at the destination.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LookupOutcome {
    /// The destination held a bare value and was replaced by a wrapped record.
    Wrapped,
    /// The destination already held a wrapped record; the text was appended.
    Appended,
}

/// Terminal state of one document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DocumentOutcome {
    /// Every applicable path rewrote consistently.
    Success,
    /// At least one path's expected/found/rewritten counts disagreed.
    Failed,
}

/// Per-path rewrite tallies.
///
/// `missing`, `mismatched`, `non_string`, and `empty` keep the reasons an
/// occurrence was skipped distinguishable; all of them exclude the
/// occurrence from `rewritten`.
#[derive(Clone, Debug, Serialize)]
pub struct PathRewrite {
    /// The applicable data path.
    pub path: FieldPath,
    /// String occurrences counted at the path in the original document.
    pub expected: usize,
    /// Resolved index paths emitted for the path.
    pub found: usize,
    /// Occurrences successfully wrapped (or appended).
    pub rewritten: usize,
    /// Resolved locations absent from the in-memory document.
    pub missing: usize,
    /// Resolved locations that failed with a container-kind mismatch.
    pub mismatched: usize,
    /// Resolved locations holding a non-string value.
    pub non_string: usize,
    /// Resolved locations holding an empty string.
    pub empty: usize,
}

impl PathRewrite {
    fn new(path: FieldPath, expected: usize) -> Self {
        Self {
            path,
            expected,
            found: 0,
            rewritten: 0,
            missing: 0,
            mismatched: 0,
            non_string: 0,
            empty: 0,
        }
    }

    /// True when every expected occurrence was found and rewritten.
    pub fn is_consistent(&self) -> bool {
        self.expected == self.found && self.found == self.rewritten
    }
}

/// Result of rewriting one document.
#[derive(Clone, Debug, Serialize)]
pub struct DocumentRewrite {
    /// Terminal state.
    pub outcome: DocumentOutcome,
    /// Per-path tallies, in filter order.
    pub paths: Vec<PathRewrite>,
}

impl DocumentRewrite {
    /// True when the document reached `Success`.
    pub fn is_success(&self) -> bool {
        self.outcome == DocumentOutcome::Success
    }
}

/// Read the value at a fully resolved path.
///
/// Returns `Ok(None)` when a key is absent or an index is out of range, and
/// a `LookupMismatch` error when a segment meets the wrong container kind.
/// Missing is never silently conflated with mismatched.
pub fn value_at<'a>(
    document: &'a Value,
    path: &FieldPath,
) -> Result<Option<&'a Value>, RewrapError> {
    let mut current = document;
    for segment in path.segments() {
        match segment {
            PathSegment::Key(key) => match current {
                Value::Object(members) => match members.get(key) {
                    Some(value) => current = value,
                    None => return Ok(None),
                },
                _ => return Ok(None),
            },
            PathSegment::Indexed { key, index } => match current {
                Value::Object(members) => match members.get(key) {
                    Some(Value::Array(elements)) => match elements.get(*index) {
                        Some(value) => current = value,
                        None => return Ok(None),
                    },
                    Some(_) => {
                        return Err(RewrapError::lookup_mismatch(
                            path.to_string(),
                            format!("'{key}' is not a sequence"),
                        ));
                    }
                    None => return Ok(None),
                },
                _ => return Ok(None),
            },
            PathSegment::AnyItem => {
                return Err(RewrapError::lookup_mismatch(
                    path.to_string(),
                    "unresolved sentinel segment",
                ));
            }
        }
    }
    Ok(Some(current))
}

/// Wrap `text` into the record at a fully resolved path.
///
/// A bare destination becomes `{"text": [text]}`; a destination already
/// holding a wrapped record accumulates the text at the end of its sequence,
/// so repeated wrapping is additive rather than destructive.
pub fn wrap_value_at(
    document: &mut Value,
    path: &FieldPath,
    text: &str,
) -> Result<LookupOutcome, RewrapError> {
    let (last, parents) = path.split_last().ok_or_else(|| {
        RewrapError::invalid_path(path.to_string(), "empty path")
    })?;
    let mut current = document;
    for segment in parents {
        current = step_into(current, segment, path)?;
    }
    let destination = step_into(current, last, path)?;
    if is_wrapped_record(destination) {
        if let Some(texts) = wrapped_text_mut(destination) {
            texts.push(Value::String(text.to_string()));
        }
        Ok(LookupOutcome::Appended)
    } else {
        *destination = json!({ WRAP_TEXT_FIELD: [text] });
        Ok(LookupOutcome::Wrapped)
    }
}

fn is_wrapped_record(value: &Value) -> bool {
    value
        .get(WRAP_TEXT_FIELD)
        .map(Value::is_array)
        .unwrap_or(false)
}

fn step_into<'a>(
    current: &'a mut Value,
    segment: &PathSegment,
    path: &FieldPath,
) -> Result<&'a mut Value, RewrapError> {
    match segment {
        PathSegment::Key(key) => current
            .as_object_mut()
            .and_then(|members| members.get_mut(key))
            .ok_or_else(|| {
                RewrapError::lookup_mismatch(path.to_string(), format!("missing key '{key}'"))
            }),
        PathSegment::Indexed { key, index } => {
            let elements = current
                .as_object_mut()
                .and_then(|members| members.get_mut(key))
                .ok_or_else(|| {
                    RewrapError::lookup_mismatch(path.to_string(), format!("missing key '{key}'"))
                })?;
            match elements {
                Value::Array(elements) => elements.get_mut(*index).ok_or_else(|| {
                    RewrapError::lookup_mismatch(
                        path.to_string(),
                        format!("index {index} out of range for '{key}'"),
                    )
                }),
                _ => Err(RewrapError::lookup_mismatch(
                    path.to_string(),
                    format!("'{key}' is not a sequence"),
                )),
            }
        }
        PathSegment::AnyItem => Err(RewrapError::lookup_mismatch(
            path.to_string(),
            "unresolved sentinel segment",
        )),
    }
}

fn wrapped_text_mut(value: &mut Value) -> Option<&mut Vec<Value>> {
    value
        .as_object_mut()?
        .get_mut(WRAP_TEXT_FIELD)?
        .as_array_mut()
}

/// Rewrite every applicable path in `document`.
///
/// The document is mutated in place; callers decide what to do with a
/// `Failed` outcome (the batch driver leaves such documents unwritten).
pub fn rewrite(document: &mut Value, applicable: &[FieldPath]) -> DocumentRewrite {
    let original = document.clone();
    let mut paths = Vec::with_capacity(applicable.len());
    for path in applicable {
        let target = path.to_string();
        let expected = DocumentEvents::new(&original)
            .filter(|event| {
                event.prefix == target && event.kind.scalar_kind() == Some(ScalarKind::String)
            })
            .count();
        let mut tally = PathRewrite::new(path.clone(), expected);
        if expected == 0 {
            paths.push(tally);
            continue;
        }
        let resolver = match IndexResolver::new(
            DocumentEvents::new(&original),
            path,
            ScalarKind::String,
        ) {
            Ok(resolver) => resolver,
            Err(error) => {
                debug!(path = %target, %error, "resolver rejected path");
                paths.push(tally);
                continue;
            }
        };
        for resolved in resolver {
            tally.found += 1;
            let resolved = match resolved {
                Ok(resolved) => resolved,
                Err(error) => {
                    debug!(path = %target, %error, "failed to resolve occurrence");
                    tally.mismatched += 1;
                    continue;
                }
            };
            let text = match value_at(document, &resolved) {
                Err(error) => {
                    debug!(path = %resolved, %error, "lookup mismatch");
                    tally.mismatched += 1;
                    None
                }
                Ok(None) => {
                    debug!(path = %resolved, "resolved location is absent");
                    tally.missing += 1;
                    None
                }
                Ok(Some(Value::String(current))) if !current.is_empty() => Some(current.clone()),
                Ok(Some(Value::String(_))) => {
                    tally.empty += 1;
                    None
                }
                Ok(Some(_)) => {
                    tally.non_string += 1;
                    None
                }
            };
            if let Some(text) = text {
                match wrap_value_at(document, &resolved, &text) {
                    Ok(_) => tally.rewritten += 1,
                    Err(error) => {
                        debug!(path = %resolved, %error, "wrap failed");
                        tally.mismatched += 1;
                    }
                }
            }
        }
        if !tally.is_consistent() {
            debug!(
                path = %target,
                expected = tally.expected,
                found = tally.found,
                rewritten = tally.rewritten,
                "rewrite counts disagree"
            );
        }
        paths.push(tally);
    }
    let outcome = if paths.iter().all(PathRewrite::is_consistent) {
        DocumentOutcome::Success
    } else {
        DocumentOutcome::Failed
    };
    DocumentRewrite { outcome, paths }
}
