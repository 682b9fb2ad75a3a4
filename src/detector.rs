//! Schema difference detection.
//!
//! Flags polymorphic sequence fields: paths whose element type is declared
//! as both `object` and `string` in a JSON-Schema-shaped description. Those
//! fields cannot be typed by a columnar engine and need normalization.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::constants::paths::{PATH_DELIMITER, SENTINEL_SEGMENT};
use crate::constants::schema::{ITEMS_SEGMENT, TYPE_OBJECT, TYPE_SEGMENT, TYPE_STRING};
use crate::errors::RewrapError;
use crate::events::{DocumentEvents, EventKind, ScalarKind};
use crate::types::SchemaPathString;

struct TypeAlternatives {
    prefix: SchemaPathString,
    element_prefix: SchemaPathString,
    found_object: bool,
    found_string: bool,
}

/// True when `prefix` is the type declaration of a sequence's elements.
fn is_sequence_type_declaration(prefix: &str) -> bool {
    let mut segments = prefix.rsplit(PATH_DELIMITER);
    segments.next() == Some(TYPE_SEGMENT) && segments.next() == Some(ITEMS_SEGMENT)
}

/// Scan a schema for sequence element types declared as both `object` and
/// `string`, returning the schema-spelled paths of the flagged declarations.
pub fn find_transform_targets(schema: &Value) -> BTreeSet<SchemaPathString> {
    let mut targets = BTreeSet::new();
    let mut tracking: Option<TypeAlternatives> = None;
    for event in DocumentEvents::new(schema) {
        let mut close = false;
        if let Some(current) = tracking.as_mut() {
            match &event.kind {
                EventKind::Scalar(ScalarKind::String, value)
                    if event.prefix == current.element_prefix =>
                {
                    if value.as_str() == Some(TYPE_OBJECT) {
                        current.found_object = true;
                    } else if value.as_str() == Some(TYPE_STRING) {
                        current.found_string = true;
                    }
                }
                EventKind::EndArray if event.prefix == current.prefix => {
                    if current.found_object && current.found_string {
                        targets.insert(current.prefix.clone());
                    }
                    close = true;
                }
                _ => {}
            }
            if close {
                tracking = None;
            }
            continue;
        }
        if matches!(event.kind, EventKind::StartArray) && is_sequence_type_declaration(&event.prefix)
        {
            tracking = Some(TypeAlternatives {
                element_prefix: format!("{}{PATH_DELIMITER}{SENTINEL_SEGMENT}", event.prefix),
                prefix: event.prefix,
                found_object: false,
                found_string: false,
            });
        }
    }
    targets
}

/// Scan the representative schema file for transform targets.
pub fn find_transform_targets_in_file(
    path: &Path,
) -> Result<BTreeSet<SchemaPathString>, RewrapError> {
    let raw = fs::read_to_string(path)?;
    let schema: Value = serde_json::from_str(&raw).map_err(|source| RewrapError::Json {
        path: path.display().to_string(),
        source,
    })?;
    Ok(find_transform_targets(&schema))
}
