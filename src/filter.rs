//! Per-document applicability filtering.
//!
//! A document only pays for rewriting paths its own inferred schema shares
//! with the corpus-level candidate set.

use std::collections::BTreeSet;
use std::path::Path;

use crate::constants::paths::{PATH_DELIMITER, SENTINEL_SEGMENT};
use crate::constants::schema::{ITEMS_SEGMENT, PROPERTIES_SEGMENT, TYPE_SEGMENT};
use crate::errors::RewrapError;
use crate::events::DocumentEvents;
use crate::path::FieldPath;
use crate::schema::infer_schema_from_file;
use crate::types::{PathString, SchemaPathString};

/// Translate a schema-spelled path into data spelling.
///
/// Structural `properties` segments are dropped, the sequence-element
/// segment becomes the sentinel, and a trailing type declaration is removed:
/// `properties.a.properties.b.xitems.type` becomes `a.b.xitem`.
pub fn schema_to_data_path(schema_path: &str) -> PathString {
    let mut segments: Vec<&str> = schema_path
        .split(PATH_DELIMITER)
        .filter(|segment| *segment != PROPERTIES_SEGMENT)
        .collect();
    if segments.last() == Some(&TYPE_SEGMENT) {
        segments.pop();
    }
    segments
        .iter()
        .map(|segment| {
            if *segment == ITEMS_SEGMENT {
                SENTINEL_SEGMENT
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join(".")
}

/// Intersect the corpus candidate set with the paths present in one
/// document's own inferred schema, returning the survivors as parsed data
/// paths.
///
/// The output is always a subset of `candidates` and is empty when the
/// document shares no flagged path.
pub fn applicable_paths(
    document_path: &Path,
    candidates: &BTreeSet<SchemaPathString>,
) -> Result<Vec<FieldPath>, RewrapError> {
    if candidates.is_empty() {
        return Ok(Vec::new());
    }
    let schema = infer_schema_from_file(document_path)?;
    let available: BTreeSet<SchemaPathString> = DocumentEvents::new(&schema)
        .map(|event| event.prefix)
        .collect();
    candidates
        .intersection(&available)
        .map(|schema_path| FieldPath::parse(&schema_to_data_path(schema_path)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::find_transform_targets;
    use serde_json::json;
    use std::fs;

    #[test]
    fn schema_spelling_translates_to_data_spelling() {
        assert_eq!(
            schema_to_data_path("properties.items.xitems.type"),
            "items.xitem"
        );
        assert_eq!(
            schema_to_data_path("properties.a.properties.b.xitems.type"),
            "a.b.xitem"
        );
        assert_eq!(
            schema_to_data_path("properties.a.xitems.properties.b.xitems.type"),
            "a.xitem.b.xitem"
        );
    }

    #[test]
    fn filter_keeps_only_paths_present_in_the_document() {
        let corpus_schema = json!({
            "properties": {
                "a": {"type": "array", "xitems": {"type": ["object", "string"]}},
                "b": {"type": "array", "xitems": {"type": ["object", "string"]}}
            }
        });
        let candidates = find_transform_targets(&corpus_schema);
        assert_eq!(candidates.len(), 2);

        let dir = tempfile::tempdir().unwrap();
        let document = dir.path().join("doc.json");
        fs::write(&document, json!({"a": ["only"]}).to_string()).unwrap();

        let applicable = applicable_paths(&document, &candidates).unwrap();
        let spelled: Vec<String> = applicable.iter().map(ToString::to_string).collect();
        assert_eq!(spelled, vec!["a.xitem"]);
    }

    #[test]
    fn filter_is_empty_without_shared_paths() {
        let corpus_schema = json!({
            "properties": {
                "a": {"type": "array", "xitems": {"type": ["object", "string"]}}
            }
        });
        let candidates = find_transform_targets(&corpus_schema);

        let dir = tempfile::tempdir().unwrap();
        let document = dir.path().join("doc.json");
        fs::write(&document, json!({"c": 3}).to_string()).unwrap();

        assert!(
            applicable_paths(&document, &candidates)
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn filter_short_circuits_on_an_empty_candidate_set() {
        let missing = Path::new("/nonexistent/doc.json");
        let applicable = applicable_paths(missing, &BTreeSet::new()).unwrap();
        assert!(applicable.is_empty());
    }
}
