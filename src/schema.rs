//! Merging schema inference for JSON documents.
//!
//! Produces the JSON-Schema-shaped descriptions the detector and filter
//! stream over: objects carry `properties`, sequences carry an `xitems`
//! element schema, and fields observed with several types carry a sorted
//! list of alternatives.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde_json::{Map, Value};
use walkdir::WalkDir;

use crate::constants::schema::{
    ITEMS_SEGMENT, PROPERTIES_SEGMENT, TYPE_ARRAY, TYPE_BOOLEAN, TYPE_INTEGER, TYPE_NULL,
    TYPE_NUMBER, TYPE_OBJECT, TYPE_SEGMENT, TYPE_STRING,
};
use crate::errors::RewrapError;
use crate::types::TypeName;

/// Merging accumulator for one schema node.
///
/// Observing documents unions declared types, merges object member schemas
/// in first-seen order, and folds every sequence element into a single
/// element schema.
#[derive(Debug, Default)]
pub struct SchemaNode {
    types: BTreeSet<TypeName>,
    properties: IndexMap<String, SchemaNode>,
    items: Option<Box<SchemaNode>>,
}

impl SchemaNode {
    /// Node pre-declared as an object, matching the seed the batch schema
    /// inference starts from.
    pub fn seeded_object() -> Self {
        let mut node = Self::default();
        node.types.insert(TYPE_OBJECT.to_string());
        node
    }

    /// Merge one value into this node.
    pub fn observe(&mut self, value: &Value) {
        match value {
            Value::Null => {
                self.types.insert(TYPE_NULL.to_string());
            }
            Value::Bool(_) => {
                self.types.insert(TYPE_BOOLEAN.to_string());
            }
            Value::Number(number) => {
                let name = if number.is_i64() || number.is_u64() {
                    TYPE_INTEGER
                } else {
                    TYPE_NUMBER
                };
                self.types.insert(name.to_string());
            }
            Value::String(_) => {
                self.types.insert(TYPE_STRING.to_string());
            }
            Value::Array(elements) => {
                self.types.insert(TYPE_ARRAY.to_string());
                if !elements.is_empty() {
                    let items = self.items.get_or_insert_with(Default::default);
                    for element in elements {
                        items.observe(element);
                    }
                }
            }
            Value::Object(members) => {
                self.types.insert(TYPE_OBJECT.to_string());
                for (key, member) in members {
                    self.properties.entry(key.clone()).or_default().observe(member);
                }
            }
        }
    }

    /// Serialize to the JSON-Schema-shaped form.
    pub fn to_value(&self) -> Value {
        let mut out = Map::new();
        if !self.types.is_empty() {
            let declared = if self.types.len() == 1 {
                Value::String(self.types.iter().next().cloned().unwrap_or_default())
            } else {
                Value::Array(self.types.iter().cloned().map(Value::String).collect())
            };
            out.insert(TYPE_SEGMENT.to_string(), declared);
        }
        if self.types.contains(TYPE_OBJECT) {
            let members: Map<String, Value> = self
                .properties
                .iter()
                .map(|(key, node)| (key.clone(), node.to_value()))
                .collect();
            out.insert(PROPERTIES_SEGMENT.to_string(), Value::Object(members));
        }
        if let Some(items) = &self.items {
            out.insert(ITEMS_SEGMENT.to_string(), items.to_value());
        }
        Value::Object(out)
    }
}

/// Infer one schema describing every given document.
pub fn infer_schema(documents: &[Value]) -> Value {
    let mut root = SchemaNode::seeded_object();
    for document in documents {
        root.observe(document);
    }
    root.to_value()
}

/// Read the documents serialized in one file.
///
/// Accepts either a single whole-file JSON value or newline-delimited JSON;
/// the whole-file form is tried first.
pub fn read_documents(path: &Path) -> Result<Vec<Value>, RewrapError> {
    let raw = fs::read_to_string(path)?;
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    match serde_json::from_str::<Value>(&raw) {
        Ok(document) => Ok(vec![document]),
        Err(_) => raw
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                serde_json::from_str(line).map_err(|source| RewrapError::Json {
                    path: path.display().to_string(),
                    source,
                })
            })
            .collect(),
    }
}

/// Infer the schema of the documents in one file.
pub fn infer_schema_from_file(path: &Path) -> Result<Value, RewrapError> {
    let documents = read_documents(path)?;
    Ok(infer_schema(&documents))
}

/// Infer one schema over every document file under `dir`.
pub fn infer_schema_from_dir(dir: &Path) -> Result<Value, RewrapError> {
    let mut root = SchemaNode::seeded_object();
    let mut files: Vec<_> = WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.path().to_path_buf())
        .collect();
    files.sort();
    for file in files {
        for document in read_documents(&file)? {
            root.observe(&document);
        }
    }
    Ok(root.to_value())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn mixed_sequence_elements_declare_type_alternatives() {
        let documents = vec![json!({"a": [{"x": 1}, "hello"]})];
        let schema = infer_schema(&documents);
        let declared = &schema["properties"]["a"]["xitems"]["type"];
        assert_eq!(declared, &json!(["object", "string"]));
    }

    #[test]
    fn uniform_sequences_declare_a_single_type() {
        let documents = vec![json!({"a": ["one", "two"]})];
        let schema = infer_schema(&documents);
        assert_eq!(schema["properties"]["a"]["type"], json!("array"));
        assert_eq!(schema["properties"]["a"]["xitems"]["type"], json!("string"));
    }

    #[test]
    fn empty_input_keeps_the_object_seed() {
        let schema = infer_schema(&[]);
        assert_eq!(schema, json!({"type": "object", "properties": {}}));
    }

    #[test]
    fn object_members_merge_across_documents() {
        let documents = vec![json!({"a": 1}), json!({"a": "one", "b": true})];
        let schema = infer_schema(&documents);
        assert_eq!(
            schema["properties"]["a"]["type"],
            json!(["integer", "string"])
        );
        assert_eq!(schema["properties"]["b"]["type"], json!("boolean"));
    }

    #[test]
    fn read_documents_accepts_whole_file_and_ndjson() {
        let dir = tempfile::tempdir().unwrap();

        let whole = dir.path().join("whole.json");
        fs::write(&whole, "{\"a\": 1}").unwrap();
        assert_eq!(read_documents(&whole).unwrap(), vec![json!({"a": 1})]);

        let ndjson = dir.path().join("lines.json");
        let mut file = fs::File::create(&ndjson).unwrap();
        writeln!(file, "{{\"a\": 1}}").unwrap();
        writeln!(file, "{{\"a\": \"two\"}}").unwrap();
        drop(file);
        assert_eq!(
            read_documents(&ndjson).unwrap(),
            vec![json!({"a": 1}), json!({"a": "two"})]
        );
    }

    #[test]
    fn read_documents_reports_the_offending_file() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("bad.json");
        fs::write(&bad, "{\"a\": 1}\nnot json").unwrap();
        let error = read_documents(&bad).unwrap_err();
        assert!(error.to_string().contains("bad.json"));
    }
}
