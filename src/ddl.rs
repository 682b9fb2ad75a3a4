//! Schema-to-table-statement translation.
//!
//! Derives a Hive-style `CREATE TABLE` block from an inferred schema so the
//! normalized corpus can be registered with a columnar query engine. Pure
//! string templating over the schema value.

use std::collections::BTreeSet;

use serde_json::{Map, Value};
use tracing::debug;

use crate::constants::ddl::{
    INPUT_FORMAT, OUTPUT_FORMAT, QUOTED_COLUMN_KEYWORDS, ROW_FORMAT_SERDE,
};
use crate::constants::schema::{
    ITEMS_SEGMENT, PROPERTIES_SEGMENT, TYPE_ARRAY, TYPE_OBJECT, TYPE_SEGMENT, TYPE_STRING,
};
use crate::errors::RewrapError;

const TAB: &str = " ";

/// Render the `CREATE TABLE` statement for an inferred schema.
///
/// `data_location` becomes a `LOCATION` clause when non-empty; managed
/// tables drop both the `EXTERNAL` marker and the location.
pub fn table_statement(
    table: &str,
    schema: &Value,
    data_location: &str,
    managed: bool,
) -> Result<String, RewrapError> {
    let properties = schema
        .get(PROPERTIES_SEGMENT)
        .and_then(Value::as_object)
        .ok_or_else(|| {
            RewrapError::Configuration("schema has no properties map".to_string())
        })?;
    let mut odd_ones = BTreeSet::new();
    let definitions = field_definitions(properties, 0, &mut odd_ones)?;
    if !odd_ones.is_empty() {
        debug!(?odd_ones, "column names needing attention");
    }
    let external_marker = if managed { "" } else { "EXTERNAL " };
    let location = if managed || data_location.is_empty() {
        String::new()
    } else {
        format!("\nLOCATION '{data_location}'")
    };
    Ok(format!(
        "CREATE {external_marker}TABLE {table} (\n{definitions}\n)\n\
         ROW FORMAT SERDE '{ROW_FORMAT_SERDE}'\n\
         STORED AS INPUTFORMAT '{INPUT_FORMAT}'\n\
         OUTPUTFORMAT '{OUTPUT_FORMAT}'{location}\n\
         WITH SERDEPROPERTIES (\n  'serialization.format' = '1'\n)\n\
         TBLPROPERTIES ('has_encrypted_data'='false')"
    ))
}

fn field_definitions(
    properties: &Map<String, Value>,
    level: usize,
    odd_ones: &mut BTreeSet<String>,
) -> Result<String, RewrapError> {
    let type_separator = if level == 0 { " " } else { ": " };
    let field_separator = if level == 0 { "\n" } else { ",\n" };
    let new_level = level + 1;
    let indentation = TAB.repeat(new_level);
    let mut definitions = Vec::with_capacity(properties.len());
    for (name, attributes) in properties {
        let cleaned_name = if QUOTED_COLUMN_KEYWORDS.contains(&name.to_lowercase().as_str()) {
            format!("`{name}`")
        } else {
            name.clone()
        };
        match declared_type(attributes, name)?.as_str() {
            TYPE_OBJECT => {
                let members = member_properties(attributes, name)?;
                let nested = field_definitions(members, new_level, odd_ones)?;
                definitions.push(format!(
                    "{indentation}{cleaned_name}{type_separator}STRUCT<\n{nested}\n{indentation}>"
                ));
            }
            TYPE_ARRAY => {
                let extra_indentation = TAB.repeat(new_level + 1);
                let items = attributes.get(ITEMS_SEGMENT).ok_or_else(|| {
                    RewrapError::Configuration(format!(
                        "array field '{name}' has no element schema"
                    ))
                })?;
                let (array_type, closing_bracket) =
                    if declared_type(items, name)?.as_str() == TYPE_OBJECT {
                        let members = member_properties(items, name)?;
                        let nested = field_definitions(members, new_level + 1, odd_ones)?;
                        (
                            format!("STRUCT<\n{nested}\n{extra_indentation}>"),
                            format!("\n{indentation}>"),
                        )
                    } else {
                        (declared_type(items, name)?.to_uppercase(), ">".to_string())
                    };
                definitions.push(format!(
                    "{indentation}{cleaned_name}{type_separator}ARRAY<{array_type}{closing_bracket}"
                ));
            }
            scalar => {
                if cleaned_name.contains(':') {
                    odd_ones.insert(cleaned_name.clone());
                }
                definitions.push(format!(
                    "{indentation}{cleaned_name}{type_separator}{}",
                    scalar.to_uppercase()
                ));
            }
        }
    }
    Ok(definitions.join(field_separator))
}

/// Collapse a type declaration (possibly a list of alternatives) to one
/// name; `string` wins over `object`, matching how the rewriter normalizes
/// polymorphic fields.
fn declared_type(attributes: &Value, name: &str) -> Result<String, RewrapError> {
    let declared = attributes.get(TYPE_SEGMENT).ok_or_else(|| {
        RewrapError::Configuration(format!("field '{name}' has no declared type"))
    })?;
    match declared {
        Value::String(type_name) => Ok(type_name.clone()),
        Value::Array(alternatives) => {
            let names: Vec<&str> = alternatives.iter().filter_map(Value::as_str).collect();
            if names.contains(&TYPE_STRING) {
                Ok(TYPE_STRING.to_string())
            } else if names.contains(&TYPE_OBJECT) {
                Ok(TYPE_OBJECT.to_string())
            } else {
                names.first().map(|first| first.to_string()).ok_or_else(|| {
                    RewrapError::Configuration(format!(
                        "field '{name}' has an empty type declaration"
                    ))
                })
            }
        }
        _ => Err(RewrapError::Configuration(format!(
            "field '{name}' has a malformed type declaration"
        ))),
    }
}

fn member_properties<'a>(
    attributes: &'a Value,
    name: &str,
) -> Result<&'a Map<String, Value>, RewrapError> {
    attributes
        .get(PROPERTIES_SEGMENT)
        .and_then(Value::as_object)
        .ok_or_else(|| {
            RewrapError::Configuration(format!("object field '{name}' has no member schemas"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalar_columns_use_uppercase_types() {
        let schema = json!({
            "type": "object",
            "properties": {
                "count": {"type": "integer"},
                "name": {"type": "string"}
            }
        });
        let statement = table_statement("corpus", &schema, "", false).unwrap();
        assert!(statement.starts_with("CREATE EXTERNAL TABLE corpus (\n"));
        assert!(statement.contains(" count INTEGER\n name STRING"));
        assert!(statement.contains(&format!("ROW FORMAT SERDE '{ROW_FORMAT_SERDE}'")));
        assert!(!statement.contains("LOCATION"));
    }

    #[test]
    fn reserved_column_names_are_quoted() {
        let schema = json!({
            "type": "object",
            "properties": {"date": {"type": "string"}}
        });
        let statement = table_statement("corpus", &schema, "", false).unwrap();
        assert!(statement.contains(" `date` STRING"));
    }

    #[test]
    fn wrapped_sequences_render_as_arrays_of_structs() {
        let schema = json!({
            "type": "object",
            "properties": {
                "a": {
                    "type": "array",
                    "xitems": {
                        "type": "object",
                        "properties": {
                            "text": {"type": "array", "xitems": {"type": "string"}}
                        }
                    }
                }
            }
        });
        let statement = table_statement("corpus", &schema, "", false).unwrap();
        assert!(statement.contains(" a ARRAY<STRUCT<\n   text: ARRAY<STRING>\n  >\n >"));
    }

    #[test]
    fn type_alternatives_collapse_string_over_object() {
        let schema = json!({
            "type": "object",
            "properties": {
                "mixed": {"type": ["object", "string"]}
            }
        });
        let statement = table_statement("corpus", &schema, "", false).unwrap();
        assert!(statement.contains(" mixed STRING"));
    }

    #[test]
    fn location_clause_follows_the_output_format() {
        let schema = json!({"type": "object", "properties": {"a": {"type": "string"}}});
        let statement = table_statement("corpus", &schema, "s3://corpus/data", false).unwrap();
        assert!(statement.contains(&format!(
            "OUTPUTFORMAT '{OUTPUT_FORMAT}'\nLOCATION 's3://corpus/data'"
        )));

        let managed = table_statement("corpus", &schema, "s3://corpus/data", true).unwrap();
        assert!(managed.starts_with("CREATE TABLE corpus"));
        assert!(!managed.contains("LOCATION"));
    }

    #[test]
    fn missing_type_declarations_are_configuration_errors() {
        let schema = json!({"type": "object", "properties": {"a": {}}});
        let error = table_statement("corpus", &schema, "", false).unwrap_err();
        assert!(matches!(error, RewrapError::Configuration(_)));
    }
}
