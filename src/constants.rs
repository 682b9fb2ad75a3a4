/// Constants used by dotted-path spelling and parsing.
pub mod paths {
    /// Sentinel segment marking "any element of the enclosing sequence".
    pub const SENTINEL_SEGMENT: &str = "xitem";
    /// Separator between path segments.
    pub const PATH_DELIMITER: char = '.';
    /// Opening bracket of a resolved index suffix (for example `name[3]`).
    pub const INDEX_OPEN: char = '[';
    /// Closing bracket of a resolved index suffix.
    pub const INDEX_CLOSE: char = ']';
}

/// Constants used by schema inference and schema-path spelling.
pub mod schema {
    /// Key holding an object's member schemas.
    pub const PROPERTIES_SEGMENT: &str = "properties";
    /// Key holding a sequence's element schema.
    pub const ITEMS_SEGMENT: &str = "xitems";
    /// Key holding a declared type (or list of alternative types).
    pub const TYPE_SEGMENT: &str = "type";

    /// Declared type name for mappings.
    pub const TYPE_OBJECT: &str = "object";
    /// Declared type name for strings.
    pub const TYPE_STRING: &str = "string";
    /// Declared type name for sequences.
    pub const TYPE_ARRAY: &str = "array";
    /// Declared type name for integral numbers.
    pub const TYPE_INTEGER: &str = "integer";
    /// Declared type name for non-integral numbers.
    pub const TYPE_NUMBER: &str = "number";
    /// Declared type name for booleans.
    pub const TYPE_BOOLEAN: &str = "boolean";
    /// Declared type name for nulls.
    pub const TYPE_NULL: &str = "null";
}

/// Constants used by the record rewriter.
pub mod rewriter {
    /// Field name of the wrapped-record text sequence.
    pub const WRAP_TEXT_FIELD: &str = "text";
}

/// Constants used by table-statement generation.
pub mod ddl {
    /// Column names that collide with reserved words and need backtick quoting.
    pub const QUOTED_COLUMN_KEYWORDS: [&str; 3] = ["timestamp", "date", "datetime"];
    /// Row-format SerDe class for JSON-backed external tables.
    pub const ROW_FORMAT_SERDE: &str = "org.openx.data.jsonserde.JsonSerDe";
    /// Input format class for JSON-backed external tables.
    pub const INPUT_FORMAT: &str = "org.apache.hadoop.mapred.TextInputFormat";
    /// Output format class for JSON-backed external tables.
    pub const OUTPUT_FORMAT: &str = "org.apache.hadoop.hive.ql.io.HiveIgnoreKeyTextOutputFormat";
}
