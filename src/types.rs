/// Dotted data-path string in document spelling.
/// Examples: `reactions.xitem`, `drug.substance[2].name`
pub type PathString = String;
/// Dotted path string in schema spelling (as streamed from an inferred schema).
/// Example: `properties.reactions.xitems.type`
pub type SchemaPathString = String;
/// Declared JSON type name inside a schema.
/// Examples: `object`, `string`, `array`
pub type TypeName = String;
/// Destination key inside an object store.
/// Example: `processed/reports/report_000123.json`
pub type StoreKey = String;
/// Warning/log message text.
/// Example: `lookup missed resolved index reactions[4]`
pub type LogMessage = String;
