#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Batch driver over a source directory tree.
pub mod batch;
/// Grouped constants for paths, schema spelling, and table generation.
pub mod constants;
/// Scoped run context owning scratch storage.
pub mod context;
/// Schema difference detection over streamed schema events.
pub mod detector;
/// Schema-to-table-statement translation.
pub mod ddl;
/// Streaming JSON event tokenizer shared by detector and resolver.
pub mod events;
/// Per-document applicability filtering.
pub mod filter;
/// Parsed dotted-path representation.
pub mod path;
/// Sentinel-to-index path resolution over streamed events.
pub mod resolver;
/// Record rewriting with per-path consistency tallies.
pub mod rewriter;
/// Merging schema inference for JSON documents.
pub mod schema;
/// Object-store upload seam and built-in filesystem store.
pub mod store;
/// Shared type aliases.
pub mod types;
/// Human-readable formatting helpers.
pub mod utils;

mod errors;

pub use batch::{BatchConfig, DocumentReport, RunSummary, UploadTarget};
pub use context::RunContext;
pub use errors::RewrapError;
pub use events::{DocumentEvents, Event, EventKind, ScalarKind};
pub use path::{FieldPath, PathSegment};
pub use resolver::IndexResolver;
pub use rewriter::{DocumentOutcome, DocumentRewrite, LookupOutcome, PathRewrite};
pub use store::{DirObjectStore, ObjectStore};
pub use types::{PathString, SchemaPathString};
