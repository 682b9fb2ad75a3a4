//! Sentinel-to-index resolution over a streamed document pass.
//!
//! Ownership model:
//! - `DocumentEvents` owns the traversal; the resolver only observes it.
//! - Occurrence counters live for exactly one pass and are keyed by the
//!   sentinel-child prefix of each sequence seen so far.

use std::collections::HashMap;

use crate::constants::paths::SENTINEL_SEGMENT;
use crate::errors::RewrapError;
use crate::events::{DocumentEvents, Event, EventKind, ScalarKind};
use crate::path::{FieldPath, PathSegment};
use crate::types::PathString;
use serde_json::Value;

/// Lazy, finite, forward-only stream of resolved index paths.
///
/// Each emission corresponds to one event in the underlying stream whose
/// prefix and scalar kind match the target. The stream is not restartable; a
/// fresh pass requires a fresh event stream.
pub struct IndexResolver<'a, I>
where
    I: Iterator<Item = Event<'a>>,
{
    events: I,
    target_prefix: PathString,
    target_kind: ScalarKind,
    sentinel_prefixes: Vec<(PathString, FieldPath)>,
    counters: HashMap<PathString, Option<usize>>,
}

impl<'a, I> IndexResolver<'a, I>
where
    I: Iterator<Item = Event<'a>>,
{
    /// Begin resolving `target` occurrences of the given scalar kind.
    ///
    /// The target must contain at least one sentinel segment; a sentinel-free
    /// path has no sequence elements to resolve.
    pub fn new(events: I, target: &FieldPath, target_kind: ScalarKind) -> Result<Self, RewrapError> {
        if target.sentinel_count() == 0 {
            return Err(RewrapError::invalid_path(
                target.to_string(),
                "no sentinel segment",
            ));
        }
        let sentinel_prefixes = target
            .sentinel_prefixes()
            .into_iter()
            .map(|prefix| (prefix.to_string(), prefix))
            .collect();
        Ok(Self {
            events,
            target_prefix: target.to_string(),
            target_kind,
            sentinel_prefixes,
            counters: HashMap::new(),
        })
    }

    fn emit(&self) -> Result<FieldPath, RewrapError> {
        let mut segments: Vec<PathSegment> = Vec::new();
        for (prefix_string, prefix_path) in &self.sentinel_prefixes {
            let index = match self.counters.get(prefix_string) {
                Some(Some(index)) => *index,
                _ => {
                    return Err(RewrapError::invalid_path(
                        self.target_prefix.clone(),
                        format!("no occurrence counter for '{prefix_string}'"),
                    ));
                }
            };
            let resolved = prefix_path.trail_end()?.substitute_sentinel(index)?;
            segments.extend(resolved.segments().iter().cloned());
        }
        Ok(FieldPath::from_segments(segments))
    }
}

impl<'a, I> Iterator for IndexResolver<'a, I>
where
    I: Iterator<Item = Event<'a>>,
{
    type Item = Result<FieldPath, RewrapError>;

    fn next(&mut self) -> Option<Self::Item> {
        for event in self.events.by_ref() {
            match &event.kind {
                EventKind::StartArray => {
                    let element_prefix = if event.prefix.is_empty() {
                        SENTINEL_SEGMENT.to_string()
                    } else {
                        format!("{}.{SENTINEL_SEGMENT}", event.prefix)
                    };
                    self.counters.insert(element_prefix, None);
                }
                EventKind::Scalar(..) | EventKind::StartMap => {
                    if let Some(counter) = self.counters.get_mut(&event.prefix) {
                        *counter = Some(counter.map_or(0, |seen| seen + 1));
                    }
                }
                EventKind::EndMap | EventKind::EndArray => {}
            }
            if event.prefix == self.target_prefix
                && event.kind.scalar_kind() == Some(self.target_kind)
            {
                return Some(self.emit());
            }
        }
        None
    }
}

/// Resolve all matching occurrences within one in-memory document.
pub fn resolve_in_document<'a>(
    document: &'a Value,
    target: &FieldPath,
    target_kind: ScalarKind,
) -> Result<IndexResolver<'a, DocumentEvents<'a>>, RewrapError> {
    IndexResolver::new(DocumentEvents::new(document), target, target_kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resolved(document: &Value, target: &str) -> Vec<String> {
        let target = FieldPath::parse(target).unwrap();
        resolve_in_document(document, &target, ScalarKind::String)
            .unwrap()
            .map(|path| path.unwrap().to_string())
            .collect()
    }

    #[test]
    fn resolves_string_elements_to_their_indices() {
        let document = json!({"a": [{"x": 1}, "hello", {"x": 2}]});
        assert_eq!(resolved(&document, "a.xitem"), vec!["a[1]"]);
    }

    #[test]
    fn counts_every_scalar_sibling() {
        let document = json!({"a": [1, true, null, "late"]});
        assert_eq!(resolved(&document, "a.xitem"), vec!["a[3]"]);
    }

    #[test]
    fn resolves_nested_sequences_pairwise() {
        let document = json!({
            "a": [
                {"b": ["s1", "s2"]},
                {"b": ["s3"]}
            ]
        });
        assert_eq!(
            resolved(&document, "a.xitem.b.xitem"),
            vec!["a[0].b[0]", "a[0].b[1]", "a[1].b[0]"]
        );
    }

    #[test]
    fn ignores_other_scalar_kinds_at_the_target() {
        let document = json!({"a": ["keep", 7, "also"]});
        assert_eq!(resolved(&document, "a.xitem"), vec!["a[0]", "a[2]"]);
    }

    #[test]
    fn rejects_sentinel_free_targets() {
        let document = json!({"a": "flat"});
        let target = FieldPath::parse("a").unwrap();
        assert!(resolve_in_document(&document, &target, ScalarKind::String).is_err());
    }

    #[test]
    fn separate_counters_per_sequence_prefix() {
        let document = json!({
            "a": ["one"],
            "b": ["two", "three"]
        });
        assert_eq!(resolved(&document, "b.xitem"), vec!["b[0]", "b[1]"]);
    }
}
