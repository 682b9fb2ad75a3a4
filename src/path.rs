//! Parsed dotted-path representation shared by the resolver and rewriter.
//!
//! Paths are parsed once into segment sequences and formatted back on
//! demand; no component re-parses path strings at access time.

use std::fmt;

use serde::Serialize;

use crate::constants::paths::{INDEX_CLOSE, INDEX_OPEN, PATH_DELIMITER, SENTINEL_SEGMENT};
use crate::errors::RewrapError;

/// One segment of a dotted field path.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum PathSegment {
    /// Plain mapping key.
    Key(String),
    /// Sentinel marking any element of the nearest enclosing sequence.
    AnyItem,
    /// Mapping key whose sequence value is addressed at a concrete index.
    Indexed {
        /// Key of the sequence-valued field.
        key: String,
        /// Zero-based element index.
        index: usize,
    },
}

impl PathSegment {
    fn parse(part: &str) -> Result<Self, String> {
        if part.is_empty() {
            return Err("empty segment".to_string());
        }
        if part == SENTINEL_SEGMENT {
            return Ok(Self::AnyItem);
        }
        match part.find(INDEX_OPEN) {
            Some(open) => {
                if !part.ends_with(INDEX_CLOSE) {
                    return Err(format!("segment '{part}' has an unterminated index"));
                }
                let key = &part[..open];
                let digits = &part[open + 1..part.len() - 1];
                if key.is_empty() {
                    return Err(format!("segment '{part}' has no key before its index"));
                }
                if digits.contains(INDEX_OPEN) || digits.contains(INDEX_CLOSE) {
                    return Err(format!("segment '{part}' has nested brackets"));
                }
                let index = digits
                    .parse::<usize>()
                    .map_err(|_| format!("segment '{part}' has a non-numeric index"))?;
                Ok(Self::Indexed {
                    key: key.to_string(),
                    index,
                })
            }
            None if part.contains(INDEX_CLOSE) => {
                Err(format!("segment '{part}' has an unopened index"))
            }
            None => Ok(Self::Key(part.to_string())),
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(key),
            Self::AnyItem => f.write_str(SENTINEL_SEGMENT),
            Self::Indexed { key, index } => {
                write!(f, "{key}{INDEX_OPEN}{index}{INDEX_CLOSE}")
            }
        }
    }
}

/// Immutable dotted field path (data spelling).
///
/// A path with `AnyItem` segments addresses every element of the named
/// sequences; a fully `Indexed` path addresses one exact location inside one
/// specific document.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct FieldPath {
    segments: Vec<PathSegment>,
}

impl FieldPath {
    /// Parse a dotted path string such as `drug.xitem.name` or `drug[2].name`.
    pub fn parse(raw: &str) -> Result<Self, RewrapError> {
        if raw.is_empty() {
            return Err(RewrapError::invalid_path(raw, "empty path"));
        }
        let segments = raw
            .split(PATH_DELIMITER)
            .map(|part| {
                PathSegment::parse(part).map_err(|reason| RewrapError::invalid_path(raw, reason))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { segments })
    }

    /// Build a path directly from parsed segments.
    pub fn from_segments(segments: Vec<PathSegment>) -> Self {
        Self { segments }
    }

    /// Parsed segments in order.
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Split off the final segment, if any.
    pub fn split_last(&self) -> Option<(&PathSegment, &[PathSegment])> {
        self.segments.split_last()
    }

    /// Number of sentinel segments in the path.
    pub fn sentinel_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|segment| matches!(segment, PathSegment::AnyItem))
            .count()
    }

    /// Prefixes of this path ending at each sentinel segment, in order.
    pub fn sentinel_prefixes(&self) -> Vec<Self> {
        self.segments
            .iter()
            .enumerate()
            .filter(|(_, segment)| matches!(segment, PathSegment::AnyItem))
            .map(|(idx, _)| Self::from_segments(self.segments[..=idx].to_vec()))
            .collect()
    }

    /// Shortest trailing span of the path containing exactly one sentinel.
    ///
    /// A single-sentinel path is returned unchanged. A two-sentinel path is
    /// trimmed to the span after its first sentinel (`x.xitem.y.xitem.z`
    /// yields `y.xitem.z`). Paths with no sentinel, or with three or more,
    /// are not resolvable.
    pub fn trail_end(&self) -> Result<Self, RewrapError> {
        match self.sentinel_count() {
            0 => Err(RewrapError::invalid_path(
                self.to_string(),
                "no sentinel segment",
            )),
            1 => Ok(self.clone()),
            2 => {
                let first = self
                    .segments
                    .iter()
                    .position(|segment| matches!(segment, PathSegment::AnyItem))
                    .expect("sentinel counted above");
                Ok(Self::from_segments(self.segments[first + 1..].to_vec()))
            }
            more => Err(RewrapError::invalid_path(
                self.to_string(),
                format!("{more} sentinel segments are ambiguous"),
            )),
        }
    }

    /// Replace the single sentinel segment with a concrete element index.
    ///
    /// The sentinel merges with its preceding key segment (`drug.xitem`
    /// with index 2 yields `drug[2]`). A sentinel with no preceding key
    /// (a root-level or directly nested sequence) is not addressable.
    pub fn substitute_sentinel(&self, index: usize) -> Result<Self, RewrapError> {
        let mut segments = Vec::with_capacity(self.segments.len());
        let mut replaced = false;
        let mut idx = 0;
        while idx < self.segments.len() {
            match (&self.segments[idx], self.segments.get(idx + 1)) {
                (PathSegment::Key(key), Some(PathSegment::AnyItem)) => {
                    segments.push(PathSegment::Indexed {
                        key: key.clone(),
                        index,
                    });
                    replaced = true;
                    idx += 2;
                }
                (PathSegment::AnyItem, _) => {
                    return Err(RewrapError::invalid_path(
                        self.to_string(),
                        "sentinel segment has no preceding key",
                    ));
                }
                (segment, _) => {
                    segments.push(segment.clone());
                    idx += 1;
                }
            }
        }
        if !replaced {
            return Err(RewrapError::invalid_path(
                self.to_string(),
                "no sentinel segment",
            ));
        }
        Ok(Self::from_segments(segments))
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, segment) in self.segments.iter().enumerate() {
            if idx > 0 {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display_round_trip() {
        for raw in ["a", "a.xitem", "a.xitem.b.xitem", "drug[2].name", "a.b[0]"] {
            let path = FieldPath::parse(raw).unwrap();
            assert_eq!(path.to_string(), raw);
        }
    }

    #[test]
    fn parse_rejects_malformed_segments() {
        assert!(FieldPath::parse("").is_err());
        assert!(FieldPath::parse("a..b").is_err());
        assert!(FieldPath::parse("a[").is_err());
        assert!(FieldPath::parse("a[x]").is_err());
        assert!(FieldPath::parse("[3]").is_err());
        assert!(FieldPath::parse("a]3[").is_err());
    }

    #[test]
    fn trail_end_is_identity_for_single_sentinel() {
        for raw in ["a.xitem", "a.b.xitem", "a.xitem.b"] {
            let path = FieldPath::parse(raw).unwrap();
            assert_eq!(path.trail_end().unwrap(), path);
        }
    }

    #[test]
    fn trail_end_trims_to_span_after_first_sentinel() {
        let path = FieldPath::parse("x.xitem.y.xitem.z").unwrap();
        assert_eq!(path.trail_end().unwrap().to_string(), "y.xitem.z");

        let path = FieldPath::parse("a.xitem.b.xitem").unwrap();
        assert_eq!(path.trail_end().unwrap().to_string(), "b.xitem");
    }

    #[test]
    fn trail_end_rejects_sentinel_free_and_deeply_nested_paths() {
        assert!(FieldPath::parse("a.b").unwrap().trail_end().is_err());
        assert!(
            FieldPath::parse("a.xitem.b.xitem.c.xitem")
                .unwrap()
                .trail_end()
                .is_err()
        );
    }

    #[test]
    fn sentinel_prefixes_end_at_each_sentinel() {
        let path = FieldPath::parse("a.xitem.b.xitem").unwrap();
        let prefixes: Vec<String> = path
            .sentinel_prefixes()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(prefixes, vec!["a.xitem", "a.xitem.b.xitem"]);
    }

    #[test]
    fn substitute_sentinel_merges_index_into_key() {
        let path = FieldPath::parse("b.xitem").unwrap();
        assert_eq!(path.substitute_sentinel(4).unwrap().to_string(), "b[4]");

        let path = FieldPath::parse("a.xitem.c").unwrap();
        assert_eq!(path.substitute_sentinel(0).unwrap().to_string(), "a[0].c");
    }

    #[test]
    fn substitute_sentinel_rejects_leading_sentinel() {
        let path = FieldPath::parse("xitem").unwrap();
        assert!(path.substitute_sentinel(0).is_err());
    }
}
