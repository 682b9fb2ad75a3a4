//! Streaming JSON event tokenizer.
//!
//! One tokenizer implementation serves both the schema difference detector
//! and the path resolver, so the two streaming passes share prefix spelling
//! and traversal order instead of duplicating walk logic.

use serde_json::Value;

use crate::constants::paths::{PATH_DELIMITER, SENTINEL_SEGMENT};
use crate::types::PathString;

/// Kind of a scalar value observed in the stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScalarKind {
    /// JSON null.
    Null,
    /// JSON true/false.
    Boolean,
    /// JSON number.
    Number,
    /// JSON string.
    String,
}

/// One traversal event.
#[derive(Clone, Debug)]
pub struct Event<'a> {
    /// Dotted prefix of the value this event belongs to. Array elements
    /// append the sentinel segment to the enclosing array's prefix; the
    /// document root has the empty prefix.
    pub prefix: PathString,
    /// What was observed at the prefix.
    pub kind: EventKind<'a>,
}

/// Event payload.
#[derive(Clone, Debug)]
pub enum EventKind<'a> {
    /// A mapping begins.
    StartMap,
    /// The mapping at this prefix ended.
    EndMap,
    /// A sequence begins.
    StartArray,
    /// The sequence at this prefix ended.
    EndArray,
    /// A scalar value.
    Scalar(ScalarKind, &'a Value),
}

impl EventKind<'_> {
    /// Scalar kind of this event, if it is a scalar.
    pub fn scalar_kind(&self) -> Option<ScalarKind> {
        match self {
            Self::Scalar(kind, _) => Some(*kind),
            _ => None,
        }
    }
}

enum Frame<'a> {
    Map {
        prefix: PathString,
        entries: serde_json::map::Iter<'a>,
    },
    Array {
        prefix: PathString,
        items: std::slice::Iter<'a, Value>,
    },
}

enum Step<'a> {
    Child(PathString, &'a Value),
    End(PathString, bool),
}

/// Lazy, forward-only event stream over one JSON document.
///
/// Implemented with an explicit frame stack; a fresh pass requires a fresh
/// stream.
pub struct DocumentEvents<'a> {
    root: Option<&'a Value>,
    stack: Vec<Frame<'a>>,
}

impl<'a> DocumentEvents<'a> {
    /// Start a pass over `document`.
    pub fn new(document: &'a Value) -> Self {
        Self {
            root: Some(document),
            stack: Vec::new(),
        }
    }

    fn enter(&mut self, prefix: PathString, value: &'a Value) -> Event<'a> {
        match value {
            Value::Object(map) => {
                self.stack.push(Frame::Map {
                    prefix: prefix.clone(),
                    entries: map.iter(),
                });
                Event {
                    prefix,
                    kind: EventKind::StartMap,
                }
            }
            Value::Array(items) => {
                self.stack.push(Frame::Array {
                    prefix: prefix.clone(),
                    items: items.iter(),
                });
                Event {
                    prefix,
                    kind: EventKind::StartArray,
                }
            }
            Value::Null => Event {
                prefix,
                kind: EventKind::Scalar(ScalarKind::Null, value),
            },
            Value::Bool(_) => Event {
                prefix,
                kind: EventKind::Scalar(ScalarKind::Boolean, value),
            },
            Value::Number(_) => Event {
                prefix,
                kind: EventKind::Scalar(ScalarKind::Number, value),
            },
            Value::String(_) => Event {
                prefix,
                kind: EventKind::Scalar(ScalarKind::String, value),
            },
        }
    }
}

impl<'a> Iterator for DocumentEvents<'a> {
    type Item = Event<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(root) = self.root.take() {
            return Some(self.enter(PathString::new(), root));
        }
        let step = match self.stack.last_mut()? {
            Frame::Map { prefix, entries } => match entries.next() {
                Some((key, value)) => Step::Child(join_prefix(prefix, key), value),
                None => Step::End(prefix.clone(), true),
            },
            Frame::Array { prefix, items } => match items.next() {
                Some(value) => Step::Child(join_prefix(prefix, SENTINEL_SEGMENT), value),
                None => Step::End(prefix.clone(), false),
            },
        };
        match step {
            Step::Child(prefix, value) => Some(self.enter(prefix, value)),
            Step::End(prefix, is_map) => {
                self.stack.pop();
                let kind = if is_map {
                    EventKind::EndMap
                } else {
                    EventKind::EndArray
                };
                Some(Event { prefix, kind })
            }
        }
    }
}

fn join_prefix(prefix: &str, segment: &str) -> PathString {
    if prefix.is_empty() {
        segment.to_string()
    } else {
        let mut joined = PathString::with_capacity(prefix.len() + 1 + segment.len());
        joined.push_str(prefix);
        joined.push(PATH_DELIMITER);
        joined.push_str(segment);
        joined
    }
}
