//! Position maps (source map v3)
//!
//! Parsing, serialization, and composition of position maps. Composition is
//! a pure function: [`compose`] maps positions of the outer map's generated
//! file straight to the inner map's sources, and [`compose_chain`] folds any
//! number of stages the same way.

mod vlq;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use vlq::{decode, encode};

/// Decoded mappings: one vector of segments per generated line
pub type Mappings = Vec<Vec<Segment>>;

/// A position in an original source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OriginalPosition {
    pub source: u32,
    pub line: u32,
    pub column: u32,
    pub name: Option<u32>,
}

/// One mapping segment on a generated line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub generated_column: u32,
    pub original: Option<OriginalPosition>,
}

/// Position-map parse or composition failure
#[derive(Debug, Error)]
pub enum MapError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported source map version {0}")]
    UnsupportedVersion(u32),

    #[error("invalid mappings on line {line}: {message}")]
    Mappings { line: usize, message: String },

    #[error("segment refers to {what} {index}, but only {count} exist")]
    IndexOutOfRange {
        what: &'static str,
        index: u32,
        count: usize,
    },

    #[error("replacement sources list has {actual} entries, map has {expected}")]
    SourceCount { expected: usize, actual: usize },

    #[error("nothing to compose")]
    EmptyChain,
}

impl From<vlq::DecodeError> for MapError {
    fn from(err: vlq::DecodeError) -> Self {
        MapError::Mappings {
            line: err.line,
            message: err.message,
        }
    }
}

/// A version 3 source map document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMap {
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_root: Option<String>,
    #[serde(default)]
    pub sources: Vec<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources_content: Option<Vec<Option<String>>>,
    #[serde(default)]
    pub names: Vec<String>,
    pub mappings: String,
}

impl SourceMap {
    /// Build a map from decoded mappings
    pub fn from_mappings(
        file: Option<String>,
        sources: Vec<Option<String>>,
        names: Vec<String>,
        mappings: &Mappings,
    ) -> Self {
        Self {
            version: 3,
            file,
            source_root: None,
            sources,
            sources_content: None,
            names,
            mappings: encode(mappings),
        }
    }

    pub fn parse(json: &str) -> Result<Self, MapError> {
        let map: SourceMap = serde_json::from_str(json)?;
        if map.version != 3 {
            return Err(MapError::UnsupportedVersion(map.version));
        }
        Ok(map)
    }

    pub fn to_json(&self) -> Result<String, MapError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn decode(&self) -> Result<Mappings, MapError> {
        Ok(decode(&self.mappings)?)
    }

    /// Replace the sources list, keeping indexes aligned
    ///
    /// The new entries are taken as already resolved, so `sourceRoot` is dropped.
    pub fn with_sources(mut self, sources: Vec<Option<String>>) -> Result<Self, MapError> {
        if sources.len() != self.sources.len() {
            return Err(MapError::SourceCount {
                expected: self.sources.len(),
                actual: sources.len(),
            });
        }
        self.sources = sources;
        self.source_root = None;
        Ok(self)
    }
}

/// Index table that hands out stable indexes in first-use order
struct Interner<K> {
    index: HashMap<K, u32>,
    next: u32,
}

impl<K: std::hash::Hash + Eq> Interner<K> {
    fn new() -> Self {
        Self {
            index: HashMap::new(),
            next: 0,
        }
    }

    /// Returns the index and whether the key is new
    fn intern(&mut self, key: K) -> (u32, bool) {
        if let Some(&i) = self.index.get(&key) {
            return (i, false);
        }
        let i = self.next;
        self.index.insert(key, i);
        self.next += 1;
        (i, true)
    }
}

/// Greatest segment on `line` whose generated column is `<= column`
fn trace(lines: &Mappings, line: u32, column: u32) -> Option<&Segment> {
    let segments = lines.get(line as usize)?;
    let upper = segments.partition_point(|s| s.generated_column <= column);
    upper.checked_sub(1).map(|i| &segments[i])
}

fn lookup<'m>(
    table: &'m [String],
    index: u32,
) -> Result<&'m str, MapError> {
    table
        .get(index as usize)
        .map(String::as_str)
        .ok_or(MapError::IndexOutOfRange {
            what: "name",
            index,
            count: table.len(),
        })
}

/// Compose two stages into one
///
/// `outer` maps the final file to an intermediate file; `inner` maps that
/// intermediate file to the original sources. The result maps the final
/// file directly to `inner`'s sources. Segments that trace to nothing in
/// `inner` are dropped; sourceless outer segments are kept.
pub fn compose(outer: &SourceMap, inner: &SourceMap) -> Result<SourceMap, MapError> {
    let outer_lines = outer.decode()?;
    let inner_lines = inner.decode()?;

    let mut source_ids: Interner<u32> = Interner::new();
    let mut sources = Vec::new();
    let mut contents = Vec::new();
    let mut name_ids: Interner<String> = Interner::new();
    let mut names = Vec::new();

    let mut lines = Vec::with_capacity(outer_lines.len());
    for outer_line in &outer_lines {
        let mut line = Vec::with_capacity(outer_line.len());
        for segment in outer_line {
            let Some(pos) = segment.original else {
                line.push(*segment);
                continue;
            };
            let Some(traced) = trace(&inner_lines, pos.line, pos.column) else {
                continue;
            };
            let Some(origin) = traced.original else {
                continue;
            };

            let inner_source = inner.sources.get(origin.source as usize).ok_or(
                MapError::IndexOutOfRange {
                    what: "source",
                    index: origin.source,
                    count: inner.sources.len(),
                },
            )?;
            let (source, is_new) = source_ids.intern(origin.source);
            if is_new {
                sources.push(inner_source.clone());
                contents.push(
                    inner
                        .sources_content
                        .as_ref()
                        .and_then(|c| c.get(origin.source as usize).cloned().flatten()),
                );
            }

            let name = match (origin.name, pos.name) {
                (Some(n), _) => Some(lookup(&inner.names, n)?),
                (None, Some(n)) => Some(lookup(&outer.names, n)?),
                (None, None) => None,
            };
            let name = name.map(|n| {
                let (id, is_new) = name_ids.intern(n.to_string());
                if is_new {
                    names.push(n.to_string());
                }
                id
            });

            line.push(Segment {
                generated_column: segment.generated_column,
                original: Some(OriginalPosition {
                    source,
                    line: origin.line,
                    column: origin.column,
                    name,
                }),
            });
        }
        lines.push(line);
    }

    let mut composed = SourceMap::from_mappings(outer.file.clone(), sources, names, &lines);
    composed.source_root = inner.source_root.clone();
    if contents.iter().any(Option::is_some) {
        composed.sources_content = Some(contents);
    }
    Ok(composed)
}

/// Compose any number of stages, outermost first
pub fn compose_chain(maps: &[SourceMap]) -> Result<SourceMap, MapError> {
    let (first, rest) = maps.split_first().ok_or(MapError::EmptyChain)?;
    rest.iter()
        .try_fold(first.clone(), |acc, inner| compose(&acc, inner))
}
