//! Artifact entity - one file produced by the emitter
//!
//! Artifacts carry their raw content plus the located references the
//! dependency extractor found in it. Content is never mutated; rewrites go
//! through an edit buffer against the original offsets.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::domain::value_objects::file_extension;

/// What an artifact is, derived from its extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// Executable code (`.js`, `.mjs`, `.cjs`, `.jsx`)
    Code,
    /// Type declarations (`.d.ts` and friends)
    Declaration,
    /// Position map for another artifact (`*.map`)
    PositionMap,
    /// Anything else the emitter produced (JSON, assets)
    Other,
}

impl ArtifactKind {
    /// Classify a path by its compound extension
    pub fn from_path(path: &Path) -> Self {
        match file_extension(path) {
            ".js" | ".mjs" | ".cjs" | ".jsx" => ArtifactKind::Code,
            ".d.ts" | ".d.mts" | ".d.cts" => ArtifactKind::Declaration,
            ext if ext.ends_with(".map") => ArtifactKind::PositionMap,
            _ => ArtifactKind::Other,
        }
    }

    /// Whether artifacts of this kind can own a position map
    pub fn supports_position_map(self) -> bool {
        matches!(self, ArtifactKind::Code | ArtifactKind::Declaration)
    }
}

/// Byte range `[start, end)` inside an artifact's original content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

impl ByteRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Two ranges overlap when they share a byte, or when both start at the
    /// same offset (two edits at one insertion point are ambiguous).
    pub fn overlaps(&self, other: &ByteRange) -> bool {
        self.start == other.start || (self.start < other.end && other.start < self.end)
    }
}

/// A located pointer from one artifact to another module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// Specifier text as written, without quotes
    pub specifier: String,
    /// Range of the specifier inside the quotes
    pub range: ByteRange,
    /// Absolute path of the resolved artifact (`None` when external or unresolved)
    pub target: Option<PathBuf>,
    /// Names a runtime builtin (`fs`, `node:path`) rather than a project file
    pub builtin: bool,
}

impl Reference {
    pub fn new(specifier: impl Into<String>, range: ByteRange) -> Self {
        Self {
            specifier: specifier.into(),
            range,
            target: None,
            builtin: false,
        }
    }

    pub fn with_target(mut self, target: impl Into<PathBuf>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_builtin(mut self, builtin: bool) -> Self {
        self.builtin = builtin;
        self
    }
}

/// A file emitted by the compiler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    path: PathBuf,
    kind: ArtifactKind,
    content: String,
    references: Vec<Reference>,
    source_map: Option<PathBuf>,
}

impl Artifact {
    /// Create an artifact with no references and no position map
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            kind: ArtifactKind::from_path(&path),
            path,
            content: content.into(),
            references: Vec::new(),
            source_map: None,
        }
    }

    pub fn with_references(mut self, references: Vec<Reference>) -> Self {
        self.references = references;
        self
    }

    /// Attach the sibling position map (`<path>.map`)
    pub fn with_source_map(mut self) -> Self {
        if self.kind.supports_position_map() {
            self.source_map = Some(source_map_path(&self.path));
        }
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn references(&self) -> &[Reference] {
        &self.references
    }

    /// Path of the position map this artifact owns, if any
    pub fn source_map(&self) -> Option<&Path> {
        self.source_map.as_deref()
    }

    pub fn is_code(&self) -> bool {
        self.kind == ArtifactKind::Code
    }

    pub fn is_position_map(&self) -> bool {
        self.kind == ArtifactKind::PositionMap
    }
}

/// Sibling position-map path of an artifact
pub fn source_map_path(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_owned();
    os.push(".map");
    PathBuf::from(os)
}
