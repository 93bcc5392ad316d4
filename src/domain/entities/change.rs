//! Required changes - the planner's output, the applier's input
//!
//! Changes are pure data. A [`ChangeSet`] keeps them in phase order:
//! layout (directories, manifests), then rewrites, then moves.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::artifact::ByteRange;

/// Replacement text for one byte range of an artifact's original content
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextEdit {
    pub range: ByteRange,
    pub replacement: String,
}

impl TextEdit {
    pub fn new(range: ByteRange, replacement: impl Into<String>) -> Self {
        Self {
            range,
            replacement: replacement.into(),
        }
    }
}

/// One filesystem or content change
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum RequiredChange {
    CreateDirectory {
        path: PathBuf,
    },
    WriteManifest {
        path: PathBuf,
        content: String,
    },
    RewriteReferences {
        artifact: PathBuf,
        edits: Vec<TextEdit>,
    },
    RewritePositionMapSources {
        map: PathBuf,
        sources: Vec<Option<String>>,
    },
    MoveArtifact {
        from: PathBuf,
        to: PathBuf,
    },
}

/// Apply phases; every change of a phase commits before the next starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ChangePhase {
    Layout,
    Rewrite,
    Move,
}

impl RequiredChange {
    pub fn phase(&self) -> ChangePhase {
        match self {
            RequiredChange::CreateDirectory { .. } | RequiredChange::WriteManifest { .. } => {
                ChangePhase::Layout
            }
            RequiredChange::RewriteReferences { .. }
            | RequiredChange::RewritePositionMapSources { .. } => ChangePhase::Rewrite,
            RequiredChange::MoveArtifact { .. } => ChangePhase::Move,
        }
    }
}

/// Immutable current-path → final-path mapping
///
/// Built once by the planner and only read afterwards, so it can be shared
/// by reference across every apply worker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathMap {
    entries: BTreeMap<PathBuf, PathBuf>,
}

/// Why a [`PathMap`] could not be built
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathMapConflict {
    /// The same artifact was assigned twice
    DuplicateSource(PathBuf),
    /// Two artifacts would land on the same path
    DuplicateDestination {
        first: PathBuf,
        second: PathBuf,
        to: PathBuf,
    },
}

impl PathMap {
    /// Build from `(from, to)` pairs, rejecting duplicate sources and destinations
    pub fn try_from_pairs<I>(pairs: I) -> Result<Self, PathMapConflict>
    where
        I: IntoIterator<Item = (PathBuf, PathBuf)>,
    {
        let mut entries = BTreeMap::new();
        let mut claimed: HashMap<PathBuf, PathBuf> = HashMap::new();

        for (from, to) in pairs {
            if entries.contains_key(&from) {
                return Err(PathMapConflict::DuplicateSource(from));
            }
            if let Some(first) = claimed.get(&to) {
                return Err(PathMapConflict::DuplicateDestination {
                    first: first.clone(),
                    second: from,
                    to,
                });
            }
            claimed.insert(to.clone(), from.clone());
            entries.insert(from, to);
        }

        Ok(Self { entries })
    }

    pub fn get(&self, from: &Path) -> Option<&Path> {
        self.entries.get(from).map(PathBuf::as_path)
    }

    pub fn contains(&self, from: &Path) -> bool {
        self.entries.contains_key(from)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Path, &Path)> {
        self.entries
            .iter()
            .map(|(from, to)| (from.as_path(), to.as_path()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Ordered list of required changes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ChangeSet {
    changes: Vec<RequiredChange>,
}

impl ChangeSet {
    /// Wrap changes, sorting them into phase order (stable within a phase)
    pub fn new(mut changes: Vec<RequiredChange>) -> Self {
        changes.sort_by_key(RequiredChange::phase);
        Self { changes }
    }

    pub fn changes(&self) -> &[RequiredChange] {
        &self.changes
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Whether no change precedes one of an earlier phase
    pub fn is_phase_ordered(&self) -> bool {
        self.changes
            .windows(2)
            .all(|pair| pair[0].phase() <= pair[1].phase())
    }

    pub fn directories(&self) -> impl Iterator<Item = &Path> {
        self.changes.iter().filter_map(|c| match c {
            RequiredChange::CreateDirectory { path } => Some(path.as_path()),
            _ => None,
        })
    }

    pub fn manifests(&self) -> impl Iterator<Item = (&Path, &str)> {
        self.changes.iter().filter_map(|c| match c {
            RequiredChange::WriteManifest { path, content } => {
                Some((path.as_path(), content.as_str()))
            }
            _ => None,
        })
    }

    pub fn moves(&self) -> impl Iterator<Item = (&Path, &Path)> {
        self.changes.iter().filter_map(|c| match c {
            RequiredChange::MoveArtifact { from, to } => Some((from.as_path(), to.as_path())),
            _ => None,
        })
    }

    /// Reference edits grouped by artifact
    pub fn reference_edits(&self) -> HashMap<&Path, Vec<&TextEdit>> {
        let mut grouped: HashMap<&Path, Vec<&TextEdit>> = HashMap::new();
        for change in &self.changes {
            if let RequiredChange::RewriteReferences { artifact, edits } = change {
                grouped
                    .entry(artifact.as_path())
                    .or_default()
                    .extend(edits.iter());
            }
        }
        grouped
    }

    /// Replacement source lists keyed by position-map path
    pub fn source_rewrites(&self) -> HashMap<&Path, &[Option<String>]> {
        self.changes
            .iter()
            .filter_map(|c| match c {
                RequiredChange::RewritePositionMapSources { map, sources } => {
                    Some((map.as_path(), sources.as_slice()))
                }
                _ => None,
            })
            .collect()
    }

    /// Move destinations keyed by source path
    pub fn destinations(&self) -> Result<PathMap, PathMapConflict> {
        PathMap::try_from_pairs(
            self.moves()
                .map(|(from, to)| (from.to_path_buf(), to.to_path_buf())),
        )
    }
}
