//! Change planning service
//!
//! Diffs the desired per-package layout against the emitted layout and
//! produces the ordered [`ChangeSet`] that materializes it. Pure: reads
//! artifact contents already in memory, never touches the disk.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::source_map::SourceMap;
use crate::domain::entities::{
    Artifact, ChangeSet, InputModule, OutputModule, PathMap, PathMapConflict, RequiredChange,
    TextEdit,
};
use crate::domain::value_objects::{is_external_url, normalize, relative_path, to_slash, to_specifier};

/// Planning invariant violations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("artifact {} is assigned to more than one package", .0.display())]
    DuplicateAssignment(PathBuf),

    #[error(
        "artifacts {} and {} would both be written to {}",
        first.display(),
        second.display(),
        to.display()
    )]
    DuplicateDestination {
        first: PathBuf,
        second: PathBuf,
        to: PathBuf,
    },

    #[error("{} has no planned destination", .0.display())]
    MissingFinalPath(PathBuf),

    #[error("references in {} overlap at {start}..{end}", artifact.display())]
    OverlappingReferences {
        artifact: PathBuf,
        start: usize,
        end: usize,
    },

    #[error("position map {}: {message}", path.display())]
    InvalidPositionMap { path: PathBuf, message: String },

    #[error("manifest for package '{package}': {message}")]
    Manifest { package: String, message: String },

    #[error("packages '{first}' and '{second}' share the root {}", root.display())]
    DuplicatePackageRoot {
        first: String,
        second: String,
        root: PathBuf,
    },

    #[error(
        "package '{package}' root {} would replace emitted output {}",
        root.display(),
        emitted.display()
    )]
    PackageRootOverlapsEmission {
        package: String,
        root: PathBuf,
        emitted: PathBuf,
    },
}

impl From<PathMapConflict> for PlanError {
    fn from(conflict: PathMapConflict) -> Self {
        match conflict {
            PathMapConflict::DuplicateSource(path) => PlanError::DuplicateAssignment(path),
            PathMapConflict::DuplicateDestination { first, second, to } => {
                PlanError::DuplicateDestination { first, second, to }
            }
        }
    }
}

/// Pure change planner
#[derive(Debug, Clone)]
pub struct ChangePlanner {
    /// Absolute emission root input modules are relative to
    emit_root: PathBuf,
    /// Directory package directories are created in
    output_root: PathBuf,
    /// File name of each package manifest
    manifest_name: String,
}

impl ChangePlanner {
    pub fn new(
        emit_root: impl Into<PathBuf>,
        output_root: impl Into<PathBuf>,
        manifest_name: impl Into<String>,
    ) -> Self {
        Self {
            emit_root: emit_root.into(),
            output_root: output_root.into(),
            manifest_name: manifest_name.into(),
        }
    }

    /// Package root of an output module
    pub fn package_root(&self, module: &OutputModule<'_>) -> PathBuf {
        self.output_root.join(&module.name)
    }

    /// Final location of one artifact of `module`
    fn final_path(&self, module: &OutputModule<'_>, artifact: &Artifact) -> PathBuf {
        let root = self.package_root(module);
        let within = match &module.input {
            InputModule::File { .. } => None,
            InputModule::Directory { directory, .. } => artifact
                .path()
                .strip_prefix(self.emit_root.join(directory))
                .ok(),
        };
        match within {
            Some(rel) => root.join(rel),
            None => root.join(artifact.path().file_name().unwrap_or_default()),
        }
    }

    /// Current path → final path for every partitioned artifact
    pub fn final_paths(&self, modules: &[OutputModule<'_>]) -> Result<PathMap, PlanError> {
        let pairs = modules.iter().flat_map(|module| {
            module
                .artifacts
                .iter()
                .map(move |a| (a.path().to_path_buf(), self.final_path(module, a)))
        });
        Ok(PathMap::try_from_pairs(pairs)?)
    }

    /// Reject package roots that collide with each other or with emitted output
    ///
    /// Applying a plan clears each package root before filling it, so a root
    /// may neither be shared nor hold the emission root or any artifact.
    fn check_roots(&self, modules: &[OutputModule<'_>]) -> Result<(), PlanError> {
        let mut seen: HashMap<PathBuf, &str> = HashMap::new();

        for module in modules {
            let root = self.package_root(module);
            if let Some(first) = seen.get(&root) {
                return Err(PlanError::DuplicatePackageRoot {
                    first: first.to_string(),
                    second: module.name.clone(),
                    root,
                });
            }

            let emitted = std::iter::once(self.emit_root.as_path()).chain(
                modules
                    .iter()
                    .flat_map(|m| m.artifacts.iter().map(|a| a.path())),
            );
            for path in emitted {
                if path.starts_with(&root) {
                    return Err(PlanError::PackageRootOverlapsEmission {
                        package: module.name.clone(),
                        root,
                        emitted: path.to_path_buf(),
                    });
                }
            }

            seen.insert(root, &module.name);
        }
        Ok(())
    }

    /// Plan every change needed to materialize `modules`
    pub fn plan(&self, modules: &[OutputModule<'_>]) -> Result<ChangeSet, PlanError> {
        self.check_roots(modules)?;
        let mut changes = Vec::new();

        for module in modules {
            let root = self.package_root(module);
            let content = module.manifest.to_json().map_err(|e| PlanError::Manifest {
                package: module.name.clone(),
                message: e.to_string(),
            })?;
            changes.push(RequiredChange::CreateDirectory { path: root.clone() });
            changes.push(RequiredChange::WriteManifest {
                path: root.join(&self.manifest_name),
                content,
            });
        }

        let paths = self.final_paths(modules)?;

        for artifact in modules.iter().flat_map(|m| m.artifacts.iter().copied()) {
            if let Some(change) = rewrite_references(artifact, &paths)? {
                changes.push(change);
            }
            if artifact.is_position_map() {
                if let Some(change) = rewrite_map_sources(artifact, &paths)? {
                    changes.push(change);
                }
            }
        }

        changes.extend(paths.iter().map(|(from, to)| RequiredChange::MoveArtifact {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
        }));

        Ok(ChangeSet::new(changes))
    }
}

fn final_dir<'p>(paths: &'p PathMap, artifact: &Path) -> Result<&'p Path, PlanError> {
    paths
        .get(artifact)
        .and_then(Path::parent)
        .ok_or_else(|| PlanError::MissingFinalPath(artifact.to_path_buf()))
}

/// Point every resolved reference at its target's final location
fn rewrite_references(
    artifact: &Artifact,
    paths: &PathMap,
) -> Result<Option<RequiredChange>, PlanError> {
    let mut edits: Vec<TextEdit> = Vec::new();

    for reference in artifact.references() {
        let Some(target) = reference.target.as_deref().and_then(|t| paths.get(t)) else {
            continue;
        };
        let from = final_dir(paths, artifact.path())?;
        edits.push(TextEdit::new(
            reference.range,
            to_specifier(&relative_path(from, target)),
        ));
    }

    if edits.is_empty() {
        return Ok(None);
    }

    edits.sort_by_key(|e| e.range);
    if let Some(pair) = edits.windows(2).find(|w| w[0].range.overlaps(&w[1].range)) {
        return Err(PlanError::OverlappingReferences {
            artifact: artifact.path().to_path_buf(),
            start: pair[1].range.start,
            end: pair[1].range.end,
        });
    }

    Ok(Some(RequiredChange::RewriteReferences {
        artifact: artifact.path().to_path_buf(),
        edits,
    }))
}

/// Re-express a position map's sources relative to its final location
///
/// Sources that are tracked artifacts follow them; everything else keeps
/// pointing at where it is now. Unchanged lists produce no change.
fn rewrite_map_sources(
    artifact: &Artifact,
    paths: &PathMap,
) -> Result<Option<RequiredChange>, PlanError> {
    let map = SourceMap::parse(artifact.content()).map_err(|e| PlanError::InvalidPositionMap {
        path: artifact.path().to_path_buf(),
        message: e.to_string(),
    })?;

    let current_dir = artifact.path().parent().unwrap_or(Path::new(""));
    let base = match map.source_root.as_deref() {
        Some(root) if !root.is_empty() && !is_external_url(root) => current_dir.join(root),
        _ => current_dir.to_path_buf(),
    };
    let new_dir = final_dir(paths, artifact.path())?;

    let rewritten: Vec<Option<String>> = map
        .sources
        .iter()
        .map(|source| {
            source.as_ref().map(|s| {
                if is_external_url(s) {
                    return s.clone();
                }
                let absolute = normalize(&base.join(s));
                let target = paths.get(&absolute).unwrap_or(absolute.as_path());
                to_slash(&relative_path(new_dir, target))
            })
        })
        .collect();

    if rewritten == map.sources {
        return Ok(None);
    }

    Ok(Some(RequiredChange::RewritePositionMapSources {
        map: artifact.path().to_path_buf(),
        sources: rewritten,
    }))
}
