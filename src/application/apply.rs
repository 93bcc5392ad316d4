//! Change application
//!
//! Executes a [`ChangeSet`] in five phases on a bounded worker pool:
//!
//! 1. Create package directories (replacing stale ones)
//! 2. Write manifests
//! 3. Rewrite references and builtin specifiers, writing to the destination
//! 4. Compose position maps of rewritten artifacts
//! 5. Copy every remaining artifact to its destination
//!
//! Work inside a phase runs concurrently; phases never overlap. The emitted
//! tree is only read. Any failure removes every package directory created
//! so far, in reverse creation order.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::entities::{Artifact, ByteRange, ChangeSet, PathMap, TextEdit};
use crate::domain::ports::FileSystem;
use crate::domain::services::change_planner::PlanError;
use crate::domain::services::{compose, EditBuffer, SourceMap};
use crate::error::{SplitError, SplitResult};

/// Counts of what was written
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplySummary {
    pub directories: usize,
    pub manifests: usize,
    pub rewritten: usize,
    pub composed_maps: usize,
    pub copied: usize,
}

/// Package directories created during one application
///
/// Removes them in reverse order when dropped, unless released.
struct CreatedDirectories<'a, F: FileSystem> {
    fs: &'a F,
    created: Vec<PathBuf>,
    released: bool,
}

impl<'a, F: FileSystem> CreatedDirectories<'a, F> {
    fn new(fs: &'a F) -> Self {
        Self {
            fs,
            created: Vec::new(),
            released: false,
        }
    }

    fn push(&mut self, path: PathBuf) {
        self.created.push(path);
    }

    fn release(mut self) {
        self.released = true;
    }
}

impl<F: FileSystem> Drop for CreatedDirectories<'_, F> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        warn!(count = self.created.len(), "rolling back package directories");
        for dir in self.created.iter().rev() {
            if let Err(e) = self.fs.remove_dir_all(dir) {
                warn!(path = %dir.display(), error = %e, "could not remove package directory");
            }
        }
    }
}

/// Result of rewriting one artifact in phase 3
struct Rewritten {
    artifact: PathBuf,
    /// Position map owned by the artifact, with the edit map to compose onto it
    edit_map: Option<(PathBuf, SourceMap)>,
}

/// Applies planned changes to a file system
pub struct ChangeApplier<'a, F: FileSystem> {
    fs: &'a F,
    builtin_prefix: String,
    jobs: usize,
}

impl<'a, F: FileSystem> ChangeApplier<'a, F> {
    /// `jobs` of 0 uses the available parallelism
    pub fn new(fs: &'a F, builtin_prefix: impl Into<String>, jobs: usize) -> Self {
        Self {
            fs,
            builtin_prefix: builtin_prefix.into(),
            jobs,
        }
    }

    /// Apply `changes` for `artifacts`, all or nothing
    pub fn apply(&self, artifacts: &[Artifact], changes: &ChangeSet) -> SplitResult<ApplySummary> {
        let destinations = changes
            .destinations()
            .map_err(|c| SplitError::Plan(PlanError::from(c)))?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .build()?;

        let mut guard = CreatedDirectories::new(self.fs);
        let summary = pool.install(|| self.run(artifacts, changes, &destinations, &mut guard))?;
        guard.release();

        info!(
            packages = summary.directories,
            rewritten = summary.rewritten,
            maps = summary.composed_maps,
            copied = summary.copied,
            "changes applied"
        );
        Ok(summary)
    }

    fn run(
        &self,
        artifacts: &[Artifact],
        changes: &ChangeSet,
        destinations: &PathMap,
        guard: &mut CreatedDirectories<'_, F>,
    ) -> SplitResult<ApplySummary> {
        let by_path: HashMap<&Path, &Artifact> =
            artifacts.iter().map(|a| (a.path(), a)).collect();
        let mut summary = ApplySummary::default();

        summary.directories = self.create_directories(changes, guard)?;
        summary.manifests = self.write_manifests(changes)?;

        let rewritten = self.rewrite_artifacts(artifacts, changes, destinations, &by_path)?;
        summary.rewritten = rewritten.len();

        let composed = self.compose_maps(&rewritten, changes, destinations, &by_path)?;
        summary.composed_maps = composed.len();

        let done: HashSet<&Path> = rewritten
            .iter()
            .map(|r| r.artifact.as_path())
            .chain(composed.iter().map(PathBuf::as_path))
            .collect();
        summary.copied = self.copy_remaining(changes, &done, &by_path)?;

        Ok(summary)
    }

    /// Phase 1
    fn create_directories(
        &self,
        changes: &ChangeSet,
        guard: &mut CreatedDirectories<'_, F>,
    ) -> SplitResult<usize> {
        let dirs: Vec<&Path> = changes.directories().collect();
        info!(count = dirs.len(), "creating package directories");

        let results: Vec<(&Path, SplitResult<()>)> = dirs
            .par_iter()
            .map(|dir| (*dir, self.create_directory(dir)))
            .collect();

        let mut first_error = None;
        for (dir, result) in results {
            match result {
                Ok(()) => guard.push(dir.to_path_buf()),
                Err(e) => {
                    // A partially replaced directory is ours to clean up too.
                    guard.push(dir.to_path_buf());
                    first_error.get_or_insert(e);
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(dirs.len()),
        }
    }

    fn create_directory(&self, dir: &Path) -> SplitResult<()> {
        if self.fs.exists(dir) {
            debug!(path = %dir.display(), "removing stale package directory");
            self.fs.remove_dir_all(dir)?;
        }
        self.fs.create_dir_all(dir)?;
        Ok(())
    }

    /// Phase 2
    fn write_manifests(&self, changes: &ChangeSet) -> SplitResult<usize> {
        let manifests: Vec<(&Path, &str)> = changes.manifests().collect();
        info!(count = manifests.len(), "writing manifests");

        manifests.par_iter().try_for_each(|(path, content)| {
            debug!(path = %path.display(), "manifest");
            self.fs.write(path, content).map_err(SplitError::from)
        })?;
        Ok(manifests.len())
    }

    /// Edits for one artifact: planned rewrites plus builtin markers
    fn edits_for(
        &self,
        artifact: &Artifact,
        planned: Option<&Vec<&TextEdit>>,
    ) -> Vec<(ByteRange, String)> {
        let mut edits: Vec<_> = planned
            .into_iter()
            .flatten()
            .map(|e| (e.range, e.replacement.clone()))
            .collect();

        edits.extend(
            artifact
                .references()
                .iter()
                .filter(|r| r.builtin && !r.specifier.starts_with(&self.builtin_prefix))
                .map(|r| (r.range, format!("{}{}", self.builtin_prefix, r.specifier))),
        );
        edits
    }

    /// Phase 3
    fn rewrite_artifacts(
        &self,
        artifacts: &[Artifact],
        changes: &ChangeSet,
        destinations: &PathMap,
        by_path: &HashMap<&Path, &Artifact>,
    ) -> SplitResult<Vec<Rewritten>> {
        let planned = changes.reference_edits();

        let pending: Vec<(&Artifact, Vec<_>)> = artifacts
            .iter()
            .filter(|a| !a.is_position_map() && destinations.contains(a.path()))
            .map(|a| (a, self.edits_for(a, planned.get(a.path()))))
            .filter(|(_, edits)| !edits.is_empty())
            .collect();
        info!(count = pending.len(), "rewriting references");

        pending
            .into_par_iter()
            .map(|(artifact, edits)| self.rewrite_one(artifact, edits, destinations, by_path))
            .collect()
    }

    fn rewrite_one(
        &self,
        artifact: &Artifact,
        edits: Vec<(ByteRange, String)>,
        destinations: &PathMap,
        by_path: &HashMap<&Path, &Artifact>,
    ) -> SplitResult<Rewritten> {
        let path = artifact.path();
        let to = destinations
            .get(path)
            .ok_or_else(|| SplitError::MissingDestination {
                path: path.to_path_buf(),
            })?;

        let mut buffer = EditBuffer::new(artifact.content());
        for (range, replacement) in edits {
            buffer
                .overwrite(range, replacement)
                .map_err(|source| SplitError::Edit {
                    path: path.to_path_buf(),
                    source,
                })?;
        }

        debug!(from = %path.display(), to = %to.display(), "rewrite");
        self.fs.write(to, &buffer.to_string())?;

        let edit_map = artifact
            .source_map()
            .filter(|map| by_path.contains_key(map) && destinations.contains(map))
            .map(|map| {
                let name = to
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                (map.to_path_buf(), buffer.generate_map(&name, &name))
            });

        Ok(Rewritten {
            artifact: path.to_path_buf(),
            edit_map,
        })
    }

    /// Phase 4: returns the maps written
    fn compose_maps(
        &self,
        rewritten: &[Rewritten],
        changes: &ChangeSet,
        destinations: &PathMap,
        by_path: &HashMap<&Path, &Artifact>,
    ) -> SplitResult<Vec<PathBuf>> {
        let source_rewrites = changes.source_rewrites();
        let maps: Vec<&(PathBuf, SourceMap)> =
            rewritten.iter().filter_map(|r| r.edit_map.as_ref()).collect();
        info!(count = maps.len(), "composing position maps");

        maps.par_iter()
            .map(|(map_path, edit_map)| -> SplitResult<PathBuf> {
                let map_error = |source| SplitError::PositionMap {
                    path: map_path.clone(),
                    source,
                };
                let artifact = by_path
                    .get(map_path.as_path())
                    .ok_or_else(|| SplitError::MissingDestination {
                        path: map_path.clone(),
                    })?;
                let to = destinations
                    .get(map_path)
                    .ok_or_else(|| SplitError::MissingDestination {
                        path: map_path.clone(),
                    })?;

                let mut inner = SourceMap::parse(artifact.content()).map_err(map_error)?;
                if let Some(sources) = source_rewrites.get(map_path.as_path()) {
                    inner = inner.with_sources(sources.to_vec()).map_err(map_error)?;
                }
                let mut composed = compose(edit_map, &inner).map_err(map_error)?;
                composed.file = inner.file.clone().or_else(|| edit_map.file.clone());

                debug!(from = %map_path.display(), to = %to.display(), "compose");
                self.fs.write(to, &composed.to_json().map_err(map_error)?)?;
                Ok(map_path.clone())
            })
            .collect()
    }

    /// Phase 5: verbatim copies, plus maps that only need new sources
    fn copy_remaining(
        &self,
        changes: &ChangeSet,
        done: &HashSet<&Path>,
        by_path: &HashMap<&Path, &Artifact>,
    ) -> SplitResult<usize> {
        let source_rewrites = changes.source_rewrites();
        let moves: Vec<(&Path, &Path)> = changes
            .moves()
            .filter(|(from, _)| !done.contains(from))
            .collect();
        info!(count = moves.len(), "copying artifacts");

        moves.par_iter().try_for_each(|(from, to)| -> SplitResult<()> {
            let content = match by_path.get(from) {
                Some(artifact) => artifact.content().to_string(),
                None => self.fs.read(from)?,
            };

            let content = match source_rewrites.get(from) {
                Some(sources) => {
                    let map_error = |source| SplitError::PositionMap {
                        path: from.to_path_buf(),
                        source,
                    };
                    SourceMap::parse(&content)
                        .and_then(|m| m.with_sources(sources.to_vec()))
                        .and_then(|m| m.to_json())
                        .map_err(map_error)?
                }
                None => content,
            };

            debug!(from = %from.display(), to = %to.display(), "copy");
            self.fs.write(to, &content).map_err(SplitError::from)
        })?;
        Ok(moves.len())
    }
}
