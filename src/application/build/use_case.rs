//! Build Use Case
//!
//! Orchestrates the split:
//! 1. Emit artifacts (diagnostics stop everything)
//! 2. Discover input modules
//! 3. Partition artifacts into packages
//! 4. Plan the required changes
//! 5. Apply them transactionally
//! 6. Write the ignore list
//!
//! All business logic lives in domain services; this is orchestration only.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::application::apply::ChangeApplier;
use crate::application::ignore_list::write_ignore_list;
use crate::domain::entities::Artifact;
use crate::domain::ports::{Emitter, FileSystem, ModuleDiscovery};
use crate::domain::services::{ChangePlanner, Partitioner};
use crate::error::SplitResult;

use super::options::BuildOptions;
use super::result::{BuildResult, PackageSummary};

/// Build use case, parameterized by its ports
pub struct BuildUseCase<E, D, F>
where
    E: Emitter,
    D: ModuleDiscovery,
    F: FileSystem,
{
    emitter: E,
    discovery: D,
    file_system: F,
}

impl<E, D, F> BuildUseCase<E, D, F>
where
    E: Emitter,
    D: ModuleDiscovery,
    F: FileSystem,
{
    pub fn new(emitter: E, discovery: D, file_system: F) -> Self {
        Self {
            emitter,
            discovery,
            file_system,
        }
    }

    /// Run the whole pipeline
    pub fn execute(&self, options: &BuildOptions) -> SplitResult<BuildResult> {
        info!(root = %options.emit_root.display(), "emitting");
        let artifacts = self.emitter.emit()?;

        info!("discovering input modules");
        let inputs = self.discovery.discover(&options.emit_root)?;

        info!(modules = inputs.len(), "partitioning");
        let modules = Partitioner::new(&options.emit_root, &options.export_extension)
            .partition(&inputs, &artifacts);

        info!("planning changes");
        let planner = ChangePlanner::new(
            &options.emit_root,
            &options.project_root,
            &options.manifest_name,
        );
        let changes = planner.plan(&modules)?;
        debug!(changes = changes.len(), "plan ready");

        let packages: Vec<PackageSummary> = modules
            .iter()
            .map(|m| PackageSummary::of(m, planner.package_root(m)))
            .collect();

        let assigned: HashSet<&Path> = modules
            .iter()
            .flat_map(|m| m.artifacts.iter().map(|a| a.path()))
            .collect();
        let unassigned: Vec<PathBuf> = artifacts
            .iter()
            .map(Artifact::path)
            .filter(|p| !assigned.contains(p))
            .map(Path::to_path_buf)
            .collect();
        if !unassigned.is_empty() {
            warn!(count = unassigned.len(), "artifacts outside every module stay in place");
        }

        let mut result = BuildResult {
            packages,
            unassigned,
            changes,
            applied: None,
            ignore_file: None,
        };

        if options.dry_run {
            info!(changes = result.changes.len(), "dry run, nothing written");
            return Ok(result);
        }

        let applier = ChangeApplier::new(&self.file_system, &options.builtin_prefix, options.jobs);
        result.applied = Some(applier.apply(&artifacts, &result.changes)?);

        if let Some(ignore) = &options.ignore {
            let names = result.package_names();
            match write_ignore_list(&self.file_system, &options.project_root, ignore, &names) {
                Ok(path) => result.ignore_file = Some(path),
                Err(e) => {
                    self.remove_packages(&result);
                    return Err(e);
                }
            }
        }

        info!(packages = result.packages.len(), "complete");
        Ok(result)
    }

    /// Undo an applied build
    fn remove_packages(&self, result: &BuildResult) {
        for package in result.packages.iter().rev() {
            if !self.file_system.exists(&package.directory) {
                continue;
            }
            if let Err(e) = self.file_system.remove_dir_all(&package.directory) {
                warn!(path = %package.directory.display(), error = %e, "could not remove package");
            }
        }
    }
}
