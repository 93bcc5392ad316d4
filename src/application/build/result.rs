//! Build Result
//!
//! Result types for build operations.

use std::path::PathBuf;

use serde::Serialize;

use crate::application::apply::ApplySummary;
use crate::domain::entities::{ChangeSet, OutputModule};

/// One generated package
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageSummary {
    pub name: String,
    pub directory: PathBuf,
    pub artifacts: usize,
    /// Whether the manifest names a main entry point
    pub entry_point: bool,
}

impl PackageSummary {
    pub(crate) fn of(module: &OutputModule<'_>, directory: PathBuf) -> Self {
        Self {
            name: module.name.clone(),
            directory,
            artifacts: module.artifacts.len(),
            entry_point: module.manifest.has_entry_point(),
        }
    }
}

/// Result of a build operation
#[derive(Debug, Clone, Serialize)]
pub struct BuildResult {
    /// Packages in input module order
    pub packages: Vec<PackageSummary>,
    /// Artifacts that belong to no package and were left in place
    pub unassigned: Vec<PathBuf>,
    /// The planned changes
    #[serde(skip)]
    pub changes: ChangeSet,
    /// What was written; `None` on a dry run
    pub applied: Option<ApplySummary>,
    /// Ignore list written after success
    pub ignore_file: Option<PathBuf>,
}

impl BuildResult {
    pub fn is_dry_run(&self) -> bool {
        self.applied.is_none()
    }

    pub fn package_names(&self) -> Vec<&str> {
        self.packages.iter().map(|p| p.name.as_str()).collect()
    }
}
