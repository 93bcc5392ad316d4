//! Build Options
//!
//! Configuration types for build operations.

use std::path::PathBuf;

use crate::config::{Config, IgnoreConfig};

/// Options for the build use case
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Project directory; packages are created directly under it
    pub project_root: PathBuf,
    /// Emission root the input modules are discovered in
    pub emit_root: PathBuf,
    /// Manifest file name inside each package
    pub manifest_name: String,
    /// Extension export targets point at
    pub export_extension: String,
    /// Prefix added to unmarked builtin specifiers
    pub builtin_prefix: String,
    /// Worker threads for applying changes (0 = available parallelism)
    pub jobs: usize,
    /// Ignore list to write after success, if any
    pub ignore: Option<IgnoreConfig>,
    /// Plan only; write nothing
    pub dry_run: bool,
}

impl BuildOptions {
    pub fn new(project_root: impl Into<PathBuf>, emit_root: impl Into<PathBuf>) -> Self {
        Self::from_parts(project_root.into(), emit_root.into(), &Config::default())
    }

    /// Options for `project_root` as described by `config`
    pub fn from_config(project_root: impl Into<PathBuf>, config: &Config) -> Self {
        let project_root = project_root.into();
        let emit_root = config.emit_root(&project_root);
        Self::from_parts(project_root, emit_root, config)
    }

    fn from_parts(project_root: PathBuf, emit_root: PathBuf, config: &Config) -> Self {
        Self {
            project_root,
            emit_root,
            manifest_name: config.packages.manifest_name.clone(),
            export_extension: config.packages.export_extension.clone(),
            builtin_prefix: config.packages.builtin_prefix.clone(),
            jobs: config.apply.jobs,
            ignore: config.ignore.enabled.then(|| config.ignore.clone()),
            dry_run: false,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    pub fn without_ignore_list(mut self) -> Self {
        self.ignore = None;
        self
    }
}
