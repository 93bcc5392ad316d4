use std::path::PathBuf;

use anyhow::{Context, Result};
use pkgsplit::application::{BuildOptions, BuildUseCase};
use pkgsplit::config::Config;
use pkgsplit::domain::value_objects::normalize;
use pkgsplit::infrastructure::{ChainResolver, FsDiscovery, LocalFs, ReportEmitter, ReportOptions};
use tracing::warn;

use crate::cli::ProjectArgs;

pub type LocalBuild = BuildUseCase<ReportEmitter<LocalFs, ChainResolver>, FsDiscovery<LocalFs>, LocalFs>;

/// A project directory with its effective configuration
pub struct Project {
    pub root: PathBuf,
    pub config: Config,
}

impl Project {
    /// Resolve the directory and merge config file, environment and flags
    pub fn load(args: &ProjectArgs) -> Result<Self> {
        let root = normalize(&std::env::current_dir()?.join(&args.directory));

        let (config, warnings) = match &args.config {
            Some(path) => {
                let path = root.join(path);
                let (config, warnings) = Config::load_with_warnings(&path)
                    .with_context(|| format!("loading {}", path.display()))?;
                (config.with_env_overrides(), warnings)
            }
            None => Config::load_or_default(&root).context("loading configuration")?,
        };

        for w in &warnings {
            match &w.suggestion {
                Some(s) => warn!(key = %w.key, file = %w.file.display(), line = ?w.line, "unknown config key, did you mean '{s}'?"),
                None => warn!(key = %w.key, file = %w.file.display(), line = ?w.line, "unknown config key"),
            }
        }

        let mut config = config;
        if let Some(out_dir) = &args.out_dir {
            config.emit.out_dir = out_dir.clone();
        }
        if let Some(report) = &args.report {
            config.emit.report = report.clone();
        }
        if let Some(jobs) = args.jobs {
            config.apply.jobs = jobs;
        }

        Ok(Self { root, config })
    }

    pub fn options(&self) -> BuildOptions {
        BuildOptions::from_config(&self.root, &self.config)
    }

    /// Build use case wired to the local disk
    pub fn use_case(&self) -> LocalBuild {
        let fs = LocalFs::new();
        let packages = &self.config.packages;
        let emit_root = self.config.emit_root(&self.root);

        let emitter = ReportEmitter::new(
            fs,
            ChainResolver::standard(fs),
            emit_root,
            self.config.report_path(&self.root),
            ReportOptions {
                extensions: packages.code_extensions.clone(),
                main_fields: self.config.resolve.main_fields.clone(),
                builtin_prefix: packages.builtin_prefix.clone(),
            },
        );
        let discovery = FsDiscovery::new(
            fs,
            packages.code_extensions.clone(),
            packages.entry_candidates.clone(),
        );

        BuildUseCase::new(emitter, discovery, fs)
    }
}
