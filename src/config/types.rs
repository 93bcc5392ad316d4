//! Configuration type definitions

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::normalize;
use crate::error::SplitResult;

use super::loader::{self, ConfigWarning};

/// Config file name looked up in the project directory
pub const CONFIG_FILE_NAME: &str = "pkgsplit.toml";

/// Where the compiler step leaves its output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmitConfig {
    /// Emission root, relative to the project directory
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,

    /// Emit report written by the compiler step
    #[serde(default = "default_report")]
    pub report: PathBuf,
}

impl Default for EmitConfig {
    fn default() -> Self {
        Self {
            out_dir: default_out_dir(),
            report: default_report(),
        }
    }
}

fn default_out_dir() -> PathBuf {
    PathBuf::from("build/esm")
}

fn default_report() -> PathBuf {
    PathBuf::from("build/emit-report.json")
}

/// Shape of the generated packages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackagesConfig {
    #[serde(default = "default_manifest_name")]
    pub manifest_name: String,

    /// Extension export targets point at
    #[serde(default = "default_export_extension")]
    pub export_extension: String,

    /// Prefix marking runtime builtin specifiers
    #[serde(default = "default_builtin_prefix")]
    pub builtin_prefix: String,

    /// Extensions of emitted code files
    #[serde(default = "default_code_extensions")]
    pub code_extensions: Vec<String>,

    /// Base names searched for a directory entry point, before the directory's own name
    #[serde(default = "default_entry_candidates")]
    pub entry_candidates: Vec<String>,
}

impl Default for PackagesConfig {
    fn default() -> Self {
        Self {
            manifest_name: default_manifest_name(),
            export_extension: default_export_extension(),
            builtin_prefix: default_builtin_prefix(),
            code_extensions: default_code_extensions(),
            entry_candidates: default_entry_candidates(),
        }
    }
}

fn default_manifest_name() -> String {
    "package.json".to_string()
}

fn default_export_extension() -> String {
    ".js".to_string()
}

fn default_builtin_prefix() -> String {
    "node:".to_string()
}

fn default_code_extensions() -> Vec<String> {
    [".js", ".mjs", ".cjs"].map(String::from).to_vec()
}

fn default_entry_candidates() -> Vec<String> {
    ["index", "exports"].map(String::from).to_vec()
}

/// Module resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveConfig {
    /// Manifest fields consulted for a dependency's entry, in order
    #[serde(default = "default_main_fields")]
    pub main_fields: Vec<String>,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            main_fields: default_main_fields(),
        }
    }
}

fn default_main_fields() -> Vec<String> {
    ["module", "jsnext:main", "main"].map(String::from).to_vec()
}

/// Change application
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyConfig {
    /// Worker threads; 0 uses the available parallelism
    #[serde(default)]
    pub jobs: usize,
}

/// Ignore list written after a successful build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgnoreConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// File whose content precedes the generated block
    #[serde(default = "default_ignore_file")]
    pub template: PathBuf,

    /// File the list is written to
    #[serde(default = "default_ignore_file")]
    pub file: PathBuf,
}

impl Default for IgnoreConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            template: default_ignore_file(),
            file: default_ignore_file(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_ignore_file() -> PathBuf {
    PathBuf::from(".gitignore")
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub emit: EmitConfig,

    #[serde(default)]
    pub packages: PackagesConfig,

    #[serde(default)]
    pub resolve: ResolveConfig,

    #[serde(default)]
    pub apply: ApplyConfig,

    #[serde(default)]
    pub ignore: IgnoreConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> SplitResult<Self> {
        let (config, _warnings) = loader::load_with_warnings(path)?;
        Ok(config)
    }

    /// Load configuration and collect non-fatal warnings (e.g. unknown keys).
    pub fn load_with_warnings(path: &Path) -> SplitResult<(Self, Vec<ConfigWarning>)> {
        loader::load_with_warnings(path)
    }

    /// Load `pkgsplit.toml` from the project directory, or defaults when absent
    ///
    /// Environment overrides are applied either way.
    pub fn load_or_default(project_root: &Path) -> SplitResult<(Self, Vec<ConfigWarning>)> {
        loader::load_or_default(project_root)
    }

    /// Apply environment variable overrides (PKGSPLIT_* prefix)
    pub fn with_env_overrides(self) -> Self {
        loader::with_env_overrides(self)
    }

    /// Emission root for a project directory
    pub fn emit_root(&self, project_root: &Path) -> PathBuf {
        normalize(&project_root.join(&self.emit.out_dir))
    }

    /// Emit report location for a project directory
    pub fn report_path(&self, project_root: &Path) -> PathBuf {
        normalize(&project_root.join(&self.emit.report))
    }
}
