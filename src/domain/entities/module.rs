//! Input and output modules
//!
//! An [`InputModule`] is a publishable unit found in the emitted tree; an
//! [`OutputModule`] is the package it becomes, with its generated manifest.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::artifact::Artifact;

/// Export key reserved for the canonical entry point
pub const CANONICAL_ENTRY: &str = ".";

/// A publishable unit in the emitted tree
///
/// Paths are relative to the emission root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputModule {
    /// One code file (plus declaration and map siblings)
    File { path: PathBuf },
    /// A whole subtree, optionally with an entry point
    Directory {
        directory: PathBuf,
        entry: Option<PathBuf>,
    },
}

impl InputModule {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        InputModule::File { path: path.into() }
    }

    pub fn directory(directory: impl Into<PathBuf>, entry: Option<PathBuf>) -> Self {
        InputModule::Directory {
            directory: directory.into(),
            entry,
        }
    }

    /// Path the module occupies relative to the emission root
    pub fn boundary(&self) -> &Path {
        match self {
            InputModule::File { path } => path,
            InputModule::Directory { directory, .. } => directory,
        }
    }
}

/// One export target
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportTarget {
    pub import: String,
}

/// Public sub-path → internal artifact path, code artifacts only
pub type ExportTable = BTreeMap<String, ExportTarget>;

/// Manifest for a package with a single entry point
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MainManifest {
    #[serde(rename = "type")]
    pub module_type: String,
    pub main: String,
    pub types: String,
    pub typings: String,
    #[serde(rename = "sideEffects")]
    pub side_effects: bool,
    pub exports: ExportTable,
}

/// Manifest for a package that only exposes an export map
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportsManifest {
    #[serde(rename = "sideEffects")]
    pub side_effects: bool,
    pub exports: ExportTable,
}

/// Generated per-package manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Manifest {
    /// Has an explicit entry point
    Main(MainManifest),
    /// Has no single entry point
    Exports(ExportsManifest),
}

impl Manifest {
    pub fn exports(&self) -> &ExportTable {
        match self {
            Manifest::Main(m) => &m.exports,
            Manifest::Exports(m) => &m.exports,
        }
    }

    pub fn has_entry_point(&self) -> bool {
        matches!(self, Manifest::Main(_))
    }

    /// Pretty JSON, as written to disk
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// A package materialized from an input module
#[derive(Debug, Clone)]
pub struct OutputModule<'a> {
    /// Package (and directory) name
    pub name: String,
    /// Artifacts assigned to this package
    pub artifacts: Vec<&'a Artifact>,
    pub manifest: Manifest,
    pub input: InputModule,
}

impl OutputModule<'_> {
    pub fn contains(&self, path: &Path) -> bool {
        self.artifacts.iter().any(|a| a.path() == path)
    }
}
