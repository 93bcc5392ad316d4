//! Emit report adapter for the Emitter port
//!
//! The compiler step writes a JSON report next to its output:
//!
//! ```json
//! {
//!   "diagnostics": [],
//!   "artifacts": [
//!     { "path": "util.js",
//!       "references": [{ "specifier": "./helpers", "start": 19, "end": 28 }] }
//!   ]
//! }
//! ```
//!
//! Artifact paths are absolute or relative to the emission root. Reference
//! ranges cover the specifier text inside its quotes. `target` and `builtin`
//! are optional; missing targets go through the path resolver, missing
//! builtin flags are derived from the builtin module list.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

use crate::domain::entities::{source_map_path, Artifact, ByteRange, Reference};
use crate::domain::ports::{Emitter, FileSystem, PathResolver, Resolution, ResolveRequest};
use crate::domain::value_objects::{is_builtin, normalize};
use crate::error::{SplitError, SplitResult};

#[derive(Debug, Deserialize)]
struct EmitReport {
    #[serde(default)]
    diagnostics: Vec<String>,
    #[serde(default)]
    artifacts: Vec<ReportArtifact>,
}

#[derive(Debug, Deserialize)]
struct ReportArtifact {
    path: PathBuf,
    #[serde(default)]
    references: Vec<ReportReference>,
}

#[derive(Debug, Deserialize)]
struct ReportReference {
    specifier: String,
    start: usize,
    end: usize,
    #[serde(default)]
    target: Option<PathBuf>,
    #[serde(default)]
    builtin: Option<bool>,
}

/// Resolution settings shared by every reference of a report
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub extensions: Vec<String>,
    pub main_fields: Vec<String>,
    pub builtin_prefix: String,
}

/// Emitter backed by an emit report and the files it lists
pub struct ReportEmitter<F, R> {
    fs: F,
    resolver: R,
    emit_root: PathBuf,
    report: PathBuf,
    options: ReportOptions,
}

impl<F: FileSystem, R: PathResolver> ReportEmitter<F, R> {
    pub fn new(
        fs: F,
        resolver: R,
        emit_root: impl Into<PathBuf>,
        report: impl Into<PathBuf>,
        options: ReportOptions,
    ) -> Self {
        Self {
            fs,
            resolver,
            emit_root: emit_root.into(),
            report: report.into(),
            options,
        }
    }

    fn read_report(&self) -> SplitResult<EmitReport> {
        let content = self.fs.read(&self.report)?;
        let invalid = |message: String| SplitError::InvalidReport {
            file: self.report.clone(),
            message,
        };

        // Struct deserialization also accepts sequences; a report is an object.
        let value: serde_json::Value =
            serde_json::from_str(&content).map_err(|e| invalid(e.to_string()))?;
        if !value.is_object() {
            return Err(invalid("expected a JSON object".to_string()));
        }
        serde_json::from_value(value).map_err(|e| invalid(e.to_string()))
    }

    fn absolute(&self, path: &Path) -> PathBuf {
        normalize(&self.emit_root.join(path))
    }

    fn reference(&self, artifact: &Path, raw: ReportReference) -> Reference {
        let builtin = raw
            .builtin
            .unwrap_or_else(|| is_builtin(&raw.specifier, &self.options.builtin_prefix));

        let target = match raw.target {
            Some(target) => Some(self.absolute(&target)),
            None if builtin => None,
            None => {
                let directory = artifact.parent().unwrap_or(&self.emit_root);
                let request = ResolveRequest {
                    directory,
                    specifier: &raw.specifier,
                    extensions: &self.options.extensions,
                    main_fields: &self.options.main_fields,
                };
                match self.resolver.resolve(&request) {
                    Resolution::Project(path) => Some(path),
                    Resolution::External => None,
                    Resolution::Unresolved => {
                        debug!(
                            artifact = %artifact.display(),
                            specifier = %raw.specifier,
                            "reference left unresolved"
                        );
                        None
                    }
                }
            }
        };

        let mut reference = Reference::new(raw.specifier, ByteRange::new(raw.start, raw.end))
            .with_builtin(builtin);
        reference.target = target;
        reference
    }
}

impl<F: FileSystem, R: PathResolver> Emitter for ReportEmitter<F, R> {
    fn emit(&self) -> SplitResult<Vec<Artifact>> {
        let report = self.read_report()?;
        if !report.diagnostics.is_empty() {
            return Err(SplitError::Emission {
                diagnostics: report.diagnostics,
            });
        }

        let listed: HashSet<PathBuf> = report
            .artifacts
            .iter()
            .map(|a| self.absolute(&a.path))
            .collect();

        let mut artifacts = Vec::with_capacity(report.artifacts.len());
        for raw in report.artifacts {
            let path = self.absolute(&raw.path);
            let content = self.fs.read(&path)?;
            let references = raw
                .references
                .into_iter()
                .map(|r| self.reference(&path, r))
                .collect();

            let mut artifact = Artifact::new(&path, content).with_references(references);
            if listed.contains(&source_map_path(&path)) {
                artifact = artifact.with_source_map();
            }
            artifacts.push(artifact);
        }

        info!(count = artifacts.len(), "read emitted artifacts");
        Ok(artifacts)
    }
}
