//! Partitioning service
//!
//! Groups emitted artifacts into one output package per input module and
//! builds each package's manifest. Pure: no I/O.

use std::path::{Path, PathBuf};

use crate::domain::entities::{
    Artifact, ExportTable, ExportTarget, ExportsManifest, InputModule, MainManifest, Manifest,
    OutputModule, CANONICAL_ENTRY,
};
use crate::domain::value_objects::{file_extension, file_stem, to_specifier, with_extension};

/// Declaration extension paired with a code entry point
const DECLARATION_EXT: &str = ".d.ts";

/// Pure partitioning service
#[derive(Debug, Clone)]
pub struct Partitioner {
    /// Absolute emission root the input module paths are relative to
    emit_root: PathBuf,
    /// Extension export targets are rewritten to
    export_extension: String,
}

impl Partitioner {
    pub fn new(emit_root: impl Into<PathBuf>, export_extension: impl Into<String>) -> Self {
        Self {
            emit_root: emit_root.into(),
            export_extension: export_extension.into(),
        }
    }

    pub fn emit_root(&self) -> &Path {
        &self.emit_root
    }

    /// One output module per input module, in input order
    pub fn partition<'a>(
        &self,
        inputs: &[InputModule],
        artifacts: &'a [Artifact],
    ) -> Vec<OutputModule<'a>> {
        inputs
            .iter()
            .map(|input| match input {
                InputModule::File { path } => self.file_module(input, path, artifacts),
                InputModule::Directory { directory, entry } => {
                    self.directory_module(input, directory, entry.as_deref(), artifacts)
                }
            })
            .collect()
    }

    fn file_module<'a>(
        &self,
        input: &InputModule,
        path: &Path,
        artifacts: &'a [Artifact],
    ) -> OutputModule<'a> {
        let absolute = self.emit_root.join(path);
        let code_ext = file_extension(path);
        let related: Vec<PathBuf> = [
            code_ext.to_string(),
            format!("{code_ext}.map"),
            DECLARATION_EXT.to_string(),
            format!("{DECLARATION_EXT}.map"),
        ]
        .iter()
        .map(|ext| with_extension(&absolute, ext))
        .collect();

        let members: Vec<&Artifact> = artifacts
            .iter()
            .filter(|a| related.iter().any(|r| r == a.path()))
            .collect();

        let main = PathBuf::from(path.file_name().unwrap_or_default());
        let exports = self.export_table(
            members
                .iter()
                .map(|a| (PathBuf::from(a.path().file_name().unwrap_or_default()), *a)),
            Some(&main),
        );

        OutputModule {
            name: file_stem(path).to_string(),
            artifacts: members,
            manifest: main_manifest(&main, exports),
            input: input.clone(),
        }
    }

    fn directory_module<'a>(
        &self,
        input: &InputModule,
        directory: &Path,
        entry: Option<&Path>,
        artifacts: &'a [Artifact],
    ) -> OutputModule<'a> {
        let boundary = self.emit_root.join(directory);
        let members: Vec<&Artifact> = artifacts
            .iter()
            .filter(|a| a.path().starts_with(&boundary))
            .collect();

        let entry = entry.map(|e| e.strip_prefix(directory).unwrap_or(e).to_path_buf());
        let exports = self.export_table(
            members.iter().filter_map(|a| {
                a.path()
                    .strip_prefix(&boundary)
                    .ok()
                    .map(|rel| (rel.to_path_buf(), *a))
            }),
            entry.as_deref(),
        );

        let manifest = match entry {
            Some(entry) => main_manifest(&entry, exports),
            None => Manifest::Exports(ExportsManifest {
                side_effects: false,
                exports,
            }),
        };

        OutputModule {
            name: directory
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            artifacts: members,
            manifest,
            input: input.clone(),
        }
    }

    /// Export entries for the code artifacts among `members`
    ///
    /// `members` yields each artifact with its package-relative path. The
    /// artifact at `canonical` takes the reserved entry key.
    fn export_table<'a, I>(&self, members: I, canonical: Option<&Path>) -> ExportTable
    where
        I: IntoIterator<Item = (PathBuf, &'a Artifact)>,
    {
        members
            .into_iter()
            .filter(|(_, artifact)| artifact.is_code())
            .map(|(rel, _)| {
                let key = if Some(rel.as_path()) == canonical {
                    CANONICAL_ENTRY.to_string()
                } else {
                    to_specifier(&rel)
                };
                let import = to_specifier(&with_extension(&rel, &self.export_extension));
                (key, ExportTarget { import })
            })
            .collect()
    }
}

fn main_manifest(main: &Path, exports: ExportTable) -> Manifest {
    let types = to_specifier(&with_extension(main, DECLARATION_EXT));
    Manifest::Main(MainManifest {
        module_type: "module".to_string(),
        main: to_specifier(main),
        typings: types.clone(),
        types,
        side_effects: false,
        exports,
    })
}
