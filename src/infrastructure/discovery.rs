//! Filesystem input module discovery
//!
//! Every code file directly under the emission root is a file module; every
//! directory is a directory module whose entry point, if any, is the first
//! existing `<candidate><ext>` in candidate order.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::domain::entities::InputModule;
use crate::domain::ports::{FileSystem, ModuleDiscovery};
use crate::domain::value_objects::file_extension;
use crate::error::{SplitError, SplitResult};

/// Discovers input modules by listing the emission root
#[derive(Debug, Clone)]
pub struct FsDiscovery<F> {
    fs: F,
    code_extensions: Vec<String>,
    entry_candidates: Vec<String>,
}

impl<F: FileSystem> FsDiscovery<F> {
    pub fn new(fs: F, code_extensions: Vec<String>, entry_candidates: Vec<String>) -> Self {
        Self {
            fs,
            code_extensions,
            entry_candidates,
        }
    }

    fn is_code(&self, path: &Path) -> bool {
        let ext = file_extension(path);
        self.code_extensions.iter().any(|e| e == ext)
    }

    /// First existing entry point of `directory`, relative to `root`
    fn find_entry(&self, root: &Path, directory: &Path) -> Option<PathBuf> {
        let own_name = directory.file_name()?.to_string_lossy().into_owned();
        let bases = self
            .entry_candidates
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(own_name.as_str()));

        for base in bases {
            for ext in &self.code_extensions {
                let candidate = directory.join(format!("{base}{ext}"));
                if self.fs.exists(&candidate) && !self.fs.is_dir(&candidate) {
                    return candidate.strip_prefix(root).ok().map(Path::to_path_buf);
                }
            }
        }
        None
    }
}

impl<F: FileSystem> ModuleDiscovery for FsDiscovery<F> {
    fn discover(&self, root: &Path) -> SplitResult<Vec<InputModule>> {
        if !self.fs.is_dir(root) {
            return Err(SplitError::DirectoryNotFound {
                path: root.to_path_buf(),
            });
        }

        let entries = self.fs.read_dir(root)?;
        let mut files = Vec::new();
        let mut directories = Vec::new();

        for path in entries {
            let Ok(relative) = path.strip_prefix(root).map(Path::to_path_buf) else {
                continue;
            };
            if self.fs.is_dir(&path) {
                let entry = self.find_entry(root, &path);
                debug!(directory = %relative.display(), entry = ?entry, "directory module");
                directories.push(InputModule::directory(relative, entry));
            } else if self.is_code(&path) {
                debug!(file = %relative.display(), "file module");
                files.push(InputModule::file(relative));
            }
        }

        files.extend(directories);
        Ok(files)
    }
}
