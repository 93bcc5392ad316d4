//! Path resolver strategies
//!
//! - [`RelativeResolver`]: `./x`, `../x` and absolute specifiers, against the project
//! - [`NodeModulesResolver`]: bare specifiers, against `node_modules` directories
//! - [`ChainResolver`]: tries strategies in order, first resolution wins

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::domain::ports::{FileSystem, PathResolver, Resolution, ResolveRequest};
use crate::domain::value_objects::{is_external_url, normalize};

const MODULE_DIRECTORY: &str = "node_modules";
const PACKAGE_MANIFEST: &str = "package.json";

fn is_relative_specifier(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
        || specifier.starts_with('/')
}

fn is_file<F: FileSystem>(fs: &F, path: &Path) -> bool {
    fs.exists(path) && !fs.is_dir(path)
}

/// Try `base`, `base<ext>` and `base/index<ext>` in that order
fn resolve_file<F: FileSystem>(fs: &F, base: &Path, extensions: &[String]) -> Option<PathBuf> {
    if is_file(fs, base) {
        return Some(base.to_path_buf());
    }

    for ext in extensions {
        let mut with_ext = base.as_os_str().to_os_string();
        with_ext.push(ext);
        let candidate = PathBuf::from(&with_ext);
        if is_file(fs, &candidate) {
            return Some(candidate);
        }
    }

    extensions
        .iter()
        .map(|ext| base.join(format!("index{ext}")))
        .find(|candidate| is_file(fs, candidate))
}

/// Resolves relative and absolute specifiers to project files
#[derive(Debug, Clone)]
pub struct RelativeResolver<F> {
    fs: F,
}

impl<F: FileSystem> RelativeResolver<F> {
    pub fn new(fs: F) -> Self {
        Self { fs }
    }
}

impl<F: FileSystem + Send> PathResolver for RelativeResolver<F> {
    fn resolve(&self, request: &ResolveRequest<'_>) -> Resolution {
        if !is_relative_specifier(request.specifier) {
            return Resolution::Unresolved;
        }

        let base = normalize(&request.directory.join(request.specifier));
        match resolve_file(&self.fs, &base, request.extensions) {
            Some(path) => Resolution::Project(path),
            None => Resolution::Unresolved,
        }
    }
}

/// Resolves bare specifiers against `node_modules` in every ancestor directory
///
/// A match is an installed dependency and therefore [`Resolution::External`].
#[derive(Debug, Clone)]
pub struct NodeModulesResolver<F> {
    fs: F,
}

impl<F: FileSystem> NodeModulesResolver<F> {
    pub fn new(fs: F) -> Self {
        Self { fs }
    }

    /// Entry file of an installed package, honouring `main_fields` in order
    fn package_entry(&self, package_dir: &Path, request: &ResolveRequest<'_>) -> Option<PathBuf> {
        let manifest = self.fs.read(&package_dir.join(PACKAGE_MANIFEST)).ok();
        let manifest: Option<Value> = manifest.and_then(|m| serde_json::from_str(&m).ok());

        if let Some(manifest) = manifest {
            for field in request.main_fields {
                let Some(entry) = manifest.get(field.as_str()).and_then(Value::as_str) else {
                    continue;
                };
                let base = normalize(&package_dir.join(entry));
                if let Some(path) = resolve_file(&self.fs, &base, request.extensions) {
                    return Some(path);
                }
            }
        }

        resolve_file(&self.fs, &package_dir.join("index"), request.extensions)
    }
}

/// Split `@scope/name/sub/path` into `(@scope/name, sub/path)`
fn split_package(specifier: &str) -> (&str, Option<&str>) {
    let name_segments = if specifier.starts_with('@') { 2 } else { 1 };
    match specifier.match_indices('/').nth(name_segments - 1).map(|(idx, _)| idx) {
        Some(idx) => (&specifier[..idx], Some(&specifier[idx + 1..])),
        None => (specifier, None),
    }
}

impl<F: FileSystem + Send> PathResolver for NodeModulesResolver<F> {
    fn resolve(&self, request: &ResolveRequest<'_>) -> Resolution {
        if is_relative_specifier(request.specifier) || is_external_url(request.specifier) {
            return Resolution::Unresolved;
        }

        let (package, subpath) = split_package(request.specifier);
        for ancestor in request.directory.ancestors() {
            let package_dir = ancestor.join(MODULE_DIRECTORY).join(package);
            if !self.fs.is_dir(&package_dir) {
                continue;
            }
            let found = match subpath {
                Some(sub) => resolve_file(&self.fs, &package_dir.join(sub), request.extensions),
                None => self.package_entry(&package_dir, request),
            };
            if let Some(path) = found {
                debug!(specifier = request.specifier, path = %path.display(), "resolved dependency");
                return Resolution::External;
            }
        }

        Resolution::Unresolved
    }
}

/// Ordered resolution strategies
///
/// URLs are external without consulting any strategy.
#[derive(Default)]
pub struct ChainResolver {
    strategies: Vec<Box<dyn PathResolver>>,
}

impl ChainResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, strategy: impl PathResolver + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    /// Project-local rules first, then `node_modules`
    pub fn standard<F>(fs: F) -> Self
    where
        F: FileSystem + Clone + Send + 'static,
    {
        Self::new()
            .with(RelativeResolver::new(fs.clone()))
            .with(NodeModulesResolver::new(fs))
    }
}

impl PathResolver for ChainResolver {
    fn resolve(&self, request: &ResolveRequest<'_>) -> Resolution {
        if is_external_url(request.specifier) {
            return Resolution::External;
        }
        self.strategies
            .iter()
            .map(|s| s.resolve(request))
            .find(Resolution::is_resolved)
            .unwrap_or(Resolution::Unresolved)
    }
}
