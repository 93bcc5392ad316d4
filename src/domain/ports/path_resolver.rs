//! PathResolver port - turns a module specifier into a file
//!
//! Resolution strategies are pluggable; callers chain them so that
//! project-local rules are tried before environment-wide ones.

use std::path::{Path, PathBuf};

/// One resolution request, issued per reference
#[derive(Debug, Clone, Copy)]
pub struct ResolveRequest<'a> {
    /// Directory of the referencing artifact
    pub directory: &'a Path,
    /// Specifier as written
    pub specifier: &'a str,
    /// Extensions tried when the specifier omits one
    pub extensions: &'a [String],
    /// Manifest fields consulted for a package entry, in order
    pub main_fields: &'a [String],
}

/// Outcome of resolving one specifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A file of the project being split
    Project(PathBuf),
    /// A runtime builtin, URL, or installed dependency
    External,
    /// Nothing matched; the reference is left as written
    Unresolved,
}

impl Resolution {
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Resolution::Unresolved)
    }
}

/// Abstract module resolution strategy
pub trait PathResolver: Send + Sync {
    fn resolve(&self, request: &ResolveRequest<'_>) -> Resolution;
}
