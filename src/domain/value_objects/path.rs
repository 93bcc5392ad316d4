//! Path value helpers
//!
//! Lexical path arithmetic used by partitioning and planning:
//! - Compound extensions (`.d.ts`, `.js.map`, `.d.ts.map`)
//! - Normalization without touching the disk
//! - Relative paths between two absolute locations
//! - Module specifiers that never look like bare package names

use std::path::{Component, Path, PathBuf};

/// Compound extensions recognised before falling back to the last `.ext`
const COMPOUND_EXTENSIONS: &[&str] = &[
    ".d.ts.map",
    ".d.mts.map",
    ".d.cts.map",
    ".js.map",
    ".mjs.map",
    ".cjs.map",
    ".d.ts",
    ".d.mts",
    ".d.cts",
];

/// Get the full extension of a path, including compound forms
///
/// `util.d.ts.map` yields `.d.ts.map`, `util.js` yields `.js`, and a path
/// without an extension yields the empty string.
pub fn file_extension(path: &Path) -> &str {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return "";
    };

    for ext in COMPOUND_EXTENSIONS {
        if name.len() > ext.len() && name.ends_with(ext) {
            return &name[name.len() - ext.len()..];
        }
    }

    match name.rfind('.') {
        Some(0) | None => "",
        Some(idx) => &name[idx..],
    }
}

/// File name with its full (compound) extension removed
pub fn file_stem(path: &Path) -> &str {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = file_extension(path);
    &name[..name.len() - ext.len()]
}

/// Replace the full extension of `path` with `ext`
pub fn with_extension(path: &Path, ext: &str) -> PathBuf {
    let stem = file_stem(path);
    path.with_file_name(format!("{stem}{ext}"))
}

/// Resolve `.` and `..` components lexically
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = match out.components().next_back() {
                    Some(Component::Normal(_)) => out.pop(),
                    _ => false,
                };
                if !popped && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Path of `to` relative to the directory `from_dir`
///
/// Both paths are normalized first. The result uses `..` components to
/// climb out of `from_dir`; an identical location yields an empty path.
pub fn relative_path(from_dir: &Path, to: &Path) -> PathBuf {
    let from = normalize(from_dir);
    let to = normalize(to);
    let from: Vec<_> = from.components().collect();
    let to: Vec<_> = to.components().collect();

    let common = from
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut out = PathBuf::new();
    for _ in common..from.len() {
        out.push("..");
    }
    for component in &to[common..] {
        out.push(component.as_os_str());
    }
    out
}

/// Render a relative path as a module specifier
///
/// Separators become `/` and the result always starts with `.` so that
/// resolvers never mistake it for a bare package name.
pub fn to_specifier(path: &Path) -> String {
    ensure_relative(&to_slash(path))
}

/// Join the components of a path with `/`, whatever the platform separator
pub fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Prefix `./` unless the path already starts with `./` or `../`
pub fn ensure_relative(path: &str) -> String {
    let explicit = matches!(path, "." | "..")
        || path.starts_with("./")
        || path.starts_with("../");
    if explicit {
        path.to_string()
    } else {
        format!("./{path}")
    }
}

/// Whether a specifier is an absolute URL (`https://`, `data:`, `webpack://`)
pub fn is_external_url(specifier: &str) -> bool {
    let Some((scheme, rest)) = specifier.split_once(':') else {
        return false;
    };
    scheme.len() > 1
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        && scheme.starts_with(|c: char| c.is_ascii_alphabetic())
        && !rest.is_empty()
}
