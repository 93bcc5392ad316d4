//! Ignore list generation
//!
//! Generated package directories are listed in a managed block appended to
//! a template (usually the project's existing `.gitignore`). A previous
//! block is replaced, so rebuilding never duplicates entries.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::IgnoreConfig;
use crate::domain::ports::FileSystem;
use crate::error::SplitResult;

pub const BLOCK_START: &str = "# >>> pkgsplit generated packages >>>";
pub const BLOCK_END: &str = "# <<< pkgsplit generated packages <<<";

/// Template text with the managed block removed
fn strip_block(template: &str) -> String {
    let mut out = Vec::new();
    let mut inside = false;
    for line in template.lines() {
        match line.trim() {
            BLOCK_START => inside = true,
            BLOCK_END if inside => inside = false,
            _ if !inside => out.push(line),
            _ => {}
        }
    }
    out.join("\n").trim_end().to_string()
}

/// Render the ignore list for `packages`
pub fn render<S: AsRef<str>>(template: &str, packages: &[S]) -> String {
    let mut out = strip_block(template);
    if !out.is_empty() {
        out.push_str("\n\n");
    }
    out.push_str(BLOCK_START);
    out.push('\n');
    for name in packages {
        out.push('/');
        out.push_str(name.as_ref());
        out.push('\n');
    }
    out.push_str(BLOCK_END);
    out.push('\n');
    out
}

/// Write the ignore list into the project; returns the file written
pub fn write_ignore_list<F: FileSystem, S: AsRef<str>>(
    fs: &F,
    project_root: &Path,
    config: &IgnoreConfig,
    packages: &[S],
) -> SplitResult<PathBuf> {
    let template_path = project_root.join(&config.template);
    let template = if fs.exists(&template_path) {
        fs.read(&template_path)?
    } else {
        String::new()
    };

    let target = project_root.join(&config.file);
    fs.write(&target, &render(&template, packages))?;
    info!(path = %target.display(), packages = packages.len(), "wrote ignore list");
    Ok(target)
}
