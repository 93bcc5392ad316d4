//! Configuration loading

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{SplitError, SplitResult};

use super::types::{Config, CONFIG_FILE_NAME};

/// Non-fatal configuration warning surfaced to CLI users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub key: String,
    pub file: PathBuf,
    pub line: Option<usize>,
    pub suggestion: Option<String>,
}

/// Load configuration and collect non-fatal warnings (e.g. unknown keys).
pub fn load_with_warnings(path: &Path) -> SplitResult<(Config, Vec<ConfigWarning>)> {
    let content = fs::read_to_string(path)?;

    let mut unknown_paths: Vec<String> = Vec::new();
    let deserializer = toml::de::Deserializer::new(&content);

    let config: Config = serde_ignored::deserialize(deserializer, |p| {
        unknown_paths.push(p.to_string());
    })
    .map_err(|e| SplitError::InvalidConfig {
        file: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let warnings = unknown_paths
        .into_iter()
        .map(|path_str| {
            let key = path_str
                .split('.')
                .next_back()
                .unwrap_or(path_str.as_str())
                .to_string();
            ConfigWarning {
                key: key.clone(),
                file: path.to_path_buf(),
                line: find_line_number(&content, &key),
                suggestion: suggest_key(&key),
            }
        })
        .collect();

    Ok((config, warnings))
}

/// Load from the project config file or defaults, then apply env overrides
pub fn load_or_default(project_root: &Path) -> SplitResult<(Config, Vec<ConfigWarning>)> {
    let path = project_root.join(CONFIG_FILE_NAME);
    let (config, warnings) = if path.is_file() {
        load_with_warnings(&path)?
    } else {
        (Config::default(), Vec::new())
    };
    Ok((with_env_overrides(config), warnings))
}

/// Apply environment variable overrides (PKGSPLIT_* prefix)
pub fn with_env_overrides(config: Config) -> Config {
    apply_overrides(config, |key| std::env::var(key).ok())
}

/// Apply overrides from an arbitrary variable source
pub(crate) fn apply_overrides<F>(mut config: Config, var: F) -> Config
where
    F: Fn(&str) -> Option<String>,
{
    // PKGSPLIT_OUT_DIR
    if let Some(dir) = var("PKGSPLIT_OUT_DIR") {
        config.emit.out_dir = PathBuf::from(dir);
    }

    // PKGSPLIT_REPORT
    if let Some(report) = var("PKGSPLIT_REPORT") {
        config.emit.report = PathBuf::from(report);
    }

    // PKGSPLIT_JOBS (ignored unless a number)
    if let Some(jobs) = var("PKGSPLIT_JOBS").and_then(|v| v.trim().parse().ok()) {
        config.apply.jobs = jobs;
    }

    // PKGSPLIT_EXPORT_EXTENSION
    if let Some(ext) = var("PKGSPLIT_EXPORT_EXTENSION") {
        config.packages.export_extension = ext;
    }

    // PKGSPLIT_MAIN_FIELDS (comma-separated)
    if let Some(fields) = var("PKGSPLIT_MAIN_FIELDS") {
        let parsed: Vec<String> = fields
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        if !parsed.is_empty() {
            config.resolve.main_fields = parsed;
        }
    }

    // PKGSPLIT_IGNORE_LIST
    if let Some(val) = var("PKGSPLIT_IGNORE_LIST") {
        config.ignore.enabled = val.to_lowercase() != "false" && val != "0";
    }

    config
}

fn find_line_number(content: &str, needle: &str) -> Option<usize> {
    for (i, line) in content.lines().enumerate() {
        if line.contains(needle) {
            return Some(i + 1);
        }
    }
    None
}

fn suggest_key(unknown: &str) -> Option<String> {
    const CANDIDATES: &[&str] = &[
        "emit",
        "out_dir",
        "report",
        "packages",
        "manifest_name",
        "export_extension",
        "builtin_prefix",
        "code_extensions",
        "entry_candidates",
        "resolve",
        "main_fields",
        "apply",
        "jobs",
        "ignore",
        "enabled",
        "template",
        "file",
    ];

    let mut best: Option<(&str, usize)> = None;
    for candidate in CANDIDATES {
        let dist = levenshtein(unknown, candidate);
        best = match best {
            None => Some((candidate, dist)),
            Some((_, best_dist)) if dist < best_dist => Some((candidate, dist)),
            Some(current) => Some(current),
        };
    }

    match best {
        Some((candidate, dist)) if dist <= 2 => Some(candidate.to_string()),
        _ => None,
    }
}

fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }

    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    let mut prev: Vec<usize> = (0..=b_bytes.len()).collect();
    let mut curr = vec![0usize; b_bytes.len() + 1];

    for (i, &ac) in a_bytes.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &bc) in b_bytes.iter().enumerate() {
            let cost = if ac == bc { 0 } else { 1 };
            curr[j + 1] =
                std::cmp::min(std::cmp::min(prev[j + 1] + 1, curr[j] + 1), prev[j] + cost);
        }
        prev.clone_from_slice(&curr);
    }

    prev[b_bytes.len()]
}
