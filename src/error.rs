//! Error types for pkgsplit
//!
//! Each layer owns a `thiserror` enum; they all fold into [`SplitError`].

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::ports::FsError;
use crate::domain::services::change_planner::PlanError;
use crate::domain::services::edit_buffer::EditError;
use crate::domain::services::source_map::MapError;

/// Result type alias for pkgsplit operations
pub type SplitResult<T> = Result<T, SplitError>;

/// Main error type for pkgsplit operations
#[derive(Error, Debug)]
pub enum SplitError {
    /// The compiler reported diagnostics; nothing downstream runs
    #[error("emission failed with {} diagnostic(s):\n{}", diagnostics.len(), diagnostics.join("\n"))]
    Emission { diagnostics: Vec<String> },

    /// Emit report could not be parsed
    #[error("invalid emit report {file}: {message}")]
    InvalidReport { file: PathBuf, message: String },

    /// Configuration file could not be parsed
    #[error("invalid configuration in {file}: {message}")]
    InvalidConfig { file: PathBuf, message: String },

    /// Directory not found
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// A move has no destination while applying
    #[error("no destination planned for {path}")]
    MissingDestination { path: PathBuf },

    /// Planner invariant violation
    #[error(transparent)]
    Plan(#[from] PlanError),

    /// Text rewrite failure
    #[error("rewriting {path}: {source}")]
    Edit {
        path: PathBuf,
        #[source]
        source: EditError,
    },

    /// Position-map parse or composition failure
    #[error("position map {path}: {source}")]
    PositionMap {
        path: PathBuf,
        #[source]
        source: MapError,
    },

    /// File system failure
    #[error(transparent)]
    Fs(#[from] FsError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Worker pool could not be started
    #[error("worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}
