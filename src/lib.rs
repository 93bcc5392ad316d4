//! pkgsplit - split a compiled source tree into publishable packages
//!
//! Takes the output of a compiler step (code, declaration and position-map
//! files), groups it into one package per top-level module, rewrites the
//! references between files so each package is self-contained, and writes
//! the result all or nothing.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;

// Re-exports for convenience
pub use application::{BuildOptions, BuildResult, BuildUseCase};
pub use config::Config;
pub use error::{SplitError, SplitResult};
