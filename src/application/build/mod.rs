//! Build Module
//!
//! Orchestrates one split of an emitted tree into packages.
//!
//! ## Structure
//!
//! - `options` - Configuration types (`BuildOptions`)
//! - `result` - Result types (`BuildResult`, `PackageSummary`)
//! - `use_case` - Core use case logic (`BuildUseCase`)
//!
//! ## Usage
//!
//! ```ignore
//! use pkgsplit::application::build::{BuildOptions, BuildUseCase};
//!
//! let use_case = BuildUseCase::new(emitter, discovery, fs);
//! let result = use_case.execute(&BuildOptions::from_config(root, &config))?;
//! ```

mod options;
mod result;
mod use_case;

pub use options::BuildOptions;
pub use result::{BuildResult, PackageSummary};
pub use use_case::BuildUseCase;
