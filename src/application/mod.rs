//! Application Layer
//!
//! Use cases that orchestrate the business flow.
//! This layer:
//! - Depends on Domain layer (entities, services, ports)
//! - Does NOT contain business rules (those are in Domain)
//! - Coordinates between Infrastructure and Domain
//!
//! ## Use Cases
//!
//! - `BuildUseCase` - emit, discover, partition, plan, apply, write the ignore list
//!
//! ## Services
//!
//! - `ChangeApplier` - Transactional, phased application of a change set
//! - `ignore_list` - Managed ignore-file block for generated packages

pub mod apply;
pub mod build;
pub mod ignore_list;

pub use apply::{ApplySummary, ChangeApplier};
pub use build::{BuildOptions, BuildResult, BuildUseCase, PackageSummary};
pub use ignore_list::write_ignore_list;
