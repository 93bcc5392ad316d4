//! Infrastructure Layer
//!
//! Concrete implementations of domain ports.
//! This layer handles all I/O operations.
//!
//! ## Structure
//!
//! - `fs/` - Local file system with atomic writes
//! - `emit_report` - Emitter backed by the compiler's JSON report
//! - `discovery` - Input module discovery over the emission root
//! - `resolver` - Relative, `node_modules` and chained path resolution

pub mod discovery;
pub mod emit_report;
pub mod fs;
pub mod resolver;

// Re-export for convenience
pub use discovery::FsDiscovery;
pub use emit_report::{ReportEmitter, ReportOptions};
pub use fs::LocalFs;
pub use resolver::{ChainResolver, NodeModulesResolver, RelativeResolver};
