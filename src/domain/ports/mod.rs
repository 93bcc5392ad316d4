//! Domain Ports (Interfaces)
//!
//! These traits define the boundaries of the domain layer.
//! Infrastructure layer provides concrete implementations.

pub mod emitter;
pub mod file_system;
pub mod module_discovery;
pub mod path_resolver;

pub use emitter::Emitter;
pub use file_system::{FileSystem, FsError, FsResult};
pub use module_discovery::ModuleDiscovery;
pub use path_resolver::{PathResolver, Resolution, ResolveRequest};
