//! Domain Entities
//!
//! - `Artifact` - A file produced by the emitter, with its references
//! - `InputModule` / `OutputModule` - Publishable units and the packages they become
//! - `RequiredChange` - One planned filesystem or content change

mod artifact;
mod change;
mod module;

pub use artifact::{source_map_path, Artifact, ArtifactKind, ByteRange, Reference};
pub use change::{ChangePhase, ChangeSet, PathMap, PathMapConflict, RequiredChange, TextEdit};
pub use module::{
    ExportTable, ExportTarget, ExportsManifest, InputModule, MainManifest, Manifest,
    OutputModule, CANONICAL_ENTRY,
};
