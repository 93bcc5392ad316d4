//! Emitter port - the compiler step that produces artifacts
//!
//! The emitter either returns every generated artifact, or fails with
//! [`SplitError::Emission`](crate::error::SplitError::Emission) when it
//! reported diagnostics. Partial output is never handed on.

use crate::domain::entities::Artifact;
use crate::error::SplitResult;

/// Abstract source of emitted artifacts
pub trait Emitter {
    /// Produce all artifacts with their references populated
    fn emit(&self) -> SplitResult<Vec<Artifact>>;
}
