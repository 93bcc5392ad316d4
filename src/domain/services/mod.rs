//! Domain Services
//!
//! Pure business logic services that operate on domain entities.
//! These services have no I/O dependencies and are easily testable.

pub mod change_planner;
pub mod edit_buffer;
pub mod partitioner;
pub mod source_map;

pub use change_planner::{ChangePlanner, PlanError};
pub use edit_buffer::{EditBuffer, EditError};
pub use partitioner::Partitioner;
pub use source_map::{compose, compose_chain, MapError, SourceMap};
