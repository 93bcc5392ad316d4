//! Domain Layer
//!
//! Partitioning and change planning without I/O dependencies.
//!
//! ## Structure
//!
//! - `entities/` - Artifacts, input/output modules, required changes
//! - `value_objects/` - Lexical path arithmetic
//! - `services/` - Partitioner, ChangePlanner, EditBuffer, source maps
//! - `ports/` - Interface definitions for infrastructure
//!
//! ## Design Principles
//!
//! 1. **No I/O** - This layer never touches the file system directly
//! 2. **Pure Functions** - Services are stateless and testable
//! 3. **Ports & Adapters** - All I/O goes through trait-defined ports

pub mod entities;
pub mod ports;
pub mod services;
pub mod value_objects;
