//! Configuration module for pkgsplit
//!
//! Configuration hierarchy:
//! 1. CLI flags (highest priority)
//! 2. Environment variables (PKGSPLIT_*)
//! 3. Project config (pkgsplit.toml)
//! 4. Built-in defaults (lowest priority)

mod loader;
mod types;

pub use loader::ConfigWarning;
pub use types::{
    ApplyConfig, Config, EmitConfig, IgnoreConfig, PackagesConfig, ResolveConfig,
    CONFIG_FILE_NAME,
};
