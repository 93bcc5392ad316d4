//! Domain Value Objects
//!
//! Immutable value types and the lexical path arithmetic the services share.

pub mod builtin;
pub mod path;

pub use builtin::{is_builtin, NODE_BUILTINS};
pub use path::{
    ensure_relative, file_extension, file_stem, is_external_url, normalize, relative_path,
    to_slash, to_specifier, with_extension,
};
