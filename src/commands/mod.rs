pub mod build;
pub mod plan;
mod project;
