//! ModuleDiscovery port - finds the publishable units of an emitted tree

use std::path::Path;

use crate::domain::entities::InputModule;
use crate::error::SplitResult;

/// Abstract discovery of input modules
pub trait ModuleDiscovery {
    /// List the input modules directly under `root`, with paths relative to it
    fn discover(&self, root: &Path) -> SplitResult<Vec<InputModule>>;
}
