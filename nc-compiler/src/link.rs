//! Linking collaborator.
//!
//! Merging a second module into the one being compiled is not supported yet.
//! The entry point exists so that the pipeline and CLI have a fixed shape.

use std::path::Path;

use crate::ir::Module;
use crate::CompileError;

/// Link `module` against the module stored at `path`.
///
/// Always fails.
pub fn link_module(module: &mut Module, path: &Path) -> Result<(), CompileError> {
    tracing::warn!(module = %module.name, path = %path.display(), "link requested");
    Err(CompileError::Link(format!(
        "linking with `{}` is not implemented",
        path.display()
    )))
}
