//! AST to IR lowering module.
//!
//! This module handles the translation of the AST into the IR and attaches
//! the magnitude bounds that the narrowing pass later consumes.

pub mod context;
pub mod expr;
pub mod stmt;

use thiserror::Error;

use crate::ast::TranslationUnit;
use crate::ir::Module;
use crate::CompileError;

/// The main Gen struct that orchestrates the lowering process.
pub use context::{BoundMap, FunctionCtx, Gen};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodeGenError {
    #[error("redefinition of function '{name}': {reason}")]
    Redefinition { name: String, reason: String },

    #[error("index {index} is out of bounds for array '{array}' of length {len}")]
    IndexOutOfBounds { array: String, index: i64, len: usize },

    /// An inconsistency the parser should have ruled out.
    #[error("internal: {0}")]
    Internal(String),
}

/// Entry point for lowering a translation unit to an IR module.
pub fn lower(unit: &TranslationUnit, module_name: &str) -> Result<Module, CompileError> {
    let mut g = Gen::new(module_name);
    g.lower_unit(unit)?;
    Ok(g.finish())
}
