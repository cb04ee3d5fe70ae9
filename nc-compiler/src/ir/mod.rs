//! Intermediate Representation (IR) module.
//!
//! This module contains the IR definitions, the AST-to-IR generator with its
//! bound tracking, the textual printer and the optimisation passes.

pub mod ir;
pub use ir::*;
pub mod ir_generator;
pub mod namer;
pub mod opt;
pub mod printer;
