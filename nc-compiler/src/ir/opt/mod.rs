//! IR Optimizations.
//!
//! This module provides a framework for running passes over a `Module`.
//! The default pipeline only narrows integer widths.

use crate::ir::Module;
use crate::CompileError;

pub mod narrowing;

/// A trait for an IR optimization pass.
pub trait IrPass {
    fn name(&self) -> &'static str;
    fn run(&mut self, module: &mut Module) -> Result<(), CompileError>;
}

/// Manages and executes a sequence of IR passes.
#[derive(Default)]
pub struct PassManager {
    passes: Vec<Box<dyn IrPass>>,
}

impl PassManager {
    pub fn new() -> Self {
        Self { passes: Vec::new() }
    }

    pub fn add_pass(&mut self, pass: Box<dyn IrPass>) {
        self.passes.push(pass);
    }

    pub fn run_passes(&mut self, module: &mut Module) -> Result<(), CompileError> {
        for pass in &mut self.passes {
            tracing::debug!(pass = pass.name(), module = %module.name, "running pass");
            pass.run(module)?;
        }
        Ok(())
    }
}

pub fn optimize(module: &mut Module) -> Result<(), CompileError> {
    let mut pm = PassManager::new();
    pm.add_pass(Box::new(narrowing::NarrowingPass::new()));
    pm.run_passes(module)
}
