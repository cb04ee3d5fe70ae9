use super::context::{arg_name, params_of, FunctionCtx, Gen};
use super::CodeGenError;
use crate::ast::{Function as AstFunction, JumpStmt, Stmt, TranslationUnit};
use crate::ir::*;

impl Gen {
    pub fn lower_unit(&mut self, unit: &TranslationUnit) -> Result<(), CodeGenError> {
        for proto in &unit.prototypes {
            self.declare(proto)?;
        }
        for func in &unit.functions {
            self.lower_function(func)?;
        }
        tracing::debug!(
            module = %self.out.name,
            functions = self.out.functions.len(),
            "lowered translation unit"
        );
        Ok(())
    }

    fn lower_function(&mut self, func: &AstFunction) -> Result<(), CodeGenError> {
        let name = func.name();
        match self.out.function(name) {
            Some(existing) if !existing.is_declaration() => {
                return Err(CodeGenError::Redefinition {
                    name: name.to_string(),
                    reason: "function already has a body".to_string(),
                })
            }
            Some(existing) if existing.params.len() != func.proto.arity() => {
                return Err(CodeGenError::Redefinition {
                    name: name.to_string(),
                    reason: format!(
                        "declared with {} parameter(s), defined with {}",
                        existing.params.len(),
                        func.proto.arity()
                    ),
                })
            }
            Some(_) => {}
            None => self.declare(&func.proto)?,
        }

        let mut ctx = FunctionCtx::new(func, self.out.signatures());
        ctx.lower_body(func)?;
        let instrs = ctx.finish();
        tracing::debug!(function = name, instrs = instrs.len(), "lowered function");

        let target = self
            .out
            .function_mut(name)
            .ok_or_else(|| CodeGenError::Internal(format!("'{name}' vanished from the module")))?;
        // The definition's parameter names win over the prototype's.
        target.params = params_of(&func.proto);
        target.blocks = vec![Block { label: "entry".to_string(), instrs }];
        Ok(())
    }
}

impl FunctionCtx {
    pub fn lower_body(&mut self, func: &AstFunction) -> Result<(), CodeGenError> {
        let body = &func.body;
        for array in &body.array_decls {
            self.declare_slot(&array.name, SlotType::Array { elem: Width::I64, len: array.size });
        }
        for var in &body.var_decls {
            self.declare_slot(&var.name, SlotType::Scalar(Width::I64));
        }
        for param in &func.proto.params {
            let slot = self.scalar_slot(param)?;
            self.emit(Instr::void(InstrKind::Store {
                width: Width::I64,
                value: Operand::local(arg_name(param)),
                ptr: slot.name,
            }));
        }

        for stmt in &body.statements {
            if self.had_return {
                tracing::warn!(function = %self.name, "skipping statement after return");
                break;
            }
            self.lower_stmt(stmt)?;
        }
        Ok(())
    }

    pub fn lower_stmt(&mut self, stmt: &Stmt) -> Result<(), CodeGenError> {
        match stmt {
            Stmt::Null => Ok(()),
            Stmt::Expr(e) => self.lower_effect(e),
            Stmt::Jump(JumpStmt::Return(e)) => {
                let v = self.lower_value(e)?;
                self.emit(Instr::void(InstrKind::Ret { width: Width::I64, value: v.value }));
                self.had_return = true;
                Ok(())
            }
        }
    }
}
