use super::context::{FunctionCtx, Lowered};
use super::CodeGenError;
use crate::ast::{BinOp as AstBinOp, Expr};
use crate::ir::*;

impl FunctionCtx {
    /// Lower an expression in statement position. Assignments are not
    /// reloaded; `$` and `inc` are only valid here.
    pub fn lower_effect(&mut self, e: &Expr) -> Result<(), CodeGenError> {
        match e {
            Expr::Binary { op: AstBinOp::Assign, lhs, rhs } => self.lower_assign(lhs, rhs).map(|_| ()),
            Expr::Binary { op: AstBinOp::Bound, lhs, rhs } => self.lower_bound(lhs, rhs),
            Expr::Binary { op: AstBinOp::Inc, lhs, rhs } => self.lower_inc(lhs, rhs),
            _ => self.lower_value(e).map(|_| ()),
        }
    }

    /// Lower an expression whose value is used.
    pub fn lower_value(&mut self, e: &Expr) -> Result<Lowered, CodeGenError> {
        match e {
            Expr::Number(n) => Ok(Lowered { value: Operand::i64(*n), bound: n.checked_abs() }),
            Expr::Variable(name) => self.load_variable(name),
            Expr::Array(name) => Err(CodeGenError::Internal(format!("array '{name}' used as a value"))),
            Expr::Call { callee, args } => self.lower_call(callee, args),
            Expr::Binary { op: AstBinOp::Assign, lhs, rhs } => {
                let var = self.lower_assign(lhs, rhs)?;
                self.load_variable(&var)
            }
            Expr::Binary { op, lhs, rhs } => {
                let arith = map_arith(*op)
                    .ok_or_else(|| CodeGenError::Internal(format!("'{op}' used as a value")))?;
                let l = self.lower_value(lhs)?;
                let r = self.lower_value(rhs)?;
                let bound = combine_bounds(arith, l.bound, r.bound);
                let name = self.new_temp(arith.stem());
                self.emit(
                    Instr::new(
                        name.clone(),
                        InstrKind::Binary { op: arith, width: Width::I64, lhs: l.value, rhs: r.value },
                    )
                    .with_bound(bound),
                );
                Ok(Lowered { value: Operand::Local(name), bound })
            }
        }
    }

    fn load_variable(&mut self, var: &str) -> Result<Lowered, CodeGenError> {
        let slot = self.scalar_slot(var)?;
        let bound = self.bounds.get(var);
        let name = self.new_temp("var_tmp");
        self.emit(
            Instr::new(name.clone(), InstrKind::Load { width: Width::I64, ptr: slot.name }).with_bound(bound),
        );
        Ok(Lowered { value: Operand::Local(name), bound })
    }

    /// `var = rhs`. Returns the assigned variable's name.
    fn lower_assign(&mut self, lhs: &Expr, rhs: &Expr) -> Result<String, CodeGenError> {
        let Expr::Variable(var) = lhs else {
            return Err(CodeGenError::Internal(format!("cannot assign to '{lhs}'")));
        };
        let slot = self.scalar_slot(var)?;
        let value = self.lower_value(rhs)?;

        match value.bound {
            Some(b) => self.bounds.set(var, b),
            None if self.annotated.contains(var) => {}
            None => self.bounds.forget(var),
        }

        let bound = self.bounds.get(var);
        self.emit(
            Instr::void(InstrKind::Store { width: Width::I64, value: value.value, ptr: slot.name }).with_bound(bound),
        );
        Ok(var.clone())
    }

    /// `target $ K`: records the bound and tags the slot. Emits no code.
    fn lower_bound(&mut self, lhs: &Expr, rhs: &Expr) -> Result<(), CodeGenError> {
        let k = rhs
            .const_value()
            .ok_or_else(|| CodeGenError::Internal(format!("bound '{rhs}' is not constant")))?;
        let bound = i64::try_from(k.unsigned_abs()).unwrap_or(i64::MAX);

        let (name, slot) = match lhs {
            Expr::Variable(name) => (name, self.scalar_slot(name)?),
            Expr::Array(name) => (name, self.array_slot(name)?.0),
            _ => return Err(CodeGenError::Internal(format!("cannot bound '{lhs}'"))),
        };
        self.bounds.set(name, bound);
        self.annotated.insert(name.clone());
        self.tag_slot(&slot, bound);
        Ok(())
    }

    /// `array inc index`: `array[index] = array[index] + 1`.
    fn lower_inc(&mut self, lhs: &Expr, rhs: &Expr) -> Result<(), CodeGenError> {
        let Expr::Array(array) = lhs else {
            return Err(CodeGenError::Internal(format!("cannot increment '{lhs}'")));
        };
        let (slot, len) = self.array_slot(array)?;
        let index = self.lower_value(rhs)?;
        if let Operand::Const { value, .. } = &index.value {
            if *value < 0 || *value as u64 >= len as u64 {
                return Err(CodeGenError::IndexOutOfBounds { array: array.clone(), index: *value, len });
            }
        }

        let bound = self.bounds.get(array);
        let bumped = bound.and_then(|b| b.checked_add(1));

        let gep = self.new_temp("gep");
        self.emit(
            Instr::new(
                gep.clone(),
                InstrKind::ElemPtr {
                    array: slot.name,
                    elem: Width::I64,
                    len,
                    index: index.value,
                    index_width: Width::I64,
                },
            )
            .with_bound(bound),
        );

        let old = self.new_temp("t0");
        self.emit(Instr::new(old.clone(), InstrKind::Load { width: Width::I64, ptr: gep.clone() }).with_bound(bound));

        let sum = self.new_temp("inc_add_tmp");
        self.emit(
            Instr::new(
                sum.clone(),
                InstrKind::Binary { op: ArithOp::Add, width: Width::I64, lhs: Operand::Local(old), rhs: Operand::i64(1) },
            )
            .with_bound(bumped),
        );
        self.emit(
            Instr::void(InstrKind::Store { width: Width::I64, value: Operand::Local(sum), ptr: gep }).with_bound(bumped),
        );
        Ok(())
    }

    fn lower_call(&mut self, callee: &str, args: &[Expr]) -> Result<Lowered, CodeGenError> {
        let arity = self
            .signatures
            .get(callee)
            .map(|s| s.params.len())
            .ok_or_else(|| CodeGenError::Internal(format!("call to unknown function '{callee}'")))?;
        if arity != args.len() {
            return Err(CodeGenError::Internal(format!(
                "'{callee}' takes {arity} argument(s), got {}",
                args.len()
            )));
        }

        let mut lowered = Vec::with_capacity(args.len());
        for a in args {
            lowered.push((Width::I64, self.lower_value(a)?.value));
        }
        let name = self.new_temp("call_tmp");
        self.emit(Instr::new(
            name.clone(),
            InstrKind::Call { callee: callee.to_string(), args: lowered, ret: Width::I64 },
        ));
        Ok(Lowered { value: Operand::Local(name), bound: None })
    }
}

pub fn map_arith(op: AstBinOp) -> Option<ArithOp> {
    match op {
        AstBinOp::Add => Some(ArithOp::Add),
        AstBinOp::Sub => Some(ArithOp::Sub),
        AstBinOp::Mul => Some(ArithOp::Mul),
        AstBinOp::Div => Some(ArithOp::Div),
        AstBinOp::Assign | AstBinOp::Bound | AstBinOp::Inc => None,
    }
}

/// Bound of `l <op> r` from operand bounds.
///
/// Subtraction uses the difference of the bounds and division keeps the
/// dividend's bound. Both are approximations, not proofs.
pub fn combine_bounds(op: ArithOp, l: Option<i64>, r: Option<i64>) -> Option<i64> {
    let (l, r) = (l?, r?);
    match op {
        ArithOp::Add => l.checked_add(r),
        ArithOp::Sub => i64::try_from(l.abs_diff(r)).ok(),
        ArithOp::Mul => l.checked_mul(r),
        ArithOp::Div => Some(l),
    }
}
