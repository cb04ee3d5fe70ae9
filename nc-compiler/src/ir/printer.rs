//! Textual form of the IR, close to LLVM assembly.
//!
//! Pointers are untyped (`ptr`). A bound still attached to an instruction is
//! printed as a trailing `; upper = N` comment.

use std::fmt;

use crate::ir::{Function, Instr, InstrKind, Module, Operand, Width};

struct Typed<'a>(Width, &'a Operand);

impl fmt::Display for Typed<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.0, self.1)
    }
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(r) = &self.result {
            write!(f, "%{r} = ")?;
        }
        match &self.kind {
            InstrKind::Alloca(ty) => write!(f, "alloca {ty}")?,
            InstrKind::Load { width, ptr } => write!(f, "load {width}, ptr %{ptr}")?,
            InstrKind::Store { width, value, ptr } => {
                write!(f, "store {}, ptr %{ptr}", Typed(*width, value))?
            }
            InstrKind::Binary { op, width, lhs, rhs } => write!(f, "{op} {width} {lhs}, {rhs}")?,
            InstrKind::ElemPtr { array, elem, len, index, index_width } => write!(
                f,
                "getelementptr [{len} x {elem}], ptr %{array}, i64 0, {}",
                Typed(*index_width, index)
            )?,
            InstrKind::Call { callee, args, ret } => {
                write!(f, "call {ret} @{callee}(")?;
                for (i, (w, a)) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", Typed(*w, a))?;
                }
                write!(f, ")")?
            }
            InstrKind::Trunc { value } => write!(f, "trunc i64 {value} to i32")?,
            InstrKind::SExt { value } => write!(f, "sext i32 {value} to i64")?,
            InstrKind::Ret { width, value } => write!(f, "ret {}", Typed(*width, value))?,
        }
        if let Some(b) = self.bound {
            write!(f, "  ; upper = {b}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keyword = if self.is_declaration() { "declare" } else { "define" };
        write!(f, "{keyword} {} @{}(", self.ret, self.name)?;
        for (i, p) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            if self.is_declaration() {
                write!(f, "{}", p.width)?;
            } else {
                write!(f, "{} %{}", p.width, p.name)?;
            }
        }
        write!(f, ")")?;
        if self.is_declaration() {
            return writeln!(f);
        }
        writeln!(f, " {{")?;
        for block in &self.blocks {
            writeln!(f, "{}:", block.label)?;
            for instr in &block.instrs {
                writeln!(f, "  {instr}")?;
            }
        }
        writeln!(f, "}}")
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "; ModuleID = '{}'", self.name)?;
        for func in &self.functions {
            writeln!(f)?;
            write!(f, "{func}")?;
        }
        Ok(())
    }
}
