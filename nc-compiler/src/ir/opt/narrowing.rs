//! Width narrowing: rewrite 64-bit values to 32 bits where their bound allows.
//!
//! One linear walk per function. A value's width depends only on its own tag;
//! there is no propagation between values. `trunc`/`sext` glue is inserted
//! wherever an operand's width differs from what its user expects.

use std::collections::HashMap;

use thiserror::Error;

use super::IrPass;
use crate::ir::namer::Namer;
use crate::ir::*;
use crate::CompileError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NarrowingError {
    #[error("in '{function}': use of undefined value '%{name}'")]
    UndefinedValue { function: String, name: String },

    #[error("in '{function}': '%{name}' is not a pointer")]
    NotAPointer { function: String, name: String },

    #[error("in '{function}': '%{name}' is not an integer")]
    NotAnInteger { function: String, name: String },

    #[error("in '{function}': call to '@{callee}', which is not in the module")]
    UnknownCallee { function: String, callee: String },

    #[error("in '{function}': '@{callee}' takes {expected} argument(s), got {found}")]
    CallArity { function: String, callee: String, expected: usize, found: usize },

    #[error("in '{function}': instruction has no result name: {instr}")]
    MissingResult { function: String, instr: String },
}

/// What a named value is, as far as widths are concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueKind {
    Int(Width),
    Slot(SlotType),
    /// Pointer to one array element.
    Elem(Width),
}

#[derive(Debug, Default)]
pub struct NarrowingPass {
    /// Slots made 32-bit across all runs.
    pub narrowed_slots: usize,
    /// Glue instructions inserted across all runs.
    pub glue: usize,
}

impl NarrowingPass {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn run_on_module(&mut self, module: &mut Module) -> Result<(), NarrowingError> {
        let signatures = module.signatures();
        for func in module.functions.iter_mut().filter(|f| !f.is_declaration()) {
            self.run_on_function(func, &signatures)?;
        }
        Ok(())
    }

    pub fn run_on_function(
        &mut self,
        func: &mut Function,
        signatures: &HashMap<String, Signature>,
    ) -> Result<(), NarrowingError> {
        let tags = take_tags(func);
        let mut rw = Rewriter {
            function: func.name.clone(),
            ret: func.ret,
            signatures,
            tags,
            kinds: func.params.iter().map(|p| (p.name.clone(), ValueKind::Int(p.width))).collect(),
            namer: Namer::from_function(func),
            glue_cache: HashMap::new(),
            out: Vec::new(),
            narrowed_slots: 0,
            glue: 0,
        };

        for block in &mut func.blocks {
            for instr in std::mem::take(&mut block.instrs) {
                rw.rewrite(instr)?;
            }
            block.instrs = std::mem::take(&mut rw.out);
        }

        tracing::debug!(
            function = %func.name,
            narrowed_slots = rw.narrowed_slots,
            glue = rw.glue,
            "narrowed function"
        );
        self.narrowed_slots += rw.narrowed_slots;
        self.glue += rw.glue;
        Ok(())
    }
}

impl IrPass for NarrowingPass {
    fn name(&self) -> &'static str {
        "narrowing"
    }

    fn run(&mut self, module: &mut Module) -> Result<(), CompileError> {
        Ok(self.run_on_module(module)?)
    }
}

/// Collect the bound of every tagged value and clear all tags.
fn take_tags(func: &mut Function) -> HashMap<String, i64> {
    let mut tags = HashMap::new();
    for block in &mut func.blocks {
        for instr in &mut block.instrs {
            if let (Some(name), Some(bound)) = (&instr.result, instr.bound.take()) {
                tags.insert(name.clone(), bound);
            }
        }
    }
    tags
}

struct Rewriter<'a> {
    function: String,
    ret: Width,
    signatures: &'a HashMap<String, Signature>,
    tags: HashMap<String, i64>,
    kinds: HashMap<String, ValueKind>,
    namer: Namer,
    /// `(value, width)` to the glue already converting it.
    glue_cache: HashMap<(String, Width), String>,
    out: Vec<Instr>,
    narrowed_slots: usize,
    glue: usize,
}

impl Rewriter<'_> {
    fn rewrite(&mut self, instr: Instr) -> Result<(), NarrowingError> {
        let Instr { result, kind, .. } = instr;
        match kind {
            InstrKind::Alloca(ty) => {
                let name = self.result(result, "alloca")?;
                let narrow = self.tag_width(&name) == Some(Width::I32);
                let ty = if narrow && ty.elem_width() == Width::I64 {
                    self.narrowed_slots += 1;
                    tracing::trace!(slot = %name, "narrowing slot");
                    ty.with_width(Width::I32)
                } else {
                    ty
                };
                self.kinds.insert(name.clone(), ValueKind::Slot(ty));
                self.push(Some(name), InstrKind::Alloca(ty));
            }
            InstrKind::Load { ptr, .. } => {
                let name = self.result(result, "load")?;
                let pointee = self.pointee(&ptr)?;
                if pointee == Width::I64 && self.tag_width(&name) == Some(Width::I32) {
                    let wide = self.namer.fresh(&format!("{name}.wide"));
                    self.kinds.insert(wide.clone(), ValueKind::Int(Width::I64));
                    self.push(Some(wide.clone()), InstrKind::Load { width: Width::I64, ptr });
                    self.glue += 1;
                    self.kinds.insert(name.clone(), ValueKind::Int(Width::I32));
                    self.push(Some(name), InstrKind::Trunc { value: Operand::Local(wide) });
                } else {
                    self.kinds.insert(name.clone(), ValueKind::Int(pointee));
                    self.push(Some(name), InstrKind::Load { width: pointee, ptr });
                }
            }
            InstrKind::Store { value, ptr, .. } => {
                let pointee = self.pointee(&ptr)?;
                let value = self.coerce(value, pointee)?;
                self.push(None, InstrKind::Store { width: pointee, value, ptr });
            }
            InstrKind::Binary { op, width, lhs, rhs } => {
                let name = self.result(result, "binary")?;
                let width = self.tag_width(&name).unwrap_or(width);
                let lhs = self.coerce(lhs, width)?;
                let rhs = self.coerce(rhs, width)?;
                self.kinds.insert(name.clone(), ValueKind::Int(width));
                self.push(Some(name), InstrKind::Binary { op, width, lhs, rhs });
            }
            InstrKind::ElemPtr { array, index, .. } => {
                let name = self.result(result, "getelementptr")?;
                let (elem, len) = match self.kind_of(&array)? {
                    ValueKind::Slot(SlotType::Array { elem, len }) => (elem, len),
                    _ => return Err(self.not_a_pointer(&array)),
                };
                let index_width = self.width_of(&index)?;
                self.kinds.insert(name.clone(), ValueKind::Elem(elem));
                self.push(Some(name), InstrKind::ElemPtr { array, elem, len, index, index_width });
            }
            InstrKind::Call { callee, args, .. } => {
                let name = self.result(result, "call")?;
                let sig = self.signatures.get(&callee).ok_or_else(|| NarrowingError::UnknownCallee {
                    function: self.function.clone(),
                    callee: callee.clone(),
                })?;
                if sig.params.len() != args.len() {
                    return Err(NarrowingError::CallArity {
                        function: self.function.clone(),
                        callee,
                        expected: sig.params.len(),
                        found: args.len(),
                    });
                }
                let (params, ret) = (sig.params.clone(), sig.ret);
                let mut coerced = Vec::with_capacity(args.len());
                for ((_, arg), width) in args.into_iter().zip(params) {
                    coerced.push((width, self.coerce(arg, width)?));
                }
                self.kinds.insert(name.clone(), ValueKind::Int(ret));
                self.push(Some(name), InstrKind::Call { callee, args: coerced, ret });
            }
            InstrKind::Trunc { value } => {
                let name = self.result(result, "trunc")?;
                let value = self.coerce(value, Width::I64)?;
                self.kinds.insert(name.clone(), ValueKind::Int(Width::I32));
                self.push(Some(name), InstrKind::Trunc { value });
            }
            InstrKind::SExt { value } => {
                let name = self.result(result, "sext")?;
                let value = self.coerce(value, Width::I32)?;
                self.kinds.insert(name.clone(), ValueKind::Int(Width::I64));
                self.push(Some(name), InstrKind::SExt { value });
            }
            InstrKind::Ret { value, .. } => {
                let value = self.coerce(value, self.ret)?;
                self.push(None, InstrKind::Ret { width: self.ret, value });
            }
        }
        Ok(())
    }

    fn push(&mut self, result: Option<String>, kind: InstrKind) {
        let instr = Instr { result, kind, bound: None };
        tracing::trace!(function = %self.function, "{}", instr);
        self.out.push(instr);
    }

    /// Width the tag on `name` asks for, if it was tagged.
    fn tag_width(&self, name: &str) -> Option<Width> {
        self.tags.get(name).map(|&b| Width::for_bound(b))
    }

    fn result(&self, result: Option<String>, what: &str) -> Result<String, NarrowingError> {
        result.ok_or_else(|| NarrowingError::MissingResult {
            function: self.function.clone(),
            instr: what.to_string(),
        })
    }

    fn kind_of(&self, name: &str) -> Result<ValueKind, NarrowingError> {
        self.kinds.get(name).copied().ok_or_else(|| NarrowingError::UndefinedValue {
            function: self.function.clone(),
            name: name.to_string(),
        })
    }

    fn not_a_pointer(&self, name: &str) -> NarrowingError {
        NarrowingError::NotAPointer { function: self.function.clone(), name: name.to_string() }
    }

    /// Width of the integer stored behind `ptr`.
    fn pointee(&self, ptr: &str) -> Result<Width, NarrowingError> {
        match self.kind_of(ptr)? {
            ValueKind::Slot(SlotType::Scalar(w)) | ValueKind::Elem(w) => Ok(w),
            ValueKind::Slot(SlotType::Array { .. }) | ValueKind::Int(_) => Err(self.not_a_pointer(ptr)),
        }
    }

    fn width_of(&self, operand: &Operand) -> Result<Width, NarrowingError> {
        match operand {
            Operand::Const { width, .. } => Ok(*width),
            Operand::Local(name) => match self.kind_of(name)? {
                ValueKind::Int(w) => Ok(w),
                _ => Err(NarrowingError::NotAnInteger {
                    function: self.function.clone(),
                    name: name.clone(),
                }),
            },
        }
    }

    /// Make `operand` a `width` value, re-typing constants and gluing locals.
    fn coerce(&mut self, operand: Operand, width: Width) -> Result<Operand, NarrowingError> {
        let name = match operand {
            Operand::Const { value, .. } => return Ok(Operand::Const { value: width.wrap(value), width }),
            Operand::Local(name) => name,
        };
        let current = self.width_of(&Operand::Local(name.clone()))?;
        if current == width {
            return Ok(Operand::Local(name));
        }

        let key = (name, width);
        if let Some(glue) = self.glue_cache.get(&key) {
            return Ok(Operand::Local(glue.clone()));
        }
        let glue = self.namer.fresh(&format!("{}.{width}", key.0));
        let kind = match width {
            Width::I32 => InstrKind::Trunc { value: Operand::Local(key.0.clone()) },
            Width::I64 => InstrKind::SExt { value: Operand::Local(key.0.clone()) },
        };
        self.kinds.insert(glue.clone(), ValueKind::Int(width));
        self.push(Some(glue.clone()), kind);
        self.glue += 1;
        self.glue_cache.insert(key, glue.clone());
        Ok(Operand::Local(glue))
    }
}
