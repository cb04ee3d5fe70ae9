use std::collections::{HashMap, HashSet};

use super::CodeGenError;
use crate::ast::{Function as AstFunction, Prototype};
use crate::ir::namer::Namer;
use crate::ir::*;

/// Known magnitude bounds of source variables and arrays.
///
/// Owned by one [`FunctionCtx`] and discarded with it.
#[derive(Debug, Clone, Default)]
pub struct BoundMap {
    bounds: HashMap<String, i64>,
}

impl BoundMap {
    pub fn get(&self, name: &str) -> Option<i64> {
        self.bounds.get(name).copied()
    }

    pub fn set(&mut self, name: &str, bound: i64) {
        self.bounds.insert(name.to_string(), bound);
    }

    pub fn forget(&mut self, name: &str) {
        self.bounds.remove(name);
    }
}

/// Stack slot backing a source variable or array.
#[derive(Debug, Clone)]
pub struct Slot {
    pub name: String,
    pub ty: SlotType,
    /// Index of the defining `alloca` in the entry block.
    pub decl: usize,
}

/// A lowered value together with its bound, if one is known.
#[derive(Debug, Clone)]
pub struct Lowered {
    pub value: Operand,
    pub bound: Option<i64>,
}

/// State for lowering one function body.
pub struct FunctionCtx {
    pub name: String,
    pub namer: Namer,
    pub instrs: Vec<Instr>,
    pub slots: HashMap<String, Slot>,
    pub bounds: BoundMap,
    /// Names given an explicit bound with `$`.
    pub annotated: HashSet<String>,
    pub had_return: bool,
    pub signatures: HashMap<String, Signature>,
}

impl FunctionCtx {
    pub fn new(func: &AstFunction, signatures: HashMap<String, Signature>) -> Self {
        let mut namer = Namer::new();
        for p in &func.proto.params {
            namer.reserve(&arg_name(p));
        }
        Self {
            name: func.proto.name.clone(),
            namer,
            instrs: Vec::new(),
            slots: HashMap::new(),
            bounds: BoundMap::default(),
            annotated: HashSet::new(),
            had_return: false,
            signatures,
        }
    }

    pub fn new_temp(&mut self, stem: &str) -> String {
        self.namer.fresh(stem)
    }

    pub fn emit(&mut self, instr: Instr) {
        tracing::trace!(function = %self.name, "{}", instr);
        self.instrs.push(instr);
    }

    /// Emit an `alloca` for a source name and remember its slot.
    pub fn declare_slot(&mut self, source_name: &str, ty: SlotType) {
        let name = self.new_temp(source_name);
        let decl = self.instrs.len();
        self.emit(Instr::new(name.clone(), InstrKind::Alloca(ty)));
        self.slots.insert(source_name.to_string(), Slot { name, ty, decl });
    }

    pub fn scalar_slot(&self, name: &str) -> Result<Slot, CodeGenError> {
        match self.slots.get(name) {
            Some(slot) if matches!(slot.ty, SlotType::Scalar(_)) => Ok(slot.clone()),
            Some(_) => Err(CodeGenError::Internal(format!("'{name}' is an array, not a variable"))),
            None => Err(CodeGenError::Internal(format!("no slot for variable '{name}'"))),
        }
    }

    pub fn array_slot(&self, name: &str) -> Result<(Slot, usize), CodeGenError> {
        match self.slots.get(name) {
            Some(slot) => match slot.ty {
                SlotType::Array { len, .. } => Ok((slot.clone(), len)),
                SlotType::Scalar(_) => Err(CodeGenError::Internal(format!("'{name}' is a variable, not an array"))),
            },
            None => Err(CodeGenError::Internal(format!("no slot for array '{name}'"))),
        }
    }

    /// Attach `bound` to the `alloca` that declared `slot`.
    pub fn tag_slot(&mut self, slot: &Slot, bound: i64) {
        if let Some(instr) = self.instrs.get_mut(slot.decl) {
            instr.bound = Some(bound);
        }
    }

    pub fn finish(self) -> Vec<Instr> {
        self.instrs
    }
}

/// IR name of the incoming value for parameter `param`.
pub fn arg_name(param: &str) -> String {
    format!("{param}_arg")
}

/// Builds the module: declarations first, then one definition at a time.
pub struct Gen {
    pub out: Module,
}

impl Gen {
    pub fn new(module_name: &str) -> Self {
        Self { out: Module::new(module_name) }
    }

    pub fn finish(self) -> Module {
        self.out
    }

    /// Declare `i64 @name(i64, ...)` unless a matching declaration exists.
    pub fn declare(&mut self, proto: &Prototype) -> Result<(), CodeGenError> {
        match self.out.function(&proto.name) {
            Some(existing) if existing.params.len() != proto.arity() => Err(CodeGenError::Redefinition {
                name: proto.name.clone(),
                reason: format!(
                    "declared with {} parameter(s), redeclared with {}",
                    existing.params.len(),
                    proto.arity()
                ),
            }),
            Some(_) => Ok(()),
            None => {
                self.out.functions.push(Function::declaration(&proto.name, params_of(proto)));
                Ok(())
            }
        }
    }
}

pub fn params_of(proto: &Prototype) -> Vec<Param> {
    proto
        .params
        .iter()
        .map(|p| Param { name: arg_name(p), width: Width::I64 })
        .collect()
}
