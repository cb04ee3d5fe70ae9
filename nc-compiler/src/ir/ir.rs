// Typed, SSA-style IR with one straight-line block per function.
// Values are named locals; stack slots come from `alloca` and are accessed by pointer.

use std::collections::HashMap;

use serde::Serialize;

/// Largest bound that still fits a 32-bit signed integer.
pub const NARROW_LIMIT: i64 = i32::MAX as i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Width { I32, I64 }

impl Width {
    pub fn bits(self) -> u32 {
        match self { Width::I32 => 32, Width::I64 => 64 }
    }

    /// Width needed for a value whose magnitude never exceeds `bound`.
    pub fn for_bound(bound: i64) -> Width {
        if bound <= NARROW_LIMIT { Width::I32 } else { Width::I64 }
    }

    /// Wrap `value` to this width with two's-complement semantics.
    pub fn wrap(self, value: i64) -> i64 {
        match self { Width::I32 => value as i32 as i64, Width::I64 => value }
    }
}

impl std::fmt::Display for Width {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "i{}", self.bits())
    }
}

/// What an `alloca` reserves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SlotType {
    Scalar(Width),
    Array { elem: Width, len: usize },
}

impl SlotType {
    pub fn elem_width(self) -> Width {
        match self { SlotType::Scalar(w) => w, SlotType::Array { elem, .. } => elem }
    }

    pub fn with_width(self, width: Width) -> SlotType {
        match self {
            SlotType::Scalar(_) => SlotType::Scalar(width),
            SlotType::Array { len, .. } => SlotType::Array { elem: width, len },
        }
    }
}

impl std::fmt::Display for SlotType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SlotType::Scalar(w) => write!(f, "{w}"),
            SlotType::Array { elem, len } => write!(f, "[{len} x {elem}]"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Operand {
    Const { value: i64, width: Width },
    /// A named value defined earlier in the function, or a `<param>_arg`.
    Local(String),
}

impl Operand {
    pub fn i64(value: i64) -> Self { Operand::Const { value, width: Width::I64 } }
    pub fn local(name: impl Into<String>) -> Self { Operand::Local(name.into()) }
}

impl std::fmt::Display for Operand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operand::Const { value, .. } => write!(f, "{value}"),
            Operand::Local(name) => write!(f, "%{name}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ArithOp { Add, Sub, Mul, Div }

impl ArithOp {
    /// Result-name stem used by the code generator.
    pub fn stem(self) -> &'static str {
        match self { ArithOp::Add => "add_tmp", ArithOp::Sub => "sub_tmp", ArithOp::Mul => "mul_tmp", ArithOp::Div => "div_tmp" }
    }
}

impl std::fmt::Display for ArithOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}",
            match self { ArithOp::Add => "add", ArithOp::Sub => "sub", ArithOp::Mul => "mul", ArithOp::Div => "sdiv" })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum InstrKind {
    /// Reserve a stack slot; the result is a pointer to it.
    Alloca(SlotType),
    /// `result = *ptr`
    Load { width: Width, ptr: String },
    /// `*ptr = value`
    Store { width: Width, value: Operand, ptr: String },
    /// `result = lhs <op> rhs`, both operands of `width`
    Binary { op: ArithOp, width: Width, lhs: Operand, rhs: Operand },
    /// Pointer to element `index` of the array slot `array`.
    ElemPtr { array: String, elem: Width, len: usize, index: Operand, index_width: Width },
    Call { callee: String, args: Vec<(Width, Operand)>, ret: Width },
    /// i64 -> i32
    Trunc { value: Operand },
    /// i32 -> i64
    SExt { value: Operand },
    Ret { width: Width, value: Operand },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Instr {
    pub result: Option<String>,
    pub kind: InstrKind,
    /// Magnitude bound attached during lowering, consumed by narrowing.
    pub bound: Option<i64>,
}

impl Instr {
    pub fn new(result: impl Into<String>, kind: InstrKind) -> Self {
        Self { result: Some(result.into()), kind, bound: None }
    }

    pub fn void(kind: InstrKind) -> Self {
        Self { result: None, kind, bound: None }
    }

    pub fn with_bound(mut self, bound: Option<i64>) -> Self {
        self.bound = bound;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Block {
    pub label: String,
    pub instrs: Vec<Instr>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Param {
    /// IR name of the incoming value, `<source name>_arg`.
    pub name: String,
    pub width: Width,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Function {
    pub name: String,
    pub params: Vec<Param>,
    pub ret: Width,
    /// Empty for declarations.
    pub blocks: Vec<Block>,
}

impl Function {
    pub fn declaration(name: impl Into<String>, params: Vec<Param>) -> Self {
        Self { name: name.into(), params, ret: Width::I64, blocks: Vec::new() }
    }

    pub fn is_declaration(&self) -> bool { self.blocks.is_empty() }

    pub fn signature(&self) -> Signature {
        Signature { params: self.params.iter().map(|p| p.width).collect(), ret: self.ret }
    }

    pub fn instrs(&self) -> impl Iterator<Item = &Instr> {
        self.blocks.iter().flat_map(|b| b.instrs.iter())
    }

    /// Find the instruction defining `name`.
    pub fn find(&self, name: &str) -> Option<&Instr> {
        self.instrs().find(|i| i.result.as_deref() == Some(name))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Signature {
    pub params: Vec<Width>,
    pub ret: Width,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Module {
    pub name: String,
    pub functions: Vec<Function>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), functions: Vec::new() }
    }

    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn function_mut(&mut self, name: &str) -> Option<&mut Function> {
        self.functions.iter_mut().find(|f| f.name == name)
    }

    pub fn signatures(&self) -> HashMap<String, Signature> {
        self.functions.iter().map(|f| (f.name.clone(), f.signature())).collect()
    }
}
