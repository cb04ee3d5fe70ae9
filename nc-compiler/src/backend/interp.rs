//! Reference interpreter for IR modules.
//!
//! Executes the straight-line IR directly, honouring each instruction's
//! width: 32-bit arithmetic wraps at 32 bits. Used to run programs without a
//! native backend and to check that narrowing preserves results.

use std::collections::{HashMap, VecDeque};
use std::io::{BufRead, Write};

use thiserror::Error;

use crate::ir::*;

/// Nested call limit before execution is aborted.
pub const MAX_DEPTH: usize = 256;

/// Largest slot, in cells, a single `alloca` may request.
pub const MAX_CELLS: usize = 1 << 16;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("no function named '{0}'")]
    UnknownFunction(String),

    #[error("'{0}' is declared but never defined")]
    Unresolved(String),

    #[error("'{name}' takes {expected} argument(s), got {found}")]
    Arity { name: String, expected: usize, found: usize },

    #[error("division by zero in '{0}'")]
    DivisionByZero(String),

    #[error("index {index} is out of bounds for an array of length {len} in '{function}'")]
    IndexOutOfBounds { function: String, index: i64, len: usize },

    #[error("slot of {len} cells in '{function}' exceeds the limit of {}", MAX_CELLS)]
    SlotTooLarge { function: String, len: usize },

    #[error("call depth exceeded {0}")]
    StackOverflow(usize),

    #[error("function '{0}' finished without returning")]
    NoReturn(String),

    #[error("malformed IR in '{function}': {message}")]
    Malformed { function: String, message: String },

    #[error("input: {0}")]
    Input(String),
}

/// Environment providing the runtime builtins.
pub trait Host {
    fn print_num(&mut self, value: i64) -> Result<(), RuntimeError>;
    fn input_num(&mut self) -> Result<i64, RuntimeError>;
}

/// Builtins on stdin/stdout, one number per line.
#[derive(Debug, Default)]
pub struct StdHost;

impl Host for StdHost {
    fn print_num(&mut self, value: i64) -> Result<(), RuntimeError> {
        let mut out = std::io::stdout().lock();
        writeln!(out, "{value}").map_err(|e| RuntimeError::Input(e.to_string()))
    }

    fn input_num(&mut self) -> Result<i64, RuntimeError> {
        let mut line = String::new();
        std::io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| RuntimeError::Input(e.to_string()))?;
        line.trim()
            .parse()
            .map_err(|_| RuntimeError::Input(format!("'{}' is not a number", line.trim())))
    }
}

/// Builtins backed by in-memory queues.
#[derive(Debug, Default, Clone)]
pub struct BufferHost {
    pub inputs: VecDeque<i64>,
    pub output: Vec<i64>,
}

impl BufferHost {
    pub fn with_inputs(inputs: impl IntoIterator<Item = i64>) -> Self {
        Self { inputs: inputs.into_iter().collect(), output: Vec::new() }
    }
}

impl Host for BufferHost {
    fn print_num(&mut self, value: i64) -> Result<(), RuntimeError> {
        self.output.push(value);
        Ok(())
    }

    fn input_num(&mut self) -> Result<i64, RuntimeError> {
        self.inputs
            .pop_front()
            .ok_or_else(|| RuntimeError::Input("no input left".to_string()))
    }
}

/// Run `entry` with `args` and return its result.
pub fn run(module: &Module, entry: &str, args: &[i64], host: &mut dyn Host) -> Result<i64, RuntimeError> {
    tracing::debug!(module = %module.name, entry, "interpreting");
    let mut interp = Interpreter { module, host, depth: 0 };
    interp.call(entry, args)
}

#[derive(Debug, Clone, Copy)]
enum Val {
    Int(i64),
    Ptr { slot: usize, index: usize },
}

struct Cells {
    width: Width,
    data: Vec<i64>,
}

struct Frame<'f> {
    function: &'f str,
    values: HashMap<&'f str, Val>,
    slots: Vec<Cells>,
}

impl<'f> Frame<'f> {
    fn malformed(&self, message: impl Into<String>) -> RuntimeError {
        RuntimeError::Malformed { function: self.function.to_string(), message: message.into() }
    }

    fn int(&self, operand: &Operand) -> Result<i64, RuntimeError> {
        match operand {
            Operand::Const { value, width } => Ok(width.wrap(*value)),
            Operand::Local(name) => match self.values.get(name.as_str()) {
                Some(Val::Int(v)) => Ok(*v),
                Some(Val::Ptr { .. }) => Err(self.malformed(format!("'%{name}' is a pointer"))),
                None => Err(self.malformed(format!("'%{name}' is undefined"))),
            },
        }
    }

    fn ptr(&self, name: &str) -> Result<(usize, usize), RuntimeError> {
        match self.values.get(name) {
            Some(Val::Ptr { slot, index }) => Ok((*slot, *index)),
            _ => Err(self.malformed(format!("'%{name}' is not a pointer"))),
        }
    }

    fn cell(&mut self, name: &str) -> Result<(&mut i64, Width), RuntimeError> {
        let (slot, index) = self.ptr(name)?;
        let function = self.function;
        let cells = self.slots.get_mut(slot).ok_or_else(|| RuntimeError::Malformed {
            function: function.to_string(),
            message: format!("dangling pointer '%{name}'"),
        })?;
        let width = cells.width;
        let cell = cells.data.get_mut(index).ok_or_else(|| RuntimeError::Malformed {
            function: function.to_string(),
            message: format!("'%{name}' points past its slot"),
        })?;
        Ok((cell, width))
    }

    fn define(&mut self, result: &'f Option<String>, val: Val) -> Result<(), RuntimeError> {
        let name = result.as_deref().ok_or_else(|| self.malformed("instruction without a result"))?;
        self.values.insert(name, val);
        Ok(())
    }
}

struct Interpreter<'m, 'h> {
    module: &'m Module,
    host: &'h mut dyn Host,
    depth: usize,
}

impl<'m, 'h> Interpreter<'m, 'h> {
    fn call(&mut self, name: &str, args: &[i64]) -> Result<i64, RuntimeError> {
        let module = self.module;
        let func = module.function(name).ok_or_else(|| RuntimeError::UnknownFunction(name.to_string()))?;
        if func.params.len() != args.len() {
            return Err(RuntimeError::Arity { name: name.to_string(), expected: func.params.len(), found: args.len() });
        }

        if func.is_declaration() {
            return match (name, args) {
                ("printnum", [value]) => self.host.print_num(*value).map(|_| 0),
                ("inputnum", []) => self.host.input_num(),
                _ => Err(RuntimeError::Unresolved(name.to_string())),
            };
        }

        if self.depth >= MAX_DEPTH {
            return Err(RuntimeError::StackOverflow(MAX_DEPTH));
        }
        self.depth += 1;
        tracing::trace!(function = name, depth = self.depth, "call");
        let result = self.execute(func, args);
        self.depth -= 1;
        result
    }

    fn execute(&mut self, func: &'m Function, args: &[i64]) -> Result<i64, RuntimeError> {
        let mut frame = Frame { function: &func.name, values: HashMap::new(), slots: Vec::new() };
        for (param, arg) in func.params.iter().zip(args) {
            frame.values.insert(&param.name, Val::Int(param.width.wrap(*arg)));
        }

        for instr in func.instrs() {
            match &instr.kind {
                InstrKind::Alloca(ty) => {
                    let len = match ty {
                        SlotType::Scalar(_) => 1,
                        SlotType::Array { len, .. } => *len,
                    };
                    if len > MAX_CELLS {
                        return Err(RuntimeError::SlotTooLarge { function: func.name.clone(), len });
                    }
                    frame.slots.push(Cells { width: ty.elem_width(), data: vec![0; len] });
                    let slot = frame.slots.len() - 1;
                    frame.define(&instr.result, Val::Ptr { slot, index: 0 })?;
                }
                InstrKind::Load { width, ptr } => {
                    let (cell, _) = frame.cell(ptr)?;
                    let v = width.wrap(*cell);
                    frame.define(&instr.result, Val::Int(v))?;
                }
                InstrKind::Store { value, ptr, .. } => {
                    let v = frame.int(value)?;
                    let (cell, slot_width) = frame.cell(ptr)?;
                    *cell = slot_width.wrap(v);
                }
                InstrKind::Binary { op, width, lhs, rhs } => {
                    let l = width.wrap(frame.int(lhs)?);
                    let r = width.wrap(frame.int(rhs)?);
                    let v = match op {
                        ArithOp::Add => l.wrapping_add(r),
                        ArithOp::Sub => l.wrapping_sub(r),
                        ArithOp::Mul => l.wrapping_mul(r),
                        ArithOp::Div if r == 0 => return Err(RuntimeError::DivisionByZero(func.name.clone())),
                        ArithOp::Div => l.wrapping_div(r),
                    };
                    frame.define(&instr.result, Val::Int(width.wrap(v)))?;
                }
                InstrKind::ElemPtr { array, len, index, .. } => {
                    let (slot, _) = frame.ptr(array)?;
                    let i = frame.int(index)?;
                    if i < 0 || i as u64 >= *len as u64 {
                        return Err(RuntimeError::IndexOutOfBounds { function: func.name.clone(), index: i, len: *len });
                    }
                    frame.define(&instr.result, Val::Ptr { slot, index: i as usize })?;
                }
                InstrKind::Call { callee, args, ret } => {
                    let mut values = Vec::with_capacity(args.len());
                    for (w, a) in args {
                        values.push(w.wrap(frame.int(a)?));
                    }
                    let v = self.call(callee, &values)?;
                    frame.define(&instr.result, Val::Int(ret.wrap(v)))?;
                }
                InstrKind::Trunc { value } => {
                    let v = Width::I32.wrap(frame.int(value)?);
                    frame.define(&instr.result, Val::Int(v))?;
                }
                InstrKind::SExt { value } => {
                    let v = frame.int(value)?;
                    frame.define(&instr.result, Val::Int(v))?;
                }
                InstrKind::Ret { width, value } => return Ok(width.wrap(frame.int(value)?)),
            }
        }
        Err(RuntimeError::NoReturn(func.name.clone()))
    }
}
