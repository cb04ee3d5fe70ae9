//! Abstract syntax tree produced by the parser.
//!
//! Every node owns its children; the tree has no sharing or back-edges.

use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationUnit {
    pub prototypes: Vec<Prototype>,
    pub functions: Vec<Function>,
}

impl TranslationUnit {
    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.proto.name == name)
    }
}

/// Function signature: name plus parameter names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prototype {
    pub name: String,
    pub params: Vec<String>,
    /// Source line of the function name (0 for builtins).
    pub line: usize,
}

impl Prototype {
    pub fn new(name: impl Into<String>, params: Vec<String>, line: usize) -> Self {
        Self {
            name: name.into(),
            params,
            line,
        }
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    pub proto: Prototype,
    pub body: FunctionBody,
}

impl Function {
    pub fn name(&self) -> &str {
        &self.proto.name
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionBody {
    /// Parameters first (kind `Param`), then locals in declaration order.
    pub var_decls: Vec<VarDecl>,
    pub array_decls: Vec<ArrayDecl>,
    pub statements: Vec<Stmt>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclKind {
    Param,
    Local,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarDecl {
    pub name: String,
    pub kind: DeclKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayDecl {
    pub name: String,
    pub size: usize,
    pub kind: DeclKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    /// `;`
    Null,
    /// Assignment, annotation, increment or bare expression followed by `;`
    Expr(Expr),
    Jump(JumpStmt),
}

impl Stmt {
    pub fn is_jump(&self) -> bool {
        matches!(self, Stmt::Jump(_))
    }
}

/// Only `return` exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JumpStmt {
    Return(Expr),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    /// `=`
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    /// `$`: bound annotation, produces no value
    Bound,
    /// `inc`: array element increment, produces no value
    Inc,
}

impl BinOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Assign => "=",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Bound => "$",
            BinOp::Inc => "inc",
        }
    }

    /// `$` and `inc` are statement-only forms.
    pub fn produces_value(self) -> bool {
        !matches!(self, BinOp::Bound | BinOp::Inc)
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Call {
        callee: String,
        args: Vec<Expr>,
    },
    /// Reference to a scalar variable
    Variable(String),
    /// Reference to an array, only valid on the left of `$` and `inc`
    Array(String),
    Number(i64),
}

impl Expr {
    pub fn binary(op: BinOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn produces_value(&self) -> bool {
        match self {
            Expr::Binary { op, .. } => op.produces_value(),
            _ => true,
        }
    }

    /// Fold literal-only arithmetic. Returns `None` for anything that reads
    /// variables, calls functions, divides by zero or overflows.
    pub fn const_value(&self) -> Option<i64> {
        match self {
            Expr::Number(n) => Some(*n),
            Expr::Binary { op, lhs, rhs } => {
                let (l, r) = (lhs.const_value()?, rhs.const_value()?);
                match op {
                    BinOp::Add => l.checked_add(r),
                    BinOp::Sub => l.checked_sub(r),
                    BinOp::Mul => l.checked_mul(r),
                    BinOp::Div => l.checked_div(r),
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Binary { op, lhs, rhs } => write!(f, "({} {} {})", lhs, op, rhs),
            Expr::Call { callee, args } => {
                write!(f, "{}(", callee)?;
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", a)?;
                }
                write!(f, ")")
            }
            Expr::Variable(name) | Expr::Array(name) => write!(f, "{}", name),
            Expr::Number(n) => write!(f, "{}", n),
        }
    }
}
