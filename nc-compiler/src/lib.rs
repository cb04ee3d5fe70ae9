pub mod ast;
pub mod backend;
pub mod frontend;
pub mod ir;
pub mod link;

use std::path::PathBuf;

use thiserror::Error;

pub use frontend::parser::parse;

#[derive(Error, Debug)]
pub enum CompileError {
    #[error("Lexical error: {0}")]
    Lexical(#[from] frontend::lexer::LexicalError),

    #[error("Parse error at line {line} near {found}: {message}")]
    Parse {
        line: usize,
        found: String,
        message: String,
    },

    #[error("SemanticError:{kind} (line {line}) - {message}")]
    Semantic {
        kind: SemanticErrorKind,
        line: usize,
        message: String,
    },

    #[error("Codegen error: {0}")]
    CodeGen(#[from] ir::ir_generator::CodeGenError),

    #[error("Narrowing error: {0}")]
    Narrowing(#[from] ir::opt::narrowing::NarrowingError),

    #[error("Link error: {0}")]
    Link(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemanticErrorKind {
    PrototypeRedefinition,
    FunctionRedefinition,
    ParameterRedefinition,
    VariableRedefinition,
    ArrayRedefinition,
    UndefinedVariable,
    ArrayUsedAsVariable,
    UndefinedFunction,
    ArgumentCountMismatch,
    NonConstantBound,
    MissingReturn,
    ValuelessExpression,
}

impl std::fmt::Display for SemanticErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SemanticErrorKind::PrototypeRedefinition => write!(f, "PrototypeRedefinition"),
            SemanticErrorKind::FunctionRedefinition => write!(f, "FunctionRedefinition"),
            SemanticErrorKind::ParameterRedefinition => write!(f, "ParameterRedefinition"),
            SemanticErrorKind::VariableRedefinition => write!(f, "VariableRedefinition"),
            SemanticErrorKind::ArrayRedefinition => write!(f, "ArrayRedefinition"),
            SemanticErrorKind::UndefinedVariable => write!(f, "UndefinedVariable"),
            SemanticErrorKind::ArrayUsedAsVariable => write!(f, "ArrayUsedAsVariable"),
            SemanticErrorKind::UndefinedFunction => write!(f, "UndefinedFunction"),
            SemanticErrorKind::ArgumentCountMismatch => write!(f, "ArgumentCountMismatch"),
            SemanticErrorKind::NonConstantBound => write!(f, "NonConstantBound"),
            SemanticErrorKind::MissingReturn => write!(f, "MissingReturn"),
            SemanticErrorKind::ValuelessExpression => write!(f, "ValuelessExpression"),
        }
    }
}

/// Knobs for a single compilation.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    pub module_name: String,
    /// Module to link against after code generation.
    pub link: Option<PathBuf>,
    /// Run the width-narrowing pass.
    pub narrow: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            module_name: "main".to_string(),
            link: None,
            narrow: true,
        }
    }
}

/// Compile source text to an IR module.
///
/// Stages: parse, lower with bound tags, optionally link, then narrow.
pub fn compile(source: &str, options: &CompileOptions) -> Result<ir::Module, CompileError> {
    let unit = parse(source)?;
    let mut module = ir::ir_generator::lower(&unit, &options.module_name)?;

    if let Some(path) = &options.link {
        link::link_module(&mut module, path)?;
    }

    if options.narrow {
        ir::opt::optimize(&mut module)?;
    }
    Ok(module)
}

/// Compile with default options (narrowing enabled, no link step).
pub fn compile_to_ir(source: &str) -> Result<ir::Module, CompileError> {
    compile(source, &CompileOptions::default())
}
