//! Front end: source text to AST.

pub mod error_utils;
pub mod lexer;
pub mod parser;
pub mod symbol_table;
pub mod token_stream;
