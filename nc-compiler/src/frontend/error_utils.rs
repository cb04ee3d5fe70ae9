use crate::frontend::lexer::Token;
use crate::{CompileError, SemanticErrorKind};

/// Helper to create semantic errors reported against a source line
pub fn make_semantic_error(
    kind: SemanticErrorKind,
    line: usize,
    message: impl Into<String>,
) -> CompileError {
    CompileError::Semantic {
        kind,
        line,
        message: message.into(),
    }
}

/// Build a syntax error for the token where parsing got stuck.
pub fn make_parse_error(token: &Token, expected: &[&str]) -> CompileError {
    let message = match expected {
        [] => "unexpected token".to_string(),
        [only] => format!("expected {}", only),
        [init @ .., last] => format!("expected {} or {}", init.join(", "), last),
    };
    CompileError::Parse {
        line: token.line,
        found: token.to_string(),
        message,
    }
}
