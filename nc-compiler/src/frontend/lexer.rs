use logos::Logos;
use std::fmt;

/// Raw lexemes recognised by logos. These are folded into [`Token`]s by [`lex`].
#[derive(Logos, Debug, PartialEq, Eq, Clone, Copy)]
#[logos(skip r"[ \t\r\n\f]+")] // Whitespace
#[logos(skip r"//[^\n]*")] // Line comments
enum Lexeme {
    // --- Keywords ---
    #[token("int")]
    Int,
    #[token("return")]
    Return,
    #[token("array")]
    Array,

    // --- Identifiers and Numbers ---
    #[regex(r"[A-Za-z][A-Za-z0-9]*")]
    Ident,

    // A leading zero is always a token of its own.
    #[regex(r"0|[1-9][0-9]*")]
    Digit,

    // --- Operators and punctuation ---
    #[regex(r"[*+\-=;,(){}\[\]/$]")]
    Symbol,

    #[token("/*", skip_block_comment)]
    BlockComment,
}

/// Skip a `/* ... */` comment. An unterminated comment swallows the rest of the input.
fn skip_block_comment(lex: &mut logos::Lexer<Lexeme>) -> logos::Skip {
    let rest = lex.remainder();
    let len = rest.find("*/").map(|end| end + 2).unwrap_or(rest.len());
    lex.bump(len);
    logos::Skip
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Identifier,
    Digit,
    Symbol,
    KeywordInt,
    KeywordReturn,
    KeywordArray,
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Identifier => write!(f, "identifier"),
            TokenKind::Digit => write!(f, "number"),
            TokenKind::Symbol => write!(f, "symbol"),
            TokenKind::KeywordInt => write!(f, "'int'"),
            TokenKind::KeywordReturn => write!(f, "'return'"),
            TokenKind::KeywordArray => write!(f, "'array'"),
            TokenKind::Eof => write!(f, "end of input"),
        }
    }
}

/// A single token. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub kind: TokenKind,
    pub numeric_value: Option<i64>,
    /// 1-based source line.
    pub line: usize,
}

impl Token {
    pub fn new(text: impl Into<String>, kind: TokenKind, line: usize) -> Self {
        Self {
            text: text.into(),
            kind,
            numeric_value: None,
            line,
        }
    }

    pub fn digit(text: impl Into<String>, value: i64, line: usize) -> Self {
        Self {
            numeric_value: Some(value),
            ..Self::new(text, TokenKind::Digit, line)
        }
    }

    pub fn eof(line: usize) -> Self {
        Self::new("", TokenKind::Eof, line)
    }

    pub fn is_symbol(&self, symbol: &str) -> bool {
        self.kind == TokenKind::Symbol && self.text == symbol
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Eof => write!(f, "end of input"),
            _ => write!(f, "'{}'", self.text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexicalErrorKind {
    UnexpectedChar(char),
    LiteralOutOfRange(String),
}

/// Custom error type for lexical errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexicalError {
    pub kind: LexicalErrorKind,
    pub location: usize,
    pub line: usize,
    pub column: usize,
    pub context: String,
}

impl fmt::Display for LexicalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            LexicalErrorKind::UnexpectedChar(c) => write!(
                f,
                "Unexpected character '{}' at line {}, column {}\n  Context: {}",
                c, self.line, self.column, self.context
            ),
            LexicalErrorKind::LiteralOutOfRange(text) => write!(
                f,
                "Integer literal {} does not fit in 64 bits at line {}, column {}\n  Context: {}",
                text, self.line, self.column, self.context
            ),
        }
    }
}

impl std::error::Error for LexicalError {}

/// Byte offset to 1-based line/column lookup over a source text.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut starts = vec![0];
        for (i, ch) in source.char_indices() {
            if ch == '\n' {
                starts.push(i + 1);
            }
        }
        Self { line_starts: starts }
    }

    /// Convert a byte offset to 1-based (line, column).
    pub fn line_col(&self, byte: usize) -> (usize, usize) {
        let line_idx = match self.line_starts.binary_search(&byte) {
            Ok(idx) => idx,
            Err(insert_pos) => insert_pos.saturating_sub(1),
        };
        let start = self.line_starts.get(line_idx).copied().unwrap_or(0);
        (line_idx + 1, byte.saturating_sub(start) + 1)
    }
}

/// Get context around an error position (the line containing the error)
pub fn get_error_context(source: &str, position: usize) -> String {
    let line_start = source[..position]
        .rfind('\n')
        .map(|pos| pos + 1)
        .unwrap_or(0);

    let line_end = source[position..]
        .find('\n')
        .map(|pos| position + pos)
        .unwrap_or(source.len());

    source[line_start..line_end].trim().to_string()
}

fn make_lexical_error(
    source: &str,
    index: &LineIndex,
    position: usize,
    kind: LexicalErrorKind,
) -> LexicalError {
    let (line, column) = index.line_col(position);
    LexicalError {
        kind,
        location: position,
        line,
        column,
        context: get_error_context(source, position),
    }
}

/// Split `source` into tokens. The returned vector always ends with an `Eof` token.
///
/// Lexing stops at the first character outside the alphabet; the whole file is
/// rejected in that case.
pub fn lex(source: &str) -> Result<Vec<Token>, LexicalError> {
    let index = LineIndex::new(source);
    let mut lexer = Lexeme::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let text = lexer.slice();
        let (line, _) = index.line_col(span.start);

        let lexeme = match result {
            Ok(lexeme) => lexeme,
            Err(()) => {
                let unexpected = source[span.start..].chars().next().unwrap_or('\0');
                return Err(make_lexical_error(
                    source,
                    &index,
                    span.start,
                    LexicalErrorKind::UnexpectedChar(unexpected),
                ));
            }
        };

        let token = match lexeme {
            Lexeme::Int => Token::new(text, TokenKind::KeywordInt, line),
            Lexeme::Return => Token::new(text, TokenKind::KeywordReturn, line),
            Lexeme::Array => Token::new(text, TokenKind::KeywordArray, line),
            Lexeme::Ident => Token::new(text, TokenKind::Identifier, line),
            Lexeme::Symbol => Token::new(text, TokenKind::Symbol, line),
            Lexeme::Digit => match text.parse::<i64>() {
                Ok(value) => Token::digit(text, value, line),
                Err(_) => {
                    return Err(make_lexical_error(
                        source,
                        &index,
                        span.start,
                        LexicalErrorKind::LiteralOutOfRange(text.to_string()),
                    ))
                }
            },
            // Produced only through `skip_block_comment`, which always skips.
            Lexeme::BlockComment => continue,
        };
        tokens.push(token);
    }

    let (last_line, _) = index.line_col(source.len());
    tokens.push(Token::eof(last_line));
    tracing::debug!(count = tokens.len(), "lexed source");
    Ok(tokens)
}
