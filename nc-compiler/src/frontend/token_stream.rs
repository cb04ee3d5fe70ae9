//! Cursor over the token vector with checkpoint/rewind support for the
//! backtracking parser.

use std::fmt;

use super::lexer::{Token, TokenKind};

/// A saved cursor position, restored with [`TokenStream::reset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Mark(usize);

/// Owns the tokens of one translation unit plus a cursor.
///
/// The cursor always stays within `[0, len - 1]` and the last token is always `Eof`.
#[derive(Debug, Clone)]
pub struct TokenStream {
    tokens: Vec<Token>,
    cursor: usize,
}

impl TokenStream {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            let line = tokens.last().map(|t| t.line).unwrap_or(1);
            tokens.push(Token::eof(line));
        }
        Self { tokens, cursor: 0 }
    }

    pub fn current(&self) -> &Token {
        &self.tokens[self.cursor]
    }

    /// The token after the current one (the `Eof` token once the end is reached).
    pub fn lookahead(&self) -> &Token {
        let idx = (self.cursor + 1).min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    pub fn peek_kind(&self) -> TokenKind {
        self.current().kind
    }

    pub fn peek_text(&self) -> &str {
        &self.current().text
    }

    pub fn at_symbol(&self, symbol: &str) -> bool {
        self.current().is_symbol(symbol)
    }

    pub fn at_eof(&self) -> bool {
        self.peek_kind() == TokenKind::Eof
    }

    /// Move to the next token. Returns false when already on `Eof`.
    pub fn advance(&mut self) -> bool {
        if self.cursor + 1 < self.tokens.len() {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    /// Move the cursor back `n` tokens. Stops at the first token and returns
    /// false if fewer than `n` positions were available.
    pub fn rewind(&mut self, n: usize) -> bool {
        if n > self.cursor {
            self.cursor = 0;
            false
        } else {
            self.cursor -= n;
            true
        }
    }

    pub fn mark(&self) -> Mark {
        Mark(self.cursor)
    }

    pub fn reset(&mut self, mark: Mark) {
        self.cursor = mark.0.min(self.tokens.len() - 1);
    }

    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }
}

impl fmt::Display for TokenStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in &self.tokens {
            match token.kind {
                TokenKind::Eof => writeln!(f, "{:>4}: {:?}", token.line, token.kind)?,
                _ => writeln!(f, "{:>4}: {:?} {}", token.line, token.kind, token.text)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::lexer::lex;

    fn stream(src: &str) -> TokenStream {
        TokenStream::new(lex(src).unwrap())
    }

    #[test]
    fn advance_stops_at_eof() {
        let mut ts = stream("a b");
        assert!(ts.advance());
        assert!(ts.advance());
        assert!(ts.at_eof());
        assert!(!ts.advance());
        assert!(ts.at_eof());
    }

    #[test]
    fn rewind_is_clamped_at_start() {
        let mut ts = stream("a b c");
        ts.advance();
        ts.advance();
        assert!(ts.rewind(1));
        assert_eq!(ts.peek_text(), "b");
        assert!(!ts.rewind(5));
        assert_eq!(ts.position(), 0);
    }

    #[test]
    fn mark_and_reset_restore_the_cursor() {
        let mut ts = stream("int f ( )");
        ts.advance();
        let mark = ts.mark();
        ts.advance();
        ts.advance();
        assert!(ts.at_symbol(")"));
        ts.reset(mark);
        assert_eq!(ts.peek_text(), "f");
        assert!(ts.lookahead().is_symbol("("));
    }

    #[test]
    fn missing_eof_is_appended() {
        let ts = TokenStream::new(Vec::new());
        assert_eq!(ts.tokens().len(), 1);
        assert!(ts.at_eof());
    }
}
