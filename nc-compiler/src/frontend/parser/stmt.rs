use super::{Parser, RuleResult};
use crate::ast::{JumpStmt, Stmt};
use crate::frontend::lexer::TokenKind;

impl Parser {
    /// `';' | assignment ';' | 'return' assignment ';'`
    pub(super) fn statement(&mut self) -> RuleResult<Stmt> {
        if self.eat_symbol(";") {
            return Ok(Some(Stmt::Null));
        }

        let start = self.ts.mark();
        if self.ts.peek_kind() == TokenKind::KeywordReturn {
            self.ts.advance();
            let line = self.line();
            let Some(value) = self.assignment()? else {
                self.ts.reset(start);
                return Ok(None);
            };
            self.require_value(&value, line, "a return value")?;
            if !self.eat_symbol(";") {
                self.ts.reset(start);
                return Ok(None);
            }
            return Ok(Some(Stmt::Jump(JumpStmt::Return(value))));
        }

        let Some(expr) = self.assignment()? else {
            return Ok(None);
        };
        if !self.eat_symbol(";") {
            self.ts.reset(start);
            return Ok(None);
        }
        Ok(Some(Stmt::Expr(expr)))
    }
}
