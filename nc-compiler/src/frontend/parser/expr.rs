use super::{Parser, RuleResult};
use crate::ast::{BinOp, Expr};
use crate::frontend::error_utils::make_semantic_error;
use crate::frontend::lexer::TokenKind;
use crate::{CompileError, SemanticErrorKind};

impl Parser {
    /// ```text
    /// assignment := IDENT '=' additive
    ///             | IDENT '$' additive
    ///             | ARRAY_IDENT '$' additive
    ///             | ARRAY_IDENT 'inc' additive
    ///             | additive
    /// ```
    pub(super) fn assignment(&mut self) -> RuleResult<Expr> {
        if self.ts.peek_kind() == TokenKind::Identifier {
            let name = self.ts.current().clone();
            let next = self.ts.lookahead().clone();
            let is_array = self.symbols.is_array(&name.text);
            let is_var = self.symbols.is_variable(&name.text);

            let op = if next.is_symbol("=") {
                Some(BinOp::Assign)
            } else if next.is_symbol("$") {
                Some(BinOp::Bound)
            } else if is_array && next.kind == TokenKind::Identifier && next.text == "inc" {
                Some(BinOp::Inc)
            } else {
                None
            };

            if let Some(op) = op {
                let target = match op {
                    BinOp::Assign if is_array => {
                        return Err(make_semantic_error(
                            SemanticErrorKind::ArrayUsedAsVariable,
                            name.line,
                            format!("cannot assign to array '{}'", name.text),
                        ))
                    }
                    BinOp::Bound | BinOp::Inc if is_array => Expr::Array(name.text.clone()),
                    _ if is_var => Expr::Variable(name.text.clone()),
                    _ => {
                        return Err(make_semantic_error(
                            SemanticErrorKind::UndefinedVariable,
                            name.line,
                            format!("'{}' is not declared", name.text),
                        ))
                    }
                };

                let start = self.ts.mark();
                self.ts.advance();
                self.ts.advance();
                let Some(rhs) = self.additive()? else {
                    self.ts.reset(start);
                    return Ok(None);
                };

                if op == BinOp::Bound && rhs.const_value().is_none() {
                    return Err(make_semantic_error(
                        SemanticErrorKind::NonConstantBound,
                        next.line,
                        format!("bound on '{}' must be a constant expression", name.text),
                    ));
                }
                return Ok(Some(Expr::binary(op, target, rhs)));
            }
        }

        self.additive()
    }

    /// `multiplicative (('+' | '-') multiplicative)*`
    fn additive(&mut self) -> RuleResult<Expr> {
        let Some(mut lhs) = self.multiplicative()? else {
            return Ok(None);
        };
        loop {
            let op = if self.ts.at_symbol("+") {
                BinOp::Add
            } else if self.ts.at_symbol("-") {
                BinOp::Sub
            } else {
                break;
            };
            let before_op = self.ts.mark();
            self.ts.advance();
            match self.multiplicative()? {
                Some(rhs) => lhs = Expr::binary(op, lhs, rhs),
                None => {
                    self.ts.reset(before_op);
                    break;
                }
            }
        }
        Ok(Some(lhs))
    }

    /// `postfix (('*' | '/') postfix)*`
    fn multiplicative(&mut self) -> RuleResult<Expr> {
        let Some(mut lhs) = self.postfix()? else {
            return Ok(None);
        };
        loop {
            let op = if self.ts.at_symbol("*") {
                BinOp::Mul
            } else if self.ts.at_symbol("/") {
                BinOp::Div
            } else {
                break;
            };
            let before_op = self.ts.mark();
            self.ts.advance();
            match self.postfix()? {
                Some(rhs) => lhs = Expr::binary(op, lhs, rhs),
                None => {
                    self.ts.reset(before_op);
                    break;
                }
            }
        }
        Ok(Some(lhs))
    }

    /// `CALL_IDENT '(' (assignment (',' assignment)*)? ')' | primary`
    fn postfix(&mut self) -> RuleResult<Expr> {
        let at_call = self.ts.peek_kind() == TokenKind::Identifier && self.ts.lookahead().is_symbol("(");
        if !at_call {
            return self.primary();
        }

        let callee = self.ts.current().clone();
        let Some(arity) = self.symbols.callable_arity(&callee.text) else {
            return Err(make_semantic_error(
                SemanticErrorKind::UndefinedFunction,
                callee.line,
                format!("call to undeclared function '{}'", callee.text),
            ));
        };

        let start = self.ts.mark();
        self.ts.advance();
        self.ts.advance();

        let mut args = Vec::new();
        if !self.ts.at_symbol(")") {
            loop {
                let line = self.line();
                let Some(arg) = self.assignment()? else {
                    self.ts.reset(start);
                    return Ok(None);
                };
                self.require_value(&arg, line, "a call argument")?;
                args.push(arg);
                if !self.eat_symbol(",") {
                    break;
                }
            }
        }
        if !self.eat_symbol(")") {
            self.ts.reset(start);
            return Ok(None);
        }

        if args.len() != arity {
            return Err(make_semantic_error(
                SemanticErrorKind::ArgumentCountMismatch,
                callee.line,
                format!(
                    "'{}' expects {} argument(s) but {} were given",
                    callee.text,
                    arity,
                    args.len()
                ),
            ));
        }
        Ok(Some(Expr::Call {
            callee: callee.text,
            args,
        }))
    }

    /// `IDENT | DIGIT | '-' DIGIT | '(' assignment ')'`
    fn primary(&mut self) -> RuleResult<Expr> {
        let token = self.ts.current().clone();
        match token.kind {
            TokenKind::Identifier => {
                if self.symbols.is_variable(&token.text) {
                    self.ts.advance();
                    return Ok(Some(Expr::Variable(token.text)));
                }
                let (kind, message) = if self.symbols.is_array(&token.text) {
                    (
                        SemanticErrorKind::ArrayUsedAsVariable,
                        format!("array '{}' cannot be used as a value", token.text),
                    )
                } else {
                    (
                        SemanticErrorKind::UndefinedVariable,
                        format!("'{}' is not declared", token.text),
                    )
                };
                Err(make_semantic_error(kind, token.line, message))
            }
            TokenKind::Digit => {
                self.ts.advance();
                Ok(token.numeric_value.map(Expr::Number))
            }
            TokenKind::Symbol if token.text == "-" => {
                let start = self.ts.mark();
                self.ts.advance();
                let value = self.ts.current().numeric_value;
                match value {
                    Some(n) => {
                        self.ts.advance();
                        Ok(Some(Expr::Number(-n)))
                    }
                    None => {
                        self.expected("number");
                        self.ts.reset(start);
                        Ok(None)
                    }
                }
            }
            TokenKind::Symbol if token.text == "(" => {
                let start = self.ts.mark();
                self.ts.advance();
                let Some(inner) = self.assignment()? else {
                    self.ts.reset(start);
                    return Ok(None);
                };
                self.require_value(&inner, token.line, "a parenthesised operand")?;
                if !self.eat_symbol(")") {
                    self.ts.reset(start);
                    return Ok(None);
                }
                Ok(Some(inner))
            }
            _ => {
                self.expected("expression");
                Ok(None)
            }
        }
    }

    /// `$` and `inc` only make sense as whole statements.
    pub(super) fn require_value(
        &self,
        expr: &Expr,
        line: usize,
        position: &str,
    ) -> Result<(), CompileError> {
        if expr.produces_value() {
            return Ok(());
        }
        Err(make_semantic_error(
            SemanticErrorKind::ValuelessExpression,
            line,
            format!("'{}' produces no value and cannot be used as {}", expr, position),
        ))
    }
}
