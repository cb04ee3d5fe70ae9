use super::{Parser, RuleResult};
use crate::ast::{ArrayDecl, DeclKind, FunctionBody, Prototype, Stmt, VarDecl};
use crate::frontend::error_utils::make_semantic_error;
use crate::frontend::lexer::TokenKind;
use crate::SemanticErrorKind;

impl Parser {
    /// `'{' (var_decl | array_decl)* statement+ '}'`
    pub(super) fn function_body(&mut self, proto: &Prototype) -> RuleResult<FunctionBody> {
        let start = self.ts.mark();
        if !self.eat_symbol("{") {
            return Ok(None);
        }

        let mut body = FunctionBody {
            var_decls: proto
                .params
                .iter()
                .map(|p| VarDecl {
                    name: p.clone(),
                    kind: DeclKind::Param,
                })
                .collect(),
            ..FunctionBody::default()
        };

        loop {
            if let Some(var) = self.var_decl()? {
                body.var_decls.push(var);
            } else if let Some(array) = self.array_decl()? {
                body.array_decls.push(array);
            } else {
                break;
            }
        }

        while let Some(stmt) = self.statement()? {
            body.statements.push(stmt);
        }

        let close_line = self.line();
        if body.statements.is_empty() || !self.eat_symbol("}") {
            self.ts.reset(start);
            return Ok(None);
        }

        if !body.statements.last().is_some_and(Stmt::is_jump) {
            return Err(make_semantic_error(
                SemanticErrorKind::MissingReturn,
                close_line,
                format!("function '{}' does not end with a return statement", proto.name),
            ));
        }

        Ok(Some(body))
    }

    /// `'int' IDENT ';'`
    fn var_decl(&mut self) -> RuleResult<VarDecl> {
        let start = self.ts.mark();
        if !self.eat_kind(TokenKind::KeywordInt, "'int'") {
            return Ok(None);
        }
        let Some(name) = self.take_identifier() else {
            self.ts.reset(start);
            return Ok(None);
        };
        if !self.eat_symbol(";") {
            self.ts.reset(start);
            return Ok(None);
        }

        if self.symbols.declare_variable(&name.text).is_err() {
            return Err(make_semantic_error(
                SemanticErrorKind::VariableRedefinition,
                name.line,
                format!("'{}' is already declared in this function", name.text),
            ));
        }
        Ok(Some(VarDecl {
            name: name.text,
            kind: DeclKind::Local,
        }))
    }

    /// `'array' IDENT '[' DIGIT ']' ';'`
    fn array_decl(&mut self) -> RuleResult<ArrayDecl> {
        let start = self.ts.mark();
        if !self.eat_kind(TokenKind::KeywordArray, "'array'") {
            return Ok(None);
        }
        let Some(name) = self.take_identifier() else {
            self.ts.reset(start);
            return Ok(None);
        };
        if !self.eat_symbol("[") {
            self.ts.reset(start);
            return Ok(None);
        }
        let size = self.ts.current().numeric_value;
        let Some(size) = size else {
            self.expected("array size");
            self.ts.reset(start);
            return Ok(None);
        };
        self.ts.advance();
        if !self.eat_symbol("]") || !self.eat_symbol(";") {
            self.ts.reset(start);
            return Ok(None);
        }

        if self.symbols.declare_array(&name.text).is_err() {
            return Err(make_semantic_error(
                SemanticErrorKind::ArrayRedefinition,
                name.line,
                format!("'{}' is already declared in this function", name.text),
            ));
        }
        Ok(Some(ArrayDecl {
            name: name.text,
            size: size as usize,
            kind: DeclKind::Local,
        }))
    }
}
