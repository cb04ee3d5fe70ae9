//! Backtracking recursive-descent parser.
//!
//! Every rule returns `Result<Option<T>, CompileError>`:
//! - `Ok(Some(node))` when the rule matched and consumed its tokens,
//! - `Ok(None)` when it did not match, with the cursor restored,
//! - `Err(..)` for semantic errors, which stop parsing immediately.
//!
//! Rules that give up record what they expected at the furthest token reached,
//! so that a top-level failure can point at the most useful spot.

mod decl;
mod expr;
mod stmt;

use crate::ast::{Function, Prototype, TranslationUnit};
use crate::frontend::error_utils::{make_parse_error, make_semantic_error};
use crate::frontend::lexer::{lex, Token, TokenKind};
use crate::frontend::symbol_table::{SymbolTable, BUILTINS};
use crate::frontend::token_stream::TokenStream;
use crate::{CompileError, SemanticErrorKind};

pub(crate) type RuleResult<T> = Result<Option<T>, CompileError>;

/// Lex and parse a whole translation unit.
pub fn parse(source: &str) -> Result<TranslationUnit, CompileError> {
    let tokens = lex(source)?;
    Parser::new(tokens).parse()
}

pub struct Parser {
    ts: TokenStream,
    symbols: SymbolTable,
    /// Furthest token index any rule failed at, and what it wanted there.
    furthest: usize,
    expected: Vec<&'static str>,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            ts: TokenStream::new(tokens),
            symbols: SymbolTable::with_builtins(),
            furthest: 0,
            expected: Vec::new(),
        }
    }

    pub fn parse(mut self) -> Result<TranslationUnit, CompileError> {
        let mut unit = TranslationUnit::default();
        for (name, params) in BUILTINS {
            let params = params.iter().map(|p| p.to_string()).collect();
            unit.prototypes.push(Prototype::new(*name, params, 0));
        }

        let mut decls = 0;
        while decls == 0 || !self.ts.at_eof() {
            if self.external_decl(&mut unit)?.is_none() {
                return Err(self.syntax_error());
            }
            decls += 1;
        }

        tracing::debug!(
            prototypes = unit.prototypes.len(),
            functions = unit.functions.len(),
            "parsed translation unit"
        );
        Ok(unit)
    }

    /// `prototype ';'` or `prototype function_body`
    fn external_decl(&mut self, unit: &mut TranslationUnit) -> RuleResult<()> {
        let start = self.ts.mark();
        let Some(proto) = self.prototype()? else {
            return Ok(None);
        };

        if self.eat_symbol(";") {
            if self.symbols.declare_prototype(&proto.name, proto.arity()).is_err() {
                return Err(make_semantic_error(
                    SemanticErrorKind::PrototypeRedefinition,
                    proto.line,
                    format!("prototype '{}' conflicts with an earlier declaration", proto.name),
                ));
            }
            unit.prototypes.push(proto);
            return Ok(Some(()));
        }

        if !self.ts.at_symbol("{") {
            self.expected("'{'");
            self.ts.reset(start);
            return Ok(None);
        }

        if self.symbols.check_definition(&proto.name, proto.arity()).is_err() {
            return Err(make_semantic_error(
                SemanticErrorKind::FunctionRedefinition,
                proto.line,
                format!(
                    "function '{}' with {} parameter(s) conflicts with an earlier declaration",
                    proto.name,
                    proto.arity()
                ),
            ));
        }

        self.symbols.enter_function();
        for param in &proto.params {
            // Duplicates were rejected while parsing the prototype.
            let _ = self.symbols.declare_variable(param);
        }

        match self.function_body(&proto)? {
            Some(body) => {
                self.symbols.define_function(&proto.name, proto.arity());
                unit.functions.push(Function { proto, body });
                Ok(Some(()))
            }
            None => {
                self.ts.reset(start);
                Ok(None)
            }
        }
    }

    /// `'int' IDENT '(' ( 'int' IDENT (',' 'int' IDENT)* )? ')'`
    fn prototype(&mut self) -> RuleResult<Prototype> {
        let start = self.ts.mark();
        if !self.eat_kind(TokenKind::KeywordInt, "'int'") {
            return Ok(None);
        }
        let Some(name) = self.take_identifier() else {
            self.ts.reset(start);
            return Ok(None);
        };
        if !self.eat_symbol("(") {
            self.ts.reset(start);
            return Ok(None);
        }

        let mut params: Vec<String> = Vec::new();
        if !self.ts.at_symbol(")") {
            loop {
                if !self.eat_kind(TokenKind::KeywordInt, "'int'") {
                    self.ts.reset(start);
                    return Ok(None);
                }
                let Some(param) = self.take_identifier() else {
                    self.ts.reset(start);
                    return Ok(None);
                };
                if params.contains(&param.text) {
                    return Err(make_semantic_error(
                        SemanticErrorKind::ParameterRedefinition,
                        param.line,
                        format!("parameter '{}' of '{}' declared twice", param.text, name.text),
                    ));
                }
                params.push(param.text);
                if !self.eat_symbol(",") {
                    break;
                }
            }
        }

        if !self.eat_symbol(")") {
            self.ts.reset(start);
            return Ok(None);
        }
        Ok(Some(Prototype::new(name.text, params, name.line)))
    }

    // ── Token helpers ────────────────────────────────────────────────────

    /// Record that `what` was expected at the current token.
    fn expected(&mut self, what: &'static str) {
        let pos = self.ts.position();
        if pos > self.furthest {
            self.furthest = pos;
            self.expected.clear();
        }
        if pos == self.furthest && !self.expected.contains(&what) {
            self.expected.push(what);
        }
    }

    fn eat_symbol(&mut self, symbol: &'static str) -> bool {
        if self.ts.at_symbol(symbol) {
            self.ts.advance();
            true
        } else {
            self.expected(symbol_name(symbol));
            false
        }
    }

    fn eat_kind(&mut self, kind: TokenKind, what: &'static str) -> bool {
        if self.ts.peek_kind() == kind {
            self.ts.advance();
            true
        } else {
            self.expected(what);
            false
        }
    }

    fn take_identifier(&mut self) -> Option<Token> {
        if self.ts.peek_kind() == TokenKind::Identifier {
            let token = self.ts.current().clone();
            self.ts.advance();
            Some(token)
        } else {
            self.expected("identifier");
            None
        }
    }

    fn line(&self) -> usize {
        self.ts.current().line
    }

    fn syntax_error(&self) -> CompileError {
        let idx = self.furthest.min(self.ts.tokens().len() - 1);
        make_parse_error(&self.ts.tokens()[idx], &self.expected)
    }
}

fn symbol_name(symbol: &str) -> &'static str {
    match symbol {
        ";" => "';'",
        "," => "','",
        "(" => "'('",
        ")" => "')'",
        "{" => "'{'",
        "}" => "'}'",
        "[" => "'['",
        "]" => "']'",
        _ => "symbol",
    }
}
