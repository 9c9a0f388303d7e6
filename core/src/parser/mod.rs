//! Recursive-descent statement parser.
//!
//! Statements are parsed by ordinary recursive descent. Expressions are fed
//! token by token into [`ExprArena::insert`], after this module has checked
//! that each token may follow the previous one.

mod error;
mod expr;
mod stmt;

pub use error::ParseError;

use crate::lexer::{Token, TokenKind, lex};
use crate::syntax::{Ast, ExprArena, Span};

/// Default maximum nesting depth for brackets, calls and blocks.
/// This prevents stack overflow from inputs like `((((...(1)...))))`.
pub const DEFAULT_MAX_PARSE_DEPTH: usize = 200;

/// Maximum number of operators in one expression, nested parts included.
/// Bounds the depth of the tree the later passes walk recursively.
pub const MAX_EXPR_OPERATORS: usize = 512;

/// Parses a whole program with the default maximum nesting depth.
pub fn parse(source: &str) -> Result<Ast, ParseError> {
    parse_with_max_depth(source, DEFAULT_MAX_PARSE_DEPTH)
}

pub fn parse_with_max_depth(source: &str, max_depth: usize) -> Result<Ast, ParseError> {
    let tokens = lex(source)?;
    let mut parser = Parser::new(&tokens, source.len(), max_depth);
    let stmts = parser.parse_program()?;
    tracing::debug!(statements = stmts.len(), nodes = parser.arena.len(), "Parsed program");
    Ok(Ast {
        arena: parser.arena,
        stmts,
    })
}

pub(crate) struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
    source_len: usize,
    pub(crate) arena: ExprArena,
    in_function: bool,
    depth: usize,
    max_depth: usize,
    /// Operators seen so far in the outermost expression being parsed.
    operators: usize,
    expr_nesting: usize,
}

impl<'t> Parser<'t> {
    pub(crate) fn new(tokens: &'t [Token], source_len: usize, max_depth: usize) -> Self {
        Parser {
            tokens,
            pos: 0,
            source_len,
            arena: ExprArena::new(),
            in_function: false,
            depth: 0,
            max_depth,
            operators: 0,
            expr_nesting: 0,
        }
    }

    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<&'t TokenKind> {
        self.peek().map(|t| &t.kind)
    }

    fn peek_nth_kind(&self, n: usize) -> Option<&'t TokenKind> {
        self.tokens.get(self.pos + n).map(|t| &t.kind)
    }

    fn at(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == Some(kind)
    }

    /// Span of the current token, or an empty span at the end of input.
    fn here(&self) -> Span {
        match self.peek() {
            Some(token) => token.span.clone(),
            None => Span(self.source_len..self.source_len),
        }
    }

    /// End offset of the most recently consumed token.
    fn last_end(&self) -> usize {
        match self.pos {
            0 => 0,
            n => self.tokens[n - 1].span.end(),
        }
    }

    fn found(&self) -> String {
        match self.peek() {
            Some(token) => token.kind.describe(),
            None => "end of input".to_owned(),
        }
    }

    fn error_here(&self, expected: &str) -> ParseError {
        ParseError::new(format!("Expected {expected}, found {}", self.found()), self.here())
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.at(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind, expected: &str) -> Result<Span, ParseError> {
        if self.at(kind) {
            let span = self.here();
            self.pos += 1;
            Ok(span)
        } else {
            Err(self.error_here(expected))
        }
    }

    fn expect_ident(&mut self) -> Result<(String, Span), ParseError> {
        match self.peek() {
            Some(Token {
                kind: TokenKind::Ident(name),
                span,
            }) => {
                self.pos += 1;
                Ok((name.clone(), span.clone()))
            }
            _ => Err(self.error_here("identifier")),
        }
    }

    fn enter(&mut self) -> Result<(), ParseError> {
        if self.depth >= self.max_depth {
            return Err(ParseError::new(
                format!(
                    "Nesting depth exceeds maximum of {} levels",
                    self.max_depth
                ),
                self.here(),
            ));
        }
        self.depth += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }
}

#[cfg(test)]
#[path = "parser_test.rs"]
mod parser_test;
