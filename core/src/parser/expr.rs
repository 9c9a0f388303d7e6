//! Token classification in front of the tree builder.

use super::{MAX_EXPR_OPERATORS, ParseError, Parser};
use crate::lexer::{Token, TokenKind};
use crate::syntax::{BinaryOp, ExprId, ExprKind, Span, UnaryOp};

/// What the previously inserted token was. Decides how `-` and `[` are read
/// and which tokens may come next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prev {
    Start,
    Value,
    Unary,
    Binary,
}

impl<'t> Parser<'t> {
    /// Parses an expression, which must not be empty.
    pub(crate) fn parse_expr(&mut self) -> Result<ExprId, ParseError> {
        match self.parse_expr_opt()? {
            Some(id) => Ok(id),
            None => Err(self.error_here("expression")),
        }
    }

    /// Parses tokens until one that cannot continue an expression.
    pub(crate) fn parse_expr_opt(&mut self) -> Result<Option<ExprId>, ParseError> {
        self.enter()?;
        if self.expr_nesting == 0 {
            self.operators = 0;
        }
        self.expr_nesting += 1;
        let mut root = None;
        let mut prev = Prev::Start;

        while let Some(token) = self.peek() {
            let (node, next) = match &token.kind {
                TokenKind::Int(_)
                | TokenKind::Float(_)
                | TokenKind::Char(_)
                | TokenKind::Bool(_)
                | TokenKind::Str(_)
                | TokenKind::Ident(_)
                | TokenKind::TypeName(_) => {
                    self.value_allowed(prev)?;
                    (self.parse_value(token)?, Prev::Value)
                }
                TokenKind::LParen => {
                    self.value_allowed(prev)?;
                    (self.parse_group()?, Prev::Value)
                }
                TokenKind::LBracket if prev == Prev::Value => (self.parse_subscript()?, Prev::Value),
                TokenKind::LBracket => {
                    self.value_allowed(prev)?;
                    (self.parse_array_literal()?, Prev::Value)
                }
                TokenKind::Minus | TokenKind::Bang if prev != Prev::Value => {
                    self.pos += 1;
                    let op = match token.kind {
                        TokenKind::Minus => UnaryOp::Negate,
                        _ => UnaryOp::Not,
                    };
                    (self.arena.unary(op, token.span.clone()), Prev::Unary)
                }
                kind => match kind.operator_spelling().and_then(BinaryOp::from_spelling) {
                    Some(op) => {
                        if prev != Prev::Value {
                            return Err(self.error_here("expression"));
                        }
                        self.pos += 1;
                        (self.arena.binary(op, token.span.clone()), Prev::Binary)
                    }
                    None => break,
                },
            };
            if self.arena[node].is_operator() {
                self.count_operator(&token.span)?;
            }
            root = Some(self.arena.insert(root, node));
            prev = next;
        }

        self.expr_nesting -= 1;
        self.leave();
        match (prev, root) {
            (Prev::Start, _) => Ok(None),
            (Prev::Unary | Prev::Binary, _) => Err(self.error_here("expression after operator")),
            (Prev::Value, root) => {
                if let Some(root) = root {
                    self.widen(root);
                }
                Ok(root)
            }
        }
    }

    fn count_operator(&mut self, span: &Span) -> Result<(), ParseError> {
        self.operators += 1;
        if self.operators > MAX_EXPR_OPERATORS {
            return Err(ParseError::new(
                format!("Expression has more than {MAX_EXPR_OPERATORS} operators"),
                span.clone(),
            ));
        }
        Ok(())
    }

    fn value_allowed(&self, prev: Prev) -> Result<(), ParseError> {
        if prev == Prev::Value {
            Err(self.error_here("operator"))
        } else {
            Ok(())
        }
    }

    fn parse_value(&mut self, token: &'t Token) -> Result<ExprId, ParseError> {
        self.pos += 1;
        let span = token.span.clone();
        let id = match &token.kind {
            TokenKind::Int(i) => self.arena.int(*i, span),
            TokenKind::Float(f) => self.arena.float(*f, span),
            TokenKind::Char(c) => self.arena.char(*c, span),
            TokenKind::Bool(b) => self.arena.bool(*b, span),
            TokenKind::Str(bytes) => self.arena.string(bytes, span),
            TokenKind::Ident(name) if self.at(&TokenKind::LParen) => {
                self.parse_call(name.clone(), span)?
            }
            TokenKind::Ident(name) => self.arena.variable(name.clone(), span),
            TokenKind::TypeName(ty) if self.at(&TokenKind::LParen) => {
                // Conversion built-ins share their name with the type.
                self.parse_call(ty.to_string(), span)?
            }
            TokenKind::TypeName(ty) if self.at(&TokenKind::LBracket) => {
                let mut sizes = Vec::new();
                while self.eat(&TokenKind::LBracket) {
                    sizes.push(self.parse_expr()?);
                    self.expect(&TokenKind::RBracket, "']'")?;
                }
                let span = Span::new(span.start(), self.last_end());
                self.arena.alloc(ExprKind::Allocate { elem: *ty, sizes }, span)
            }
            _ => {
                self.pos -= 1;
                return Err(self.error_here("expression"));
            }
        };
        Ok(id)
    }

    fn parse_call(&mut self, name: String, name_span: Span) -> Result<ExprId, ParseError> {
        self.expect(&TokenKind::LParen, "'('")?;
        let mut args = Vec::new();
        if !self.eat(&TokenKind::RParen) {
            loop {
                args.push(self.parse_expr()?);
                if self.eat(&TokenKind::RParen) {
                    break;
                }
                self.expect(&TokenKind::Comma, "',' or ')'")?;
            }
        }
        let span = Span::new(name_span.start(), self.last_end());
        Ok(self.arena.alloc(
            ExprKind::Call {
                name,
                args,
                id: None,
                returns: None,
            },
            span,
        ))
    }

    /// `( expr )`, guarded so later operators cannot reach inside.
    fn parse_group(&mut self) -> Result<ExprId, ParseError> {
        let open = self.expect(&TokenKind::LParen, "'('")?;
        let inner = self.parse_expr()?;
        self.expect(&TokenKind::RParen, "')'")?;
        self.arena.set_guard(inner);
        self.arena[inner].span = Span::new(open.start(), self.last_end());
        Ok(inner)
    }

    /// `[ index ]` after a value: a subscript whose container arrives by
    /// insertion.
    fn parse_subscript(&mut self) -> Result<ExprId, ParseError> {
        let open = self.expect(&TokenKind::LBracket, "'['")?;
        let index = self.parse_expr()?;
        self.expect(&TokenKind::RBracket, "']'")?;
        let span = Span::new(open.start(), self.last_end());
        Ok(self.arena.subscript(index, span))
    }

    fn parse_array_literal(&mut self) -> Result<ExprId, ParseError> {
        let open = self.expect(&TokenKind::LBracket, "'['")?;
        let mut elements = Vec::new();
        if !self.eat(&TokenKind::RBracket) {
            loop {
                elements.push(self.parse_expr()?);
                if self.eat(&TokenKind::RBracket) {
                    break;
                }
                self.expect(&TokenKind::Comma, "',' or ']'")?;
            }
        }
        let span = Span::new(open.start(), self.last_end());
        Ok(self.arena.alloc(
            ExprKind::Array {
                elements,
                is_str: false,
                ty: None,
            },
            span,
        ))
    }

    /// Grows operator spans to cover their operands.
    fn widen(&mut self, id: ExprId) -> Span {
        let children: Vec<ExprId> = match &self.arena[id].kind {
            ExprKind::Unary { operand, .. } => operand.iter().copied().collect(),
            ExprKind::Binary { lhs, rhs, .. } => lhs.iter().chain(rhs.iter()).copied().collect(),
            _ => Vec::new(),
        };
        let mut span = self.arena[id].span.clone();
        for child in children {
            // Groups were widened when they were parsed.
            let child_span = if self.arena[child].is_operator() {
                self.widen(child)
            } else {
                self.arena[child].span.clone()
            };
            span = span.to(&child_span);
        }
        self.arena[id].span = span.clone();
        span
    }
}
