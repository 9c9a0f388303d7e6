use super::{MAX_EXPR_OPERATORS, ParseError, Parser};
use crate::lexer::TokenKind;
use crate::syntax::{
    Assign, BinaryOp, Branch, ExprKind, For, FunctionDef, If, Param, Return, Span, Stmt,
    StmtKind, VarInit, While, scratch_name,
};
use crate::types::Type;

impl<'t> Parser<'t> {
    pub(crate) fn parse_program(&mut self) -> Result<Vec<Stmt>, ParseError> {
        let mut stmts = Vec::new();
        while self.peek().is_some() {
            stmts.push(self.parse_stmt(true)?);
        }
        Ok(stmts)
    }

    fn parse_stmt(&mut self, top_level: bool) -> Result<Stmt, ParseError> {
        let start = self.here().start();
        let kind = match self.peek_kind() {
            Some(TokenKind::If) => self.parse_if()?,
            Some(TokenKind::While) => self.parse_while()?,
            Some(TokenKind::For) => self.parse_for()?,
            Some(TokenKind::Def) if top_level => self.parse_function()?,
            Some(TokenKind::Def) => {
                return Err(ParseError::new(
                    "Functions can only be defined at the top level",
                    self.here(),
                ));
            }
            Some(TokenKind::Return) => self.parse_return()?,
            Some(TokenKind::Ident(_)) => {
                let kind = match self.peek_nth_kind(1) {
                    Some(TokenKind::TypeName(_)) => self.parse_declaration()?,
                    Some(TokenKind::LParen) => self.parse_call_stmt()?,
                    _ => self.parse_assignment()?,
                };
                self.expect(&TokenKind::Semicolon, "';'")?;
                kind
            }
            _ => return Err(self.error_here("statement")),
        };
        Ok(Stmt {
            kind,
            span: Span::new(start, self.last_end()),
        })
    }

    /// `{ stmt* }` or a single statement.
    fn parse_body(&mut self) -> Result<Vec<Stmt>, ParseError> {
        self.enter()?;
        let mut body = Vec::new();
        if self.eat(&TokenKind::LBrace) {
            while !self.eat(&TokenKind::RBrace) {
                if self.peek().is_none() {
                    return Err(self.error_here("'}'"));
                }
                body.push(self.parse_stmt(false)?);
            }
        } else {
            body.push(self.parse_stmt(false)?);
        }
        self.leave();
        Ok(body)
    }

    /// `T` followed by any number of `[]`.
    fn parse_type(&mut self) -> Result<Type, ParseError> {
        let base = match self.peek_kind() {
            Some(TokenKind::TypeName(ty)) => *ty,
            _ => return Err(self.error_here("type")),
        };
        self.pos += 1;
        let mut extra = 0;
        while self.eat(&TokenKind::LBracket) {
            self.expect(&TokenKind::RBracket, "']'")?;
            extra += 1;
        }
        Ok(base.nested(extra))
    }

    /// `name T[n]... (= value)?` without the trailing semicolon.
    fn parse_declaration(&mut self) -> Result<StmtKind, ParseError> {
        let (name, name_span) = self.expect_ident()?;
        let base = match self.peek_kind() {
            Some(TokenKind::TypeName(ty)) => *ty,
            _ => return Err(self.error_here("type")),
        };
        self.pos += 1;

        let mut sizes = Vec::new();
        while self.eat(&TokenKind::LBracket) {
            if self.eat(&TokenKind::RBracket) {
                sizes.push(None);
            } else {
                sizes.push(Some(self.parse_expr()?));
                self.expect(&TokenKind::RBracket, "']'")?;
            }
        }

        let value = if self.eat(&TokenKind::Assign) {
            Some(self.parse_expr()?)
        } else {
            None
        };

        Ok(StmtKind::VarInit(VarInit {
            name,
            name_span,
            ty: base.nested(sizes.len() as u32),
            sizes,
            value,
            id: None,
        }))
    }

    /// `name[i]... op= value` without the trailing semicolon. Compound
    /// operators become `name[i]... op value`, reading the indices back
    /// from scratch variables when there are any.
    fn parse_assignment(&mut self) -> Result<StmtKind, ParseError> {
        let (name, name_span) = self.expect_ident()?;

        let mut subscripts = Vec::new();
        let mut brackets = Vec::new();
        while self.at(&TokenKind::LBracket) {
            let open = self.here();
            self.pos += 1;
            let index = self.parse_expr()?;
            self.expect(&TokenKind::RBracket, "']'")?;
            let bracket = Span::new(open.start(), self.last_end());
            if subscripts.len() == MAX_EXPR_OPERATORS {
                return Err(ParseError::new(
                    format!("Assignment target has more than {MAX_EXPR_OPERATORS} subscripts"),
                    bracket,
                ));
            }
            subscripts.push(index);
            brackets.push(bracket);
        }

        let op = match self.peek_kind() {
            Some(TokenKind::Assign) => None,
            Some(kind) => match kind.compound_spelling().and_then(BinaryOp::from_spelling) {
                Some(op) => Some(op),
                None => return Err(self.error_here("assignment operator")),
            },
            None => return Err(self.error_here("assignment operator")),
        };
        self.pos += 1;
        let rhs = self.parse_expr()?;

        let mut scratch = Vec::new();
        let value = match op {
            None => rhs,
            Some(op) => {
                let mut target = self.arena.variable(name.clone(), name_span.clone());
                for (k, (&index, bracket)) in subscripts.iter().zip(brackets).enumerate() {
                    let span = self.arena[index].span.clone();
                    let slot = self.arena.variable(scratch_name(k), span);
                    scratch.push(slot);
                    let node = self.arena.subscript(slot, bracket);
                    target = self.arena.insert(Some(target), node);
                }
                let span = Span::new(name_span.start(), self.last_end());
                self.arena.alloc(
                    ExprKind::Binary {
                        op,
                        lhs: Some(target),
                        rhs: Some(rhs),
                        lhs_ty: None,
                        rhs_ty: None,
                    },
                    span,
                )
            }
        };

        Ok(StmtKind::Assign(Assign {
            name,
            name_span,
            subscripts,
            value,
            scratch,
            id: None,
            var_ty: None,
        }))
    }

    fn parse_call_stmt(&mut self) -> Result<StmtKind, ParseError> {
        let start = self.here();
        let expr = self.parse_expr()?;
        match self.arena[expr].kind {
            ExprKind::Call { .. } if !self.arena[expr].guarded => Ok(StmtKind::Call(expr)),
            _ => Err(ParseError::new(
                "Only function calls can be used as statements",
                start.to(&self.arena[expr].span),
            )),
        }
    }

    fn parse_condition(&mut self) -> Result<crate::syntax::ExprId, ParseError> {
        self.expect(&TokenKind::LParen, "'('")?;
        let cond = self.parse_expr()?;
        self.expect(&TokenKind::RParen, "')'")?;
        Ok(cond)
    }

    fn parse_if(&mut self) -> Result<StmtKind, ParseError> {
        let mut branches = Vec::new();
        let start = self.expect(&TokenKind::If, "'if'")?;
        let cond = self.parse_condition()?;
        let body = self.parse_body()?;
        branches.push(Branch {
            cond: Some(cond),
            body,
            span: Span::new(start.start(), self.last_end()),
        });

        while self.at(&TokenKind::Elif) {
            let start = self.here();
            self.pos += 1;
            let cond = self.parse_condition()?;
            let body = self.parse_body()?;
            branches.push(Branch {
                cond: Some(cond),
                body,
                span: Span::new(start.start(), self.last_end()),
            });
        }

        if self.at(&TokenKind::Else) {
            let start = self.here();
            self.pos += 1;
            let body = self.parse_body()?;
            branches.push(Branch {
                cond: None,
                body,
                span: Span::new(start.start(), self.last_end()),
            });
        }

        Ok(StmtKind::If(If { branches }))
    }

    fn parse_while(&mut self) -> Result<StmtKind, ParseError> {
        self.expect(&TokenKind::While, "'while'")?;
        let cond = self.parse_condition()?;
        let body = self.parse_body()?;
        Ok(StmtKind::While(While { cond, body }))
    }

    /// `for (init; cond; step) body`
    fn parse_for(&mut self) -> Result<StmtKind, ParseError> {
        self.expect(&TokenKind::For, "'for'")?;
        self.expect(&TokenKind::LParen, "'('")?;

        let start = self.here().start();
        let init = match self.peek_nth_kind(1) {
            Some(TokenKind::TypeName(_)) => self.parse_declaration()?,
            _ => self.parse_assignment()?,
        };
        let init = Stmt {
            kind: init,
            span: Span::new(start, self.last_end()),
        };
        self.expect(&TokenKind::Semicolon, "';'")?;

        let cond = self.parse_expr()?;
        self.expect(&TokenKind::Semicolon, "';'")?;

        let start = self.here().start();
        let step = self.parse_assignment()?;
        let step = Stmt {
            kind: step,
            span: Span::new(start, self.last_end()),
        };
        self.expect(&TokenKind::RParen, "')'")?;

        let body = self.parse_body()?;
        Ok(StmtKind::For(For {
            init: Box::new(init),
            cond,
            step: Box::new(step),
            body,
        }))
    }

    /// `def name(p T, ...) T|void { body }`
    fn parse_function(&mut self) -> Result<StmtKind, ParseError> {
        self.expect(&TokenKind::Def, "'def'")?;
        let (name, name_span) = self.expect_ident()?;

        self.expect(&TokenKind::LParen, "'('")?;
        let mut params = Vec::new();
        if !self.eat(&TokenKind::RParen) {
            loop {
                let (name, span) = self.expect_ident()?;
                let ty = self.parse_type()?;
                params.push(Param {
                    name,
                    ty,
                    span,
                    id: None,
                });
                if self.eat(&TokenKind::RParen) {
                    break;
                }
                self.expect(&TokenKind::Comma, "',' or ')'")?;
            }
        }

        let returns = if self.eat(&TokenKind::Void) {
            None
        } else {
            Some(self.parse_type()?)
        };

        if !self.at(&TokenKind::LBrace) {
            return Err(self.error_here("'{'"));
        }
        self.in_function = true;
        let body = self.parse_body();
        self.in_function = false;

        Ok(StmtKind::Function(FunctionDef {
            name,
            name_span,
            params,
            returns,
            body: body?,
            id: None,
            slots: 0..0,
        }))
    }

    fn parse_return(&mut self) -> Result<StmtKind, ParseError> {
        let keyword = self.expect(&TokenKind::Return, "'return'")?;
        if !self.in_function {
            return Err(ParseError::new(
                "Return statement outside of a function",
                keyword,
            ));
        }
        let value = self.parse_expr_opt()?;
        self.expect(&TokenKind::Semicolon, "';'")?;
        Ok(StmtKind::Return(Return { value }))
    }
}
