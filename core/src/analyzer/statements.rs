use smallvec::SmallVec;

use super::checker::Checker;
use super::error::{CompileError, codes};
use super::context::CompilationContext;
use crate::api::Diagnostic;
use crate::optimizer::{Fold, fold_binary, fold_unary};
use crate::syntax::{
    Assign, Ast, Branch, ExprId, ExprKind, For, FunctionDef, Number, Return, Span, Stmt, StmtKind,
    VarInit,
};
use crate::types::{Primitive, Type};

/// Checks a whole program, resolving every name to its id and recording
/// types on the tree. Recoverable errors land in `ctx.diagnostics`.
pub fn analyze(ast: &mut Ast, ctx: &mut CompilationContext) -> Result<(), CompileError> {
    let Ast { arena, stmts } = ast;
    let mut checker = Checker { arena, ctx };
    checker.stmts(stmts)?;
    tracing::debug!(
        statements = stmts.len(),
        slots = checker.ctx.scopes.slot_count(),
        diagnostics = checker.ctx.diagnostics.len(),
        "Checked program"
    );
    Ok(())
}

impl Checker<'_> {
    pub fn stmts(&mut self, stmts: &mut [Stmt]) -> Result<(), CompileError> {
        for stmt in stmts {
            self.stmt(stmt)?;
        }
        Ok(())
    }

    fn block(&mut self, body: &mut [Stmt]) -> Result<(), CompileError> {
        self.ctx.scopes.push_block();
        let result = self.stmts(body);
        self.ctx.scopes.pop();
        result
    }

    pub fn stmt(&mut self, stmt: &mut Stmt) -> Result<(), CompileError> {
        match &mut stmt.kind {
            StmtKind::VarInit(init) => self.var_init(init),
            StmtKind::Assign(assign) => self.assign(assign),
            StmtKind::If(chain) => {
                for branch in &mut chain.branches {
                    self.branch(branch)?;
                }
                Ok(())
            }
            StmtKind::While(w) => {
                self.condition(w.cond)?;
                self.block(&mut w.body)
            }
            StmtKind::For(f) => {
                // The loop variable lives in a scope around the whole loop.
                self.ctx.scopes.push_block();
                let result = self.for_loop(f);
                self.ctx.scopes.pop();
                result
            }
            StmtKind::Function(def) => self.function(def),
            StmtKind::Return(ret) => self.ret(ret, stmt.span.clone()),
            StmtKind::Call(call) => self.call(*call).map(|_| ()),
        }
    }

    fn for_loop(&mut self, f: &mut For) -> Result<(), CompileError> {
        self.stmt(&mut f.init)?;
        self.condition(f.cond)?;
        self.stmt(&mut f.step)?;
        self.block(&mut f.body)
    }

    fn branch(&mut self, branch: &mut Branch) -> Result<(), CompileError> {
        if let Some(cond) = branch.cond {
            self.condition(cond)?;
        }
        self.block(&mut branch.body)
    }

    fn condition(&mut self, cond: ExprId) -> Result<(), CompileError> {
        match self.expr(cond)? {
            Some(Type::BOOL) | None => {}
            Some(ty) => self.ctx.mismatch(
                format!("Condition must be bool, found {ty}"),
                self.arena[cond].span.clone(),
            ),
        }
        Ok(())
    }

    /// Checks `value` against the exact type `expected`.
    fn assigned_value(&mut self, value: ExprId, expected: Type) -> Result<(), CompileError> {
        match self.expr_expecting(value, expected)? {
            Some(ty) if ty != expected => self.ctx.mismatch(
                format!("Expected a value of type {expected}, found {ty}"),
                self.arena[value].span.clone(),
            ),
            _ => {}
        }
        Ok(())
    }

    fn var_init(&mut self, init: &mut VarInit) -> Result<(), CompileError> {
        for size in init.sizes.iter().flatten() {
            self.expect_int(*size, "Array size")?;
        }
        // The initializer is checked before the name comes into scope.
        if let Some(value) = init.value {
            self.assigned_value(value, init.ty)?;
            let sizes: SmallVec<[Option<usize>; 4]> = init
                .sizes
                .iter()
                .map(|size| size.and_then(|size| self.constant_int(size)))
                .map(|size| size.and_then(|n| usize::try_from(n).ok()))
                .collect();
            self.pad(value, init.ty, &sizes, &init.name_span);
        }
        match self
            .ctx
            .scopes
            .declare(&init.name, init.ty, init.name_span.clone())?
        {
            Ok(id) => init.id = Some(id),
            Err(existing) => self.duplicate(&init.name, init.name_span.clone(), existing.span),
        }
        Ok(())
    }

    /// Value of an int expression made only of literals, if it has one.
    fn constant_int(&self, id: ExprId) -> Option<i64> {
        let (prim, value) = self.constant(id)?;
        match (prim, value) {
            (Primitive::Int, Number::Int(n)) => Some(n),
            _ => None,
        }
    }

    fn constant(&self, id: ExprId) -> Option<(Primitive, Number)> {
        match &self.arena[id].kind {
            ExprKind::Numeric { prim, value } => Some((*prim, *value)),
            ExprKind::Unary {
                op,
                operand: Some(operand),
                ..
            } => {
                let (prim, value) = self.constant(*operand)?;
                fold_unary(*op, prim, value)
            }
            ExprKind::Binary {
                op,
                lhs: Some(lhs),
                rhs: Some(rhs),
                ..
            } => match fold_binary(*op, self.constant(*lhs)?, self.constant(*rhs)?) {
                Fold::Value(prim, value) => Some((prim, value)),
                Fold::DivisionByZero | Fold::Skip => None,
            },
            _ => None,
        }
    }

    /// Pads (or truncates) an array literal so each level matching a
    /// constant declared size has exactly that many elements.
    fn pad(&mut self, id: ExprId, ty: Type, sizes: &[Option<usize>], span: &Span) {
        let Some((&size, rest)) = sizes.split_first() else {
            return;
        };
        let Some(element_ty) = ty.element() else {
            return;
        };
        let mut elements = match &self.arena[id].kind {
            ExprKind::Array {
                elements,
                is_str: false,
                ..
            } => elements.clone(),
            _ => return,
        };

        if let Some(size) = size {
            if elements.len() > size {
                self.ctx.warning(
                    codes::TRUNCATED_INITIALIZER,
                    format!(
                        "Initializer has {} elements but the array holds {size}; the rest are dropped",
                        elements.len()
                    ),
                    self.arena[id].span.clone(),
                );
                elements.truncate(size);
            }
            while elements.len() < size {
                elements.push(self.zero(element_ty, span.clone()));
            }
        }
        for &element in &elements {
            self.pad(element, element_ty, rest, span);
        }
        if let ExprKind::Array { elements: slot, .. } = &mut self.arena[id].kind {
            *slot = elements;
        }
    }

    /// The default value of `ty` as a literal.
    fn zero(&mut self, ty: Type, span: Span) -> ExprId {
        if ty.is_primitive() {
            let value = match ty.prim {
                Primitive::Float => Number::Float(0.0),
                _ => Number::Int(0),
            };
            self.arena.numeric(ty.prim, value, span)
        } else {
            self.arena.alloc(
                ExprKind::Array {
                    elements: Vec::new(),
                    is_str: ty.is_str(),
                    ty: Some(ty),
                },
                span,
            )
        }
    }

    fn duplicate(&mut self, name: &str, span: Span, previous: Span) {
        let diagnostic = Diagnostic::error(
            codes::DUPLICATE_DEFINITION,
            format!("'{name}' is already defined"),
            span,
        )
        .with_related(previous, "Previously defined here");
        self.ctx.push(diagnostic);
    }

    fn assign(&mut self, assign: &mut Assign) -> Result<(), CompileError> {
        let Some(var) = self.ctx.scopes.lookup(&assign.name) else {
            return Err(CompileError::new(
                codes::UNDEFINED_VARIABLE,
                format!("Undefined variable '{}'", assign.name),
                assign.name_span.clone(),
            )
            .with_help("Declare it first with `name type = value;`"));
        };
        let (id, var_ty) = (var.id, var.ty);
        assign.id = Some(id);
        assign.var_ty = Some(var_ty);

        let mut ok = true;
        for &index in &assign.subscripts {
            ok &= self.expect_int(index, "Index")?;
        }
        for k in 0..assign.scratch.len() {
            self.ctx.scopes.scratch(k, assign.name_span.clone())?;
        }
        let depth = assign.subscripts.len() as u32;
        if var_ty.dim < depth {
            self.ctx.mismatch(
                format!(
                    "Cannot index {depth} level(s) into '{}' of type {var_ty}",
                    assign.name
                ),
                assign.name_span.clone(),
            );
            // Still check the value for independent errors.
            self.expr(assign.value)?;
            return Ok(());
        }
        let target = Type::array(var_ty.prim, var_ty.dim - depth);
        if ok {
            self.assigned_value(assign.value, target)
        } else {
            self.expr(assign.value).map(|_| ())
        }
    }

    fn function(&mut self, def: &mut FunctionDef) -> Result<(), CompileError> {
        let params: Vec<Type> = def.params.iter().map(|p| p.ty).collect();
        // Registered before the body is checked so the function can recurse.
        match self
            .ctx
            .functions
            .define(&def.name, &params, def.returns, def.name_span.clone())?
        {
            Some(id) => def.id = Some(id),
            None => self.ctx.error(
                codes::DUPLICATE_DEFINITION,
                format!(
                    "Function '{}' is already defined for these parameter types",
                    def.name
                ),
                def.name_span.clone(),
            ),
        }

        self.ctx.scopes.push_function(def.returns);
        let result = self.function_body(def);
        let slots = self.ctx.scopes.pop();
        result?;
        def.slots = slots.unwrap_or_default();
        tracing::debug!(name = %def.name, slots = ?def.slots, "Checked function");
        Ok(())
    }

    fn function_body(&mut self, def: &mut FunctionDef) -> Result<(), CompileError> {
        for param in &mut def.params {
            match self
                .ctx
                .scopes
                .declare(&param.name, param.ty, param.span.clone())?
            {
                Ok(id) => param.id = Some(id),
                Err(existing) => self.duplicate(&param.name, param.span.clone(), existing.span),
            }
        }
        self.stmts(&mut def.body)
    }

    fn ret(&mut self, ret: &Return, span: Span) -> Result<(), CompileError> {
        let Some(returns) = self.ctx.scopes.function_returns() else {
            return Err(CompileError::internal(
                "return statement outside of a function",
                span,
            ));
        };
        match (returns, ret.value) {
            (None, None) => {}
            (None, Some(value)) => {
                self.expr(value)?;
                self.ctx.error(
                    codes::RETURN_MISMATCH,
                    "A void function cannot return a value",
                    self.arena[value].span.clone(),
                );
            }
            (Some(expected), None) => self.ctx.error(
                codes::RETURN_MISMATCH,
                format!("Expected a return value of type {expected}"),
                span,
            ),
            (Some(expected), Some(value)) => match self.expr_expecting(value, expected)? {
                Some(ty) if ty != expected => self.ctx.error(
                    codes::RETURN_MISMATCH,
                    format!("Expected a return value of type {expected}, found {ty}"),
                    self.arena[value].span.clone(),
                ),
                _ => {}
            },
        }
        Ok(())
    }
}
