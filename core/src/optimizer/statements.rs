use super::Optimizer;
use crate::analyzer::{CompilationContext, CompileError, codes};
use crate::syntax::{Ast, ExprId, Number, Span, Stmt, StmtKind, VarInit};
use crate::types::Primitive;

/// Folds every expression in the program and drops statements whose
/// condition is constantly false.
pub fn optimize_program(ast: &mut Ast, ctx: &mut CompilationContext) -> Result<(), CompileError> {
    let Ast { arena, stmts } = ast;
    let mut optimizer = Optimizer::new(arena, ctx);
    optimizer.stmts(stmts)?;
    tracing::debug!(
        folds = optimizer.folds(),
        statements = stmts.len(),
        "Optimized program"
    );
    Ok(())
}

impl Optimizer<'_> {
    pub fn stmts(&mut self, stmts: &mut Vec<Stmt>) -> Result<(), CompileError> {
        let mut kept = Vec::with_capacity(stmts.len());
        for mut stmt in core::mem::take(stmts) {
            if self.stmt(&mut stmt)? {
                kept.push(stmt);
            }
        }
        *stmts = kept;
        Ok(())
    }

    /// Returns `false` when the statement can never run and should be dropped.
    pub fn stmt(&mut self, stmt: &mut Stmt) -> Result<bool, CompileError> {
        match &mut stmt.kind {
            StmtKind::VarInit(init) => self.var_init(init)?,
            StmtKind::Assign(assign) => {
                for index in &mut assign.subscripts {
                    *index = self.expr(*index)?;
                }
                assign.value = self.expr(assign.value)?;
            }
            StmtKind::If(chain) => {
                let mut kept = Vec::with_capacity(chain.branches.len());
                for mut branch in core::mem::take(&mut chain.branches) {
                    if let Some(cond) = branch.cond {
                        let cond = self.expr(cond)?;
                        branch.cond = Some(cond);
                        if self.is_false(cond) {
                            self.ctx.warning(
                                codes::FALSE_CONDITIONAL,
                                "False conditional: this branch is never taken",
                                branch.span.clone(),
                            );
                            continue;
                        }
                    }
                    self.stmts(&mut branch.body)?;
                    kept.push(branch);
                }
                if kept.is_empty() {
                    return Ok(false);
                }
                chain.branches = kept;
            }
            StmtKind::While(w) => {
                w.cond = self.expr(w.cond)?;
                if self.is_false(w.cond) {
                    self.false_loop(stmt.span.clone());
                    return Ok(false);
                }
                self.stmts(&mut w.body)?;
            }
            StmtKind::For(f) => {
                self.stmt(&mut f.init)?;
                f.cond = self.expr(f.cond)?;
                if self.is_false(f.cond) {
                    self.false_loop(stmt.span.clone());
                    // The initializer still runs once.
                    let init = (*f.init).clone();
                    *stmt = init;
                    return Ok(true);
                }
                self.stmt(&mut f.step)?;
                self.stmts(&mut f.body)?;
            }
            StmtKind::Function(def) => self.stmts(&mut def.body)?,
            StmtKind::Return(ret) => {
                if let Some(value) = ret.value {
                    ret.value = Some(self.expr(value)?);
                }
            }
            StmtKind::Call(call) => *call = self.expr(*call)?,
        }
        Ok(true)
    }

    fn is_false(&self, cond: ExprId) -> bool {
        matches!(
            self.arena[cond].as_number(),
            Some((Primitive::Bool, Number::Int(0)))
        )
    }

    fn false_loop(&mut self, span: Span) {
        self.ctx.warning(
            codes::FALSE_LOOP,
            "False loop: the body never runs",
            span,
        );
    }

    fn var_init(&mut self, init: &mut VarInit) -> Result<(), CompileError> {
        for size in init.sizes.iter_mut().flatten() {
            *size = self.expr(*size)?;
        }
        if let Some(value) = init.value {
            init.value = Some(self.expr(value)?);
        }
        Ok(())
    }
}
