//! Constant folding over checked trees.
//!
//! Runs only on programs that checked without errors, so every node it
//! touches is well typed. Children are optimized first; a folded node is
//! replaced by a fresh literal and the parent's child id is overwritten.

mod fold;
mod statements;

pub use fold::{Fold, fold_binary, fold_unary};
pub use statements::optimize_program;

use crate::analyzer::{CompilationContext, CompileError, codes};
use crate::syntax::{BinaryOp, ExprArena, ExprId, ExprKind, Number, Span, UnaryOp};
use crate::types::{Primitive, Type};

/// Optimizes the expression rooted at `id`, returning the id of its
/// replacement (possibly `id` itself).
pub fn optimize(
    arena: &mut ExprArena,
    id: ExprId,
    ctx: &mut CompilationContext,
) -> Result<ExprId, CompileError> {
    Optimizer::new(arena, ctx).expr(id)
}

pub struct Optimizer<'a> {
    arena: &'a mut ExprArena,
    ctx: &'a mut CompilationContext,
    folds: usize,
}

impl<'a> Optimizer<'a> {
    pub fn new(arena: &'a mut ExprArena, ctx: &'a mut CompilationContext) -> Self {
        Optimizer {
            arena,
            ctx,
            folds: 0,
        }
    }

    /// Number of nodes replaced so far.
    pub fn folds(&self) -> usize {
        self.folds
    }

    pub fn expr(&mut self, id: ExprId) -> Result<ExprId, CompileError> {
        let span = self.arena[id].span.clone();
        match &self.arena[id].kind {
            ExprKind::Numeric { .. } | ExprKind::Variable { .. } => Ok(id),
            ExprKind::Array { elements, .. } => {
                let elements = elements.clone();
                let elements = self.all(elements)?;
                if let ExprKind::Array { elements: slot, .. } = &mut self.arena[id].kind {
                    *slot = elements;
                }
                Ok(id)
            }
            ExprKind::Allocate { sizes, .. } => {
                let sizes = sizes.clone();
                let sizes = self.all(sizes)?;
                if let ExprKind::Allocate { sizes: slot, .. } = &mut self.arena[id].kind {
                    *slot = sizes;
                }
                Ok(id)
            }
            ExprKind::Call { args, .. } => {
                let args = args.clone();
                let args = self.all(args)?;
                if let ExprKind::Call { args: slot, .. } = &mut self.arena[id].kind {
                    *slot = args;
                }
                Ok(id)
            }
            ExprKind::Unary { op, operand, .. } => {
                let (op, operand) = (*op, *operand);
                self.unary(id, op, operand, span)
            }
            ExprKind::Binary { op, lhs, rhs, .. } => {
                let (op, lhs, rhs) = (*op, *lhs, *rhs);
                self.binary(id, op, lhs, rhs, span)
            }
        }
    }

    fn all(&mut self, ids: Vec<ExprId>) -> Result<Vec<ExprId>, CompileError> {
        ids.into_iter().map(|id| self.expr(id)).collect()
    }

    fn literal(&mut self, prim: Primitive, value: Number, span: Span) -> ExprId {
        self.folds += 1;
        self.arena.numeric(prim, value, span)
    }

    fn unary(
        &mut self,
        id: ExprId,
        op: UnaryOp,
        operand: Option<ExprId>,
        span: Span,
    ) -> Result<ExprId, CompileError> {
        let Some(operand) = operand else {
            return Ok(id);
        };
        let operand = self.expr(operand)?;
        if let ExprKind::Unary { operand: slot, .. } = &mut self.arena[id].kind {
            *slot = Some(operand);
        }
        match self.arena[operand]
            .as_number()
            .and_then(|(prim, value)| fold_unary(op, prim, value))
        {
            Some((prim, value)) => Ok(self.literal(prim, value, span)),
            None => Ok(id),
        }
    }

    fn binary(
        &mut self,
        id: ExprId,
        op: BinaryOp,
        lhs: Option<ExprId>,
        rhs: Option<ExprId>,
        span: Span,
    ) -> Result<ExprId, CompileError> {
        let (Some(lhs), Some(rhs)) = (lhs, rhs) else {
            return Ok(id);
        };
        let lhs = self.expr(lhs)?;
        let rhs = self.expr(rhs)?;
        if let ExprKind::Binary {
            lhs: lhs_slot,
            rhs: rhs_slot,
            ..
        } = &mut self.arena[id].kind
        {
            *lhs_slot = Some(lhs);
            *rhs_slot = Some(rhs);
        }

        match op {
            BinaryOp::Add => {
                if let Some(joined) = self.concat(lhs, rhs, span.clone()) {
                    return Ok(joined);
                }
            }
            BinaryOp::Subscript => return self.subscript(id, lhs, rhs),
            _ => {}
        }

        let (Some(l), Some(r)) = (self.arena[lhs].as_number(), self.arena[rhs].as_number()) else {
            return Ok(id);
        };
        match fold_binary(op, l, r) {
            Fold::Value(prim, value) => Ok(self.literal(prim, value, span)),
            Fold::DivisionByZero => {
                self.ctx.warning(
                    codes::DIVISION_BY_ZERO,
                    "Division by zero; this will fail at runtime",
                    span,
                );
                Ok(id)
            }
            Fold::Skip => Ok(id),
        }
    }

    fn string_literal(&self, id: ExprId) -> Option<&[ExprId]> {
        match &self.arena[id].kind {
            ExprKind::Array {
                elements,
                is_str,
                ty,
            } if *is_str || *ty == Some(Type::STR) => Some(elements),
            _ => None,
        }
    }

    fn concat(&mut self, lhs: ExprId, rhs: ExprId, span: Span) -> Option<ExprId> {
        let mut joined = self.string_literal(lhs)?.to_vec();
        joined.extend_from_slice(self.string_literal(rhs)?);
        self.folds += 1;
        Some(self.arena.alloc(
            ExprKind::Array {
                elements: joined,
                is_str: true,
                ty: Some(Type::STR),
            },
            span,
        ))
    }

    fn subscript(
        &mut self,
        id: ExprId,
        index: ExprId,
        container: ExprId,
    ) -> Result<ExprId, CompileError> {
        let Some((_, Number::Int(index))) = self.arena[index].as_number() else {
            return Ok(id);
        };
        let node = &self.arena[container];
        let ExprKind::Array { elements, .. } = &node.kind else {
            return Ok(id);
        };
        let element = usize::try_from(index)
            .ok()
            .and_then(|i| elements.get(i))
            .copied();
        let Some(element) = element else {
            return Err(CompileError::new(
                codes::INDEX_OUT_OF_BOUNDS,
                format!(
                    "Index {index} is out of bounds for an array of length {}",
                    elements.len()
                ),
                node.span.first_byte(),
            ));
        };
        if !elements.iter().all(|&e| self.is_pure(e)) {
            return Ok(id);
        }
        self.folds += 1;
        Ok(element)
    }

    /// True when evaluating `id` can neither fault nor have side effects,
    /// so dropping it is unobservable.
    fn is_pure(&self, id: ExprId) -> bool {
        match &self.arena[id].kind {
            ExprKind::Numeric { .. } | ExprKind::Variable { .. } => true,
            ExprKind::Array { elements, .. } => elements.iter().all(|&e| self.is_pure(e)),
            ExprKind::Unary { operand, .. } => operand.is_some_and(|e| self.is_pure(e)),
            ExprKind::Binary { op, lhs, rhs, .. } => {
                !matches!(op, BinaryOp::Div | BinaryOp::Mod | BinaryOp::Subscript)
                    && lhs.is_some_and(|e| self.is_pure(e))
                    && rhs.is_some_and(|e| self.is_pure(e))
            }
            ExprKind::Allocate { .. } | ExprKind::Call { .. } => false,
        }
    }
}
