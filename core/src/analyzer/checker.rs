//! Expression type checking.
//!
//! Every check returns `Ok(Some(ty))` on success, `Ok(None)` when a
//! recoverable error was recorded for the subtree, and `Err` for a fatal
//! error. `None` is never reported twice: callers propagate it silently.

use super::context::CompilationContext;
use super::error::{CompileError, codes};
use crate::syntax::{BinaryOp, ExprArena, ExprId, ExprKind, Span, UnaryOp};
use crate::types::Type;

pub type CheckResult = Result<Option<Type>, CompileError>;

/// A call after overload resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolved {
    /// An error was already reported for the call or its arguments.
    Failed,
    Void,
    Value(Type),
}

/// Type checks the expression rooted at `id`.
pub fn type_check(arena: &mut ExprArena, id: ExprId, ctx: &mut CompilationContext) -> CheckResult {
    Checker { arena, ctx }.expr(id)
}

pub struct Checker<'a> {
    pub arena: &'a mut ExprArena,
    pub ctx: &'a mut CompilationContext,
}

impl Checker<'_> {
    pub fn expr(&mut self, id: ExprId) -> CheckResult {
        let span = self.arena[id].span.clone();
        match &self.arena[id].kind {
            ExprKind::Numeric { prim, .. } => Ok(Some(Type::scalar(*prim))),
            ExprKind::Array { .. } => self.array(id, None),
            ExprKind::Variable { name, .. } => {
                let name = name.clone();
                self.variable(id, &name, span)
            }
            ExprKind::Allocate { elem, sizes } => {
                let (elem, sizes) = (*elem, sizes.clone());
                self.allocate(elem, &sizes)
            }
            ExprKind::Unary { op, operand, .. } => {
                let (op, operand) = (*op, *operand);
                self.unary(id, op, operand, span)
            }
            ExprKind::Binary { op, lhs, rhs, .. } => {
                let (op, lhs, rhs) = (*op, *lhs, *rhs);
                self.binary(id, op, lhs, rhs, span)
            }
            ExprKind::Call { .. } => self.call_value(id),
        }
    }

    /// Like [`Checker::expr`], but an empty array literal takes `expected`
    /// as its type.
    pub fn expr_expecting(&mut self, id: ExprId, expected: Type) -> CheckResult {
        match self.arena[id].kind {
            ExprKind::Array { .. } => self.array(id, Some(expected)),
            _ => self.expr(id),
        }
    }

    fn array(&mut self, id: ExprId, expected: Option<Type>) -> CheckResult {
        let (elements, is_str) = match &self.arena[id].kind {
            ExprKind::Array {
                elements, is_str, ..
            } => (elements.clone(), *is_str),
            _ => return Err(CompileError::internal("expected array literal", Span::default())),
        };

        let ty = if is_str {
            Some(Type::STR)
        } else if elements.is_empty() {
            match expected {
                Some(expected) if expected.is_array() => Some(expected),
                _ => {
                    self.ctx.mismatch(
                        "Cannot infer the type of an empty array literal",
                        self.arena[id].span.clone(),
                    );
                    None
                }
            }
        } else {
            let element_expected = expected.and_then(|t| t.element());
            let mut element_ty: Option<Type> = None;
            let mut failed = false;
            for &element in &elements {
                let ty = match element_expected {
                    Some(expected) => self.expr_expecting(element, expected)?,
                    None => self.expr(element)?,
                };
                match (ty, element_ty) {
                    (None, _) => failed = true,
                    (Some(ty), None) => element_ty = Some(ty),
                    (Some(ty), Some(first)) if ty != first => {
                        self.ctx.mismatch(
                            format!(
                                "Array elements must all have the same type: expected {first}, found {ty}"
                            ),
                            self.arena[element].span.clone(),
                        );
                        failed = true;
                    }
                    _ => {}
                }
            }
            if failed {
                None
            } else {
                element_ty.map(|t| t.nested(1))
            }
        };

        if let ExprKind::Array { ty: slot, .. } = &mut self.arena[id].kind {
            *slot = ty;
        }
        Ok(ty)
    }

    fn variable(&mut self, id: ExprId, name: &str, span: Span) -> CheckResult {
        let Some(var) = self.ctx.scopes.lookup(name) else {
            return Err(CompileError::new(
                codes::UNDEFINED_VARIABLE,
                format!("Undefined variable '{name}'"),
                span,
            )
            .with_help("Make sure the variable is declared before use"));
        };
        let (var_id, ty) = (var.id, var.ty);
        if let ExprKind::Variable { id: slot, .. } = &mut self.arena[id].kind {
            *slot = Some(var_id);
        }
        Ok(Some(ty))
    }

    fn allocate(&mut self, elem: Type, sizes: &[ExprId]) -> CheckResult {
        let mut ok = true;
        for &size in sizes {
            ok &= self.expect_int(size, "Array size")?;
        }
        Ok(ok.then(|| elem.nested(sizes.len() as u32)))
    }

    /// Checks that `id` is an Int, reporting otherwise. Returns whether it is.
    pub(crate) fn expect_int(&mut self, id: ExprId, what: &str) -> Result<bool, CompileError> {
        match self.expr(id)? {
            Some(Type::INT) => Ok(true),
            Some(ty) => {
                self.ctx.mismatch(
                    format!("{what} must be int, found {ty}"),
                    self.arena[id].span.clone(),
                );
                Ok(false)
            }
            None => Ok(false),
        }
    }

    fn unary(
        &mut self,
        id: ExprId,
        op: UnaryOp,
        operand: Option<ExprId>,
        span: Span,
    ) -> CheckResult {
        let Some(operand) = operand else {
            return Err(CompileError::internal("unary operator without operand", span));
        };
        let Some(ty) = self.expr(operand)? else {
            return Ok(None);
        };
        if let ExprKind::Unary { operand_ty, .. } = &mut self.arena[id].kind {
            *operand_ty = Some(ty);
        }

        let ok = match op {
            UnaryOp::Negate => ty == Type::INT || ty == Type::FLOAT,
            UnaryOp::Not => ty == Type::BOOL,
        };
        if ok {
            Ok(Some(ty))
        } else {
            let expected = match op {
                UnaryOp::Negate => "int or float",
                UnaryOp::Not => "bool",
            };
            self.ctx.mismatch(
                format!("Unary operator '{op}' expects {expected}, found {ty}"),
                self.arena[operand].span.clone(),
            );
            Ok(None)
        }
    }

    fn binary(
        &mut self,
        id: ExprId,
        op: BinaryOp,
        lhs: Option<ExprId>,
        rhs: Option<ExprId>,
        span: Span,
    ) -> CheckResult {
        let (Some(lhs), Some(rhs)) = (lhs, rhs) else {
            return Err(CompileError::internal("binary operator without operands", span));
        };
        // Check both sides even if the first fails, so independent errors
        // are all reported.
        let lhs_ty = self.expr(lhs)?;
        let rhs_ty = self.expr(rhs)?;
        if let ExprKind::Binary {
            lhs_ty: l, rhs_ty: r, ..
        } = &mut self.arena[id].kind
        {
            *l = lhs_ty;
            *r = rhs_ty;
        }
        let (Some(l), Some(r)) = (lhs_ty, rhs_ty) else {
            return Ok(None);
        };

        let result = match op {
            BinaryOp::Subscript => return self.subscript(lhs, l, rhs, r),
            BinaryOp::Add if l.is_str() && r.is_str() => Some(Type::STR),
            op if op.is_arithmetic() => Type::promote(l, r),
            BinaryOp::Mod => (l == Type::INT && r == Type::INT).then_some(Type::INT),
            op if op.is_comparison() => {
                let comparable = (l.is_str() && r.is_str())
                    || Type::promote(l, r).is_some()
                    || (l == Type::BOOL
                        && r == Type::BOOL
                        && matches!(op, BinaryOp::Eq | BinaryOp::Ne));
                comparable.then_some(Type::BOOL)
            }
            _ => (l == Type::BOOL && r == Type::BOOL).then_some(Type::BOOL),
        };

        if result.is_none() {
            self.ctx.mismatch(
                format!("Operator '{op}' cannot be applied to {l} and {r}"),
                span,
            );
        }
        Ok(result)
    }

    fn subscript(&mut self, index: ExprId, index_ty: Type, container: ExprId, ty: Type) -> CheckResult {
        let mut ok = true;
        if index_ty != Type::INT {
            self.ctx.mismatch(
                format!("Index must be int, found {index_ty}"),
                self.arena[index].span.clone(),
            );
            ok = false;
        }
        let element = ty.element();
        if element.is_none() {
            self.ctx.mismatch(
                format!("Cannot index into a value of type {ty}"),
                self.arena[container].span.clone(),
            );
        }
        Ok(element.filter(|_| ok))
    }

    /// A call whose result is used. A `void` function is an error here.
    fn call_value(&mut self, id: ExprId) -> CheckResult {
        match self.call(id)? {
            Resolved::Value(ty) => Ok(Some(ty)),
            Resolved::Failed => Ok(None),
            Resolved::Void => {
                let node = &self.arena[id];
                let name = match &node.kind {
                    ExprKind::Call { name, .. } => name.clone(),
                    _ => String::new(),
                };
                let span = node.span.clone();
                self.ctx.error(
                    codes::VOID_VALUE,
                    format!("Function '{name}' does not return a value"),
                    span,
                );
                Ok(None)
            }
        }
    }

    /// Resolves a call against the function table.
    pub fn call(&mut self, id: ExprId) -> Result<Resolved, CompileError> {
        let span = self.arena[id].span.clone();
        let (name, args) = match &self.arena[id].kind {
            ExprKind::Call { name, args, .. } => (name.clone(), args.clone()),
            _ => return Err(CompileError::internal("expected call", span)),
        };

        let overloads = self.ctx.functions.overloads(&name);
        if overloads.is_empty() {
            return Err(CompileError::new(
                codes::UNDEFINED_FUNCTION,
                format!("Undefined function '{name}'"),
                span,
            ));
        }
        if !overloads.iter().any(|sig| sig.params.len() == args.len()) {
            let mut arities: Vec<usize> = overloads.iter().map(|sig| sig.params.len()).collect();
            arities.sort_unstable();
            arities.dedup();
            let expected = arities
                .iter()
                .map(|n| n.to_string())
                .collect::<Vec<_>>()
                .join(" or ");
            return Err(CompileError::new(
                codes::WRONG_ARITY,
                format!(
                    "Function '{name}' takes {expected} argument(s), but {} were given",
                    args.len()
                ),
                span,
            ));
        }

        let mut arg_types = Vec::with_capacity(args.len());
        let mut failed = false;
        for &arg in &args {
            match self.expr(arg)? {
                Some(ty) => arg_types.push(ty),
                None => failed = true,
            }
        }
        if failed {
            return Ok(Resolved::Failed);
        }

        let Some(sig) = self.ctx.functions.find(&name, &arg_types) else {
            let found = arg_types
                .iter()
                .map(|t| t.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            self.ctx.mismatch(
                format!("No overload of '{name}' accepts arguments ({found})"),
                span,
            );
            return Ok(Resolved::Failed);
        };
        let (func_id, returns) = (sig.id, sig.returns);
        if let ExprKind::Call {
            id: slot,
            returns: ret,
            ..
        } = &mut self.arena[id].kind
        {
            *slot = Some(func_id);
            *ret = returns;
        }

        Ok(returns.map_or(Resolved::Void, Resolved::Value))
    }
}
