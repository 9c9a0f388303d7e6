use super::expr::{ExprArena, ExprId};
use super::span::Span;
use super::{FunctionId, VarId};
use crate::types::Type;

/// A parsed program: every statement plus the arena holding its expressions.
#[derive(Debug, Clone, Default)]
pub struct Ast {
    pub arena: ExprArena,
    pub stmts: Vec<Stmt>,
}

#[derive(Debug, Clone)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum StmtKind {
    VarInit(VarInit),
    Assign(Assign),
    If(If),
    While(While),
    For(For),
    Function(FunctionDef),
    Return(Return),
    /// A call evaluated for its effect. The expression is always a `Call`.
    Call(ExprId),
}

/// `name T[n]... = value;`
#[derive(Debug, Clone)]
pub struct VarInit {
    pub name: String,
    pub name_span: Span,
    /// Declared type including one dimension per entry of `sizes`.
    pub ty: Type,
    /// `None` for an unsized `[]`.
    pub sizes: Vec<Option<ExprId>>,
    pub value: Option<ExprId>,
    pub id: Option<VarId>,
}

/// `name[i]... = value;` with compound operators already folded into `value`.
#[derive(Debug, Clone)]
pub struct Assign {
    pub name: String,
    pub name_span: Span,
    pub subscripts: Vec<ExprId>,
    pub value: ExprId,
    /// For a compound assignment through subscripts: one variable node per
    /// subscript, named by [`scratch_name`]. `value` reads the target
    /// through these, so each index is evaluated once and stored first.
    pub scratch: Vec<ExprId>,
    pub id: Option<VarId>,
    /// Type of the variable itself, recorded by the checker.
    pub var_ty: Option<Type>,
}

/// Name of the `k`th scratch slot of a scope. Not a valid identifier.
pub fn scratch_name(k: usize) -> String {
    format!("[{k}]")
}

#[derive(Debug, Clone)]
pub struct If {
    pub branches: Vec<Branch>,
}

/// One arm of an if/elif/else chain. `cond` is `None` for `else`.
#[derive(Debug, Clone)]
pub struct Branch {
    pub cond: Option<ExprId>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct While {
    pub cond: ExprId,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone)]
pub struct For {
    pub init: Box<Stmt>,
    pub cond: ExprId,
    pub step: Box<Stmt>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub ty: Type,
    pub span: Span,
    pub id: Option<VarId>,
}

#[derive(Debug, Clone)]
pub struct FunctionDef {
    pub name: String,
    pub name_span: Span,
    pub params: Vec<Param>,
    /// `None` for `void`.
    pub returns: Option<Type>,
    pub body: Vec<Stmt>,
    pub id: Option<FunctionId>,
    /// Variable slots owned by this function's frame, `start..end`.
    pub slots: core::ops::Range<usize>,
}

#[derive(Debug, Clone)]
pub struct Return {
    pub value: Option<ExprId>,
}
