//! Syntax tree: spans, operators, expression arena and statements.

mod builder;
pub mod expr;
pub mod ops;
pub mod span;
pub mod stmt;

pub use expr::{ExprArena, ExprId, ExprKind, ExprNode, Number};
pub use ops::{BinaryOp, UnaryOp};
pub use span::Span;
pub use stmt::{
    Assign, Ast, Branch, For, FunctionDef, If, Param, Return, Stmt, StmtKind, VarInit, While,
    scratch_name,
};

/// Slot in the VM's flat variable array.
pub type VarId = u8;

/// Index into the function table. Built-ins occupy the lowest ids.
pub type FunctionId = u8;
