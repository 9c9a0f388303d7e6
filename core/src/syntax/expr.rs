//! Expression nodes stored in an index-addressed arena.

use core::fmt::Write as _;
use core::ops::{Index, IndexMut};

use super::ops::{BinaryOp, UnaryOp, precedence};
use super::span::Span;
use super::{FunctionId, VarId};
use crate::types::{Primitive, Type};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExprId(u32);

impl ExprId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Payload of a numeric literal. Bool and Char literals are stored as `Int`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    pub fn as_i64(self) -> i64 {
        match self {
            Number::Int(i) => i,
            Number::Float(f) => f as i64,
        }
    }
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    Numeric {
        prim: Primitive,
        value: Number,
    },
    /// Array literal. String literals are arrays of Char literals with
    /// `is_str` set.
    Array {
        elements: Vec<ExprId>,
        is_str: bool,
        ty: Option<Type>,
    },
    Variable {
        name: String,
        id: Option<VarId>,
    },
    /// `int[n][m]`: a zero-filled array of `elem` with one dimension per size.
    Allocate {
        elem: Type,
        sizes: Vec<ExprId>,
    },
    Unary {
        op: UnaryOp,
        operand: Option<ExprId>,
        operand_ty: Option<Type>,
    },
    /// For `Subscript`, `lhs` is the index and `rhs` is the container.
    Binary {
        op: BinaryOp,
        lhs: Option<ExprId>,
        rhs: Option<ExprId>,
        lhs_ty: Option<Type>,
        rhs_ty: Option<Type>,
    },
    Call {
        name: String,
        args: Vec<ExprId>,
        id: Option<FunctionId>,
        returns: Option<Type>,
    },
}

#[derive(Debug, Clone)]
pub struct ExprNode {
    pub kind: ExprKind,
    pub span: Span,
    pub precedence: u8,
    pub guarded: bool,
}

impl ExprNode {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        let precedence = match &kind {
            ExprKind::Unary { op, .. } => op.precedence(),
            ExprKind::Binary { op, .. } => op.precedence(),
            _ => precedence::SINGLE,
        };
        ExprNode {
            kind,
            span,
            precedence,
            guarded: false,
        }
    }

    /// Operators that still accept operands during tree building.
    pub fn is_operator(&self) -> bool {
        !self.guarded && matches!(self.kind, ExprKind::Unary { .. } | ExprKind::Binary { .. })
    }

    pub fn as_number(&self) -> Option<(Primitive, Number)> {
        match self.kind {
            ExprKind::Numeric { prim, value } => Some((prim, value)),
            _ => None,
        }
    }
}

/// Owns every expression node of one compilation unit.
#[derive(Debug, Clone, Default)]
pub struct ExprArena {
    nodes: Vec<ExprNode>,
}

impl ExprArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn alloc(&mut self, kind: ExprKind, span: Span) -> ExprId {
        let id = ExprId(self.nodes.len() as u32);
        self.nodes.push(ExprNode::new(kind, span));
        id
    }

    pub fn int(&mut self, value: i64, span: Span) -> ExprId {
        self.numeric(Primitive::Int, Number::Int(value), span)
    }

    pub fn float(&mut self, value: f64, span: Span) -> ExprId {
        self.numeric(Primitive::Float, Number::Float(value), span)
    }

    pub fn bool(&mut self, value: bool, span: Span) -> ExprId {
        self.numeric(Primitive::Bool, Number::Int(value as i64), span)
    }

    pub fn char(&mut self, value: u8, span: Span) -> ExprId {
        self.numeric(Primitive::Char, Number::Int(value as i64), span)
    }

    pub fn numeric(&mut self, prim: Primitive, value: Number, span: Span) -> ExprId {
        self.alloc(ExprKind::Numeric { prim, value }, span)
    }

    /// A string literal, one Char literal per byte.
    pub fn string(&mut self, text: &[u8], span: Span) -> ExprId {
        let elements = text.iter().map(|&b| self.char(b, span.clone())).collect();
        self.alloc(
            ExprKind::Array {
                elements,
                is_str: true,
                ty: None,
            },
            span,
        )
    }

    pub fn variable(&mut self, name: impl Into<String>, span: Span) -> ExprId {
        self.alloc(
            ExprKind::Variable {
                name: name.into(),
                id: None,
            },
            span,
        )
    }

    pub fn unary(&mut self, op: UnaryOp, span: Span) -> ExprId {
        self.alloc(
            ExprKind::Unary {
                op,
                operand: None,
                operand_ty: None,
            },
            span,
        )
    }

    pub fn binary(&mut self, op: BinaryOp, span: Span) -> ExprId {
        self.alloc(
            ExprKind::Binary {
                op,
                lhs: None,
                rhs: None,
                lhs_ty: None,
                rhs_ty: None,
            },
            span,
        )
    }

    /// A subscript waiting for its container; the index is already in place.
    pub fn subscript(&mut self, index: ExprId, span: Span) -> ExprId {
        self.alloc(
            ExprKind::Binary {
                op: BinaryOp::Subscript,
                lhs: Some(index),
                rhs: None,
                lhs_ty: None,
                rhs_ty: None,
            },
            span,
        )
    }

    /// Marks a bracketed sub-expression as opaque to later insertions.
    pub fn set_guard(&mut self, id: ExprId) {
        let node = &mut self[id];
        node.guarded = true;
        node.precedence = precedence::SINGLE;
    }

    /// Prints a tree as `OP(lhs, rhs)` with `_` for missing operands.
    pub fn render(&self, id: ExprId) -> String {
        let mut out = String::new();
        self.render_into(id, &mut out);
        out
    }

    fn render_opt(&self, id: Option<ExprId>, out: &mut String) {
        match id {
            Some(id) => self.render_into(id, out),
            None => out.push('_'),
        }
    }

    fn render_list(&self, ids: &[ExprId], out: &mut String) {
        for (i, &id) in ids.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            self.render_into(id, out);
        }
    }

    fn render_into(&self, id: ExprId, out: &mut String) {
        match &self[id].kind {
            ExprKind::Numeric { prim, value } => match (prim, value) {
                (Primitive::Bool, v) => out.push_str(if v.as_i64() != 0 { "true" } else { "false" }),
                (Primitive::Char, v) => {
                    let _ = write!(out, "{:?}", v.as_i64() as u8 as char);
                }
                (_, Number::Int(i)) => {
                    let _ = write!(out, "{i}");
                }
                (_, Number::Float(f)) => {
                    let _ = write!(out, "{f:?}");
                }
            },
            ExprKind::Array {
                elements, is_str, ..
            } => {
                if *is_str {
                    let text: String = elements
                        .iter()
                        .filter_map(|&e| self[e].as_number())
                        .map(|(_, v)| v.as_i64() as u8 as char)
                        .collect();
                    let _ = write!(out, "{text:?}");
                } else {
                    out.push('[');
                    self.render_list(elements, out);
                    out.push(']');
                }
            }
            ExprKind::Variable { name, .. } => out.push_str(name),
            ExprKind::Allocate { elem, sizes } => {
                let _ = write!(out, "{elem}");
                for &size in sizes {
                    out.push('[');
                    self.render_into(size, out);
                    out.push(']');
                }
            }
            ExprKind::Unary { op, operand, .. } => {
                out.push_str(op.name());
                out.push('(');
                self.render_opt(*operand, out);
                out.push(')');
            }
            ExprKind::Binary { op, lhs, rhs, .. } => {
                out.push_str(op.name());
                out.push('(');
                self.render_opt(*lhs, out);
                out.push_str(", ");
                self.render_opt(*rhs, out);
                out.push(')');
            }
            ExprKind::Call { name, args, .. } => {
                out.push_str(name);
                out.push('(');
                self.render_list(args, out);
                out.push(')');
            }
        }
    }
}

impl Index<ExprId> for ExprArena {
    type Output = ExprNode;

    fn index(&self, id: ExprId) -> &ExprNode {
        &self.nodes[id.index()]
    }
}

impl IndexMut<ExprId> for ExprArena {
    fn index_mut(&mut self, id: ExprId) -> &mut ExprNode {
        &mut self.nodes[id.index()]
    }
}
