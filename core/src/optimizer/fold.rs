//! Arithmetic on literal operands.

use crate::syntax::{BinaryOp, Number, UnaryOp};
use crate::types::{Primitive, Type};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fold {
    Value(Primitive, Number),
    /// Integer division or modulo by a literal zero. Left for the VM to fault on.
    DivisionByZero,
    /// The operands cannot be combined at compile time.
    Skip,
}

pub fn fold_unary(op: UnaryOp, prim: Primitive, value: Number) -> Option<(Primitive, Number)> {
    let value = match (op, value) {
        (UnaryOp::Negate, Number::Int(i)) => Number::Int(i.wrapping_neg()),
        (UnaryOp::Negate, Number::Float(f)) => Number::Float(-f),
        (UnaryOp::Not, Number::Int(i)) => Number::Int((i == 0) as i64),
        (UnaryOp::Not, Number::Float(_)) => return None,
    };
    Some((prim, value))
}

pub fn fold_binary(
    op: BinaryOp,
    (lhs_prim, lhs): (Primitive, Number),
    (rhs_prim, rhs): (Primitive, Number),
) -> Fold {
    let float = lhs_prim == Primitive::Float || rhs_prim == Primitive::Float;

    if op.is_comparison() {
        let result = if float {
            compare(op, lhs.as_f64(), rhs.as_f64())
        } else {
            compare(op, lhs.as_i64(), rhs.as_i64())
        };
        return Fold::Value(Primitive::Bool, Number::Int(result as i64));
    }

    match op {
        BinaryOp::And => bool_value(lhs.as_i64() != 0 && rhs.as_i64() != 0),
        BinaryOp::Or => bool_value(lhs.as_i64() != 0 || rhs.as_i64() != 0),
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div if float => {
            let (a, b) = (lhs.as_f64(), rhs.as_f64());
            let value = match op {
                BinaryOp::Add => a + b,
                BinaryOp::Sub => a - b,
                BinaryOp::Mul => a * b,
                _ => a / b,
            };
            Fold::Value(Primitive::Float, Number::Float(value))
        }
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => {
            let Some(ty) = Type::promote(Type::scalar(lhs_prim), Type::scalar(rhs_prim)) else {
                return Fold::Skip;
            };
            let (a, b) = (lhs.as_i64(), rhs.as_i64());
            let value = match op {
                BinaryOp::Add => a.wrapping_add(b),
                BinaryOp::Sub => a.wrapping_sub(b),
                BinaryOp::Mul => a.wrapping_mul(b),
                _ if b == 0 => return Fold::DivisionByZero,
                BinaryOp::Div => a.wrapping_div(b),
                _ => a.wrapping_rem(b),
            };
            Fold::Value(ty.prim, Number::Int(value))
        }
        _ => Fold::Skip,
    }
}

fn bool_value(value: bool) -> Fold {
    Fold::Value(Primitive::Bool, Number::Int(value as i64))
}

fn compare<T: PartialOrd>(op: BinaryOp, a: T, b: T) -> bool {
    match op {
        BinaryOp::Lt => a < b,
        BinaryOp::Le => a <= b,
        BinaryOp::Gt => a > b,
        BinaryOp::Ge => a >= b,
        BinaryOp::Eq => a == b,
        _ => a != b,
    }
}
