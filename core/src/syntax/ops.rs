//! Operators and their binding strength.

use core::fmt;

use hashbrown::HashMap;
use lazy_static::lazy_static;

/// Binding tiers. A higher value binds tighter.
pub mod precedence {
    pub const LOGICAL: u8 = 1;
    pub const EQUALITY: u8 = 2;
    pub const RELATIONAL: u8 = 3;
    pub const ADDITIVE: u8 = 4;
    pub const MULTIPLICATIVE: u8 = 5;
    pub const UNARY: u8 = 6;
    pub const SUBSCRIPT: u8 = 7;
    /// Values, calls and guarded sub-expressions.
    pub const SINGLE: u8 = 8;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Negate,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    And,
    Or,
    Subscript,
}

lazy_static! {
    static ref BINARY_OPS: HashMap<&'static str, BinaryOp> = {
        use BinaryOp::*;
        [
            ("+", Add),
            ("-", Sub),
            ("*", Mul),
            ("/", Div),
            ("%", Mod),
            ("<", Lt),
            ("<=", Le),
            (">", Gt),
            (">=", Ge),
            ("==", Eq),
            ("!=", Ne),
            ("&&", And),
            ("||", Or),
            ("[", Subscript),
        ]
        .into_iter()
        .collect()
    };
    static ref BINARY_PRECEDENCE: HashMap<BinaryOp, u8> = {
        use BinaryOp::*;
        use precedence::*;
        [
            (And, LOGICAL),
            (Or, LOGICAL),
            (Eq, EQUALITY),
            (Ne, EQUALITY),
            (Lt, RELATIONAL),
            (Le, RELATIONAL),
            (Gt, RELATIONAL),
            (Ge, RELATIONAL),
            (Add, ADDITIVE),
            (Sub, ADDITIVE),
            (Mul, MULTIPLICATIVE),
            (Div, MULTIPLICATIVE),
            (Mod, MULTIPLICATIVE),
            (Subscript, SUBSCRIPT),
        ]
        .into_iter()
        .collect()
    };
}

impl UnaryOp {
    pub fn from_spelling(spelling: &str) -> Option<Self> {
        match spelling {
            "-" => Some(UnaryOp::Negate),
            "!" => Some(UnaryOp::Not),
            _ => None,
        }
    }

    pub fn precedence(self) -> u8 {
        precedence::UNARY
    }

    pub fn name(self) -> &'static str {
        match self {
            UnaryOp::Negate => "NEGATE",
            UnaryOp::Not => "NOT",
        }
    }
}

impl BinaryOp {
    pub fn from_spelling(spelling: &str) -> Option<Self> {
        BINARY_OPS.get(spelling).copied()
    }

    pub fn precedence(self) -> u8 {
        BINARY_PRECEDENCE[&self]
    }

    pub fn spelling(self) -> &'static str {
        use BinaryOp::*;
        match self {
            Add => "+",
            Sub => "-",
            Mul => "*",
            Div => "/",
            Mod => "%",
            Lt => "<",
            Le => "<=",
            Gt => ">",
            Ge => ">=",
            Eq => "==",
            Ne => "!=",
            And => "&&",
            Or => "||",
            Subscript => "[]",
        }
    }

    /// Upper-case name used when printing trees.
    pub fn name(self) -> &'static str {
        use BinaryOp::*;
        match self {
            Add => "ADD",
            Sub => "SUB",
            Mul => "MULT",
            Div => "DIV",
            Mod => "MOD",
            Lt => "LESSER",
            Le => "LESSER_EQUALS",
            Gt => "GREATER",
            Ge => "GREATER_EQUALS",
            Eq => "EQUALS",
            Ne => "NOT_EQUALS",
            And => "AND",
            Or => "OR",
            Subscript => "SUBSCRIPT",
        }
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(self, BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div)
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge | BinaryOp::Eq | BinaryOp::Ne
        )
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UnaryOp::Negate => "-",
            UnaryOp::Not => "!",
        })
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.spelling())
    }
}
