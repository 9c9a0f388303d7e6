//! Static types.
//!
//! A type is a primitive crossed with an array dimension. Strings are not a
//! separate primitive: `str` is a one-dimensional `char` array, and the
//! string-specific operators (concatenation, lexicographic comparison,
//! character indexing) are selected by recognising that shape.

use core::fmt;

/// Scalar building blocks of every type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Bool,
    Char,
    Int,
    Float,
}

impl Primitive {
    pub fn name(self) -> &'static str {
        match self {
            Primitive::Bool => "bool",
            Primitive::Char => "char",
            Primitive::Int => "int",
            Primitive::Float => "float",
        }
    }

    /// Char, Int and Float take part in arithmetic; Bool does not.
    pub fn is_numeric(self) -> bool {
        !matches!(self, Primitive::Bool)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Type {
    pub prim: Primitive,
    pub dim: u32,
}

impl Type {
    pub const BOOL: Type = Type::scalar(Primitive::Bool);
    pub const CHAR: Type = Type::scalar(Primitive::Char);
    pub const INT: Type = Type::scalar(Primitive::Int);
    pub const FLOAT: Type = Type::scalar(Primitive::Float);
    pub const STR: Type = Type::array(Primitive::Char, 1);

    pub const fn scalar(prim: Primitive) -> Self {
        Type { prim, dim: 0 }
    }

    pub const fn array(prim: Primitive, dim: u32) -> Self {
        Type { prim, dim }
    }

    pub fn is_primitive(&self) -> bool {
        self.dim == 0
    }

    pub fn is_array(&self) -> bool {
        self.dim > 0
    }

    pub fn is_str(&self) -> bool {
        self.prim == Primitive::Char && self.dim == 1
    }

    pub fn is_numeric(&self) -> bool {
        self.is_primitive() && self.prim.is_numeric()
    }

    pub fn is_float(&self) -> bool {
        *self == Type::FLOAT
    }

    /// Type of one element of this array, or `None` for scalars.
    pub fn element(&self) -> Option<Type> {
        (self.dim > 0).then(|| Type::array(self.prim, self.dim - 1))
    }

    /// This type wrapped in `extra` more array dimensions.
    pub fn nested(&self, extra: u32) -> Type {
        Type::array(self.prim, self.dim + extra)
    }

    /// Result of an arithmetic operator over two numeric scalars.
    ///
    /// Float wins over Int, and Int wins over Char.
    pub fn promote(lhs: Type, rhs: Type) -> Option<Type> {
        if !lhs.is_numeric() || !rhs.is_numeric() {
            return None;
        }
        let prim = match (lhs.prim, rhs.prim) {
            (Primitive::Float, _) | (_, Primitive::Float) => Primitive::Float,
            (Primitive::Int, _) | (_, Primitive::Int) => Primitive::Int,
            _ => Primitive::Char,
        };
        Some(Type::scalar(prim))
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.prim == Primitive::Char && self.dim >= 1 {
            f.write_str("str")?;
            for _ in 1..self.dim {
                f.write_str("[]")?;
            }
            return Ok(());
        }
        f.write_str(self.prim.name())?;
        for _ in 0..self.dim {
            f.write_str("[]")?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
