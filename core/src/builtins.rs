//! Built-in functions and their fixed ids.
//!
//! The checker resolves calls against these signatures like any other
//! overload. The VM recognises them by id alone.

use crate::syntax::FunctionId;
use crate::types::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Builtin {
    PrintBool = 0,
    PrintChar = 1,
    PrintInt = 2,
    PrintFloat = 3,
    PrintStr = 4,
    Input = 5,
    CharFromInt = 6,
    IntFromStr = 7,
    IntFromChar = 8,
    StrFromInt = 9,
    StrFromFloat = 10,
    StrFromChar = 11,
    Len = 12,
}

/// First id available to user-defined functions.
pub const FIRST_USER_FUNCTION: FunctionId = 13;

impl Builtin {
    pub const ALL: [Builtin; 13] = [
        Builtin::PrintBool,
        Builtin::PrintChar,
        Builtin::PrintInt,
        Builtin::PrintFloat,
        Builtin::PrintStr,
        Builtin::Input,
        Builtin::CharFromInt,
        Builtin::IntFromStr,
        Builtin::IntFromChar,
        Builtin::StrFromInt,
        Builtin::StrFromFloat,
        Builtin::StrFromChar,
        Builtin::Len,
    ];

    pub fn from_id(id: FunctionId) -> Option<Self> {
        Self::ALL.get(id as usize).copied()
    }

    pub fn id(self) -> FunctionId {
        self as FunctionId
    }

    pub fn name(self) -> &'static str {
        use Builtin::*;
        match self {
            PrintBool | PrintChar | PrintInt | PrintFloat | PrintStr => "print",
            Input => "input",
            CharFromInt => "char",
            IntFromStr | IntFromChar => "int",
            StrFromInt | StrFromFloat | StrFromChar => "str",
            Len => "len",
        }
    }

    pub fn params(self) -> &'static [Type] {
        use Builtin::*;
        match self {
            PrintBool => &[Type::BOOL],
            PrintChar | IntFromChar | StrFromChar => &[Type::CHAR],
            PrintInt | CharFromInt | StrFromInt => &[Type::INT],
            PrintFloat | StrFromFloat => &[Type::FLOAT],
            PrintStr | IntFromStr | Len => &[Type::STR],
            Input => &[],
        }
    }

    pub fn returns(self) -> Option<Type> {
        use Builtin::*;
        match self {
            PrintBool | PrintChar | PrintInt | PrintFloat | PrintStr => None,
            Input | StrFromInt | StrFromFloat | StrFromChar => Some(Type::STR),
            CharFromInt => Some(Type::CHAR),
            IntFromStr | IntFromChar | Len => Some(Type::INT),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_dense() {
        for (i, builtin) in Builtin::ALL.iter().enumerate() {
            assert_eq!(builtin.id() as usize, i);
            assert_eq!(Builtin::from_id(i as u8), Some(*builtin));
        }
        assert_eq!(Builtin::ALL.len(), FIRST_USER_FUNCTION as usize);
        assert_eq!(Builtin::from_id(FIRST_USER_FUNCTION), None);
    }
}
