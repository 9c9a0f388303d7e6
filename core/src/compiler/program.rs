use core::ops::Range;

use smallvec::SmallVec;

use crate::builtins::FIRST_USER_FUNCTION;
use crate::syntax::{FunctionId, VarId};

/// Generated code for one user function.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCode {
    pub id: FunctionId,
    pub name: String,
    /// Slots the arguments are bound to, in call order.
    pub params: SmallVec<[VarId; 4]>,
    /// Slots owned by the function's frame; saved and restored around calls.
    pub slots: Range<usize>,
    pub returns_value: bool,
    pub code: Vec<u8>,
}

/// A compiled program: top-level code plus the user function table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub code: Vec<u8>,
    /// User functions; entry `i` has id `FIRST_USER_FUNCTION + i`.
    pub functions: Vec<FunctionCode>,
    /// Size of the variable array.
    pub slots: usize,
}

impl Program {
    pub fn function(&self, id: FunctionId) -> Option<&FunctionCode> {
        let index = id.checked_sub(FIRST_USER_FUNCTION)?;
        self.functions.get(index as usize)
    }

    /// Total bytes of code, functions included.
    pub fn code_size(&self) -> usize {
        self.code.len() + self.functions.iter().map(|f| f.code.len()).sum::<usize>()
    }
}
