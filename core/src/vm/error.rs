use thiserror::Error;

use crate::compiler::DecodeError;

/// A fault raised while executing bytecode. Execution stops at the first.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("Operand stack underflow")]
    StackUnderflow,

    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Index {index} out of bounds for length {len}")]
    IndexOutOfBounds { index: i64, len: usize },

    #[error("Malformed bytecode: {0}")]
    Malformed(#[from] DecodeError),

    #[error("Unknown function id {0}")]
    UnknownFunction(u8),

    #[error("Unknown variable slot {0}")]
    UnknownVariable(u8),

    #[error("Cannot convert {value} to {target}")]
    InvalidConversion { value: String, target: &'static str },

    #[error("Maximum call depth of {0} exceeded")]
    CallDepthExceeded(usize),

    #[error("Function '{0}' ended without returning a value")]
    MissingReturnValue(String),

    #[error("{0}")]
    Io(String),

    #[error("Array size cannot be negative: {0}")]
    NegativeSize(i64),

    #[error("Allocation of {requested} elements exceeds the limit of {limit}")]
    AllocationTooLarge { requested: usize, limit: usize },
}

impl From<std::io::Error> for RuntimeError {
    fn from(err: std::io::Error) -> Self {
        RuntimeError::Io(err.to_string())
    }
}
