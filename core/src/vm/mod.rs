//! Stack-based bytecode interpreter.

mod builtins;
mod error;
mod value;
mod vm;

pub use error::RuntimeError;
pub use value::Value;
pub use vm::{DEFAULT_MAX_CALL_DEPTH, MAX_FILL_ELEMENTS, Vm};
