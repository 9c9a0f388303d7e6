//! Bytecode: opcodes, literal encoding, generation and disassembly.

mod bytecode;
mod disasm;
mod encode;
mod opcode;
mod program;

pub use bytecode::{BytecodeGenerator, generate, generate_program};
pub use disasm::{disassemble, disassemble_code};
pub use encode::{Cursor, DecodeError, Literal, encode_float, encode_int, encode_uint, uint_len};
pub use opcode::{FillKind, Opcode};
pub use program::{FunctionCode, Program};
