//! Human-readable listing of generated bytecode.

use core::fmt::Write as _;

use super::encode::{Cursor, DecodeError, Literal};
use super::opcode::{FillKind, Opcode};
use super::program::Program;
use crate::builtins::Builtin;

/// Lists the top-level code followed by every user function.
pub fn disassemble(program: &Program) -> Result<String, DecodeError> {
    let mut out = String::new();
    let _ = writeln!(out, "main (slots: {}):", program.slots);
    disassemble_code(&program.code, program, &mut out)?;
    for function in &program.functions {
        let _ = writeln!(
            out,
            "\n{} #{} (params: {:?}, slots: {}..{}):",
            function.name,
            function.id,
            function.params.as_slice(),
            function.slots.start,
            function.slots.end
        );
        disassemble_code(&function.code, program, &mut out)?;
    }
    Ok(out)
}

/// One line per instruction: offset, mnemonic, operands.
pub fn disassemble_code(code: &[u8], program: &Program, out: &mut String) -> Result<(), DecodeError> {
    let mut cursor = Cursor::new(code);
    while !cursor.at_end() {
        let offset = cursor.pos();
        let op = cursor.read_opcode()?;
        let _ = write!(out, "  {offset:04}  {:<22}", op.name());
        match op {
            _ if op.literal_width().is_some() => match cursor.read_literal(op)? {
                Literal::Int(i) => {
                    let _ = write!(out, "{i}");
                }
                Literal::Float(f) => {
                    let _ = write!(out, "{f:?}");
                }
            },
            Opcode::Load | Opcode::Store => {
                let _ = write!(out, "#{}", cursor.read_u8()?);
            }
            Opcode::StoreIndexA | Opcode::StoreIndexS => {
                let id = cursor.read_u8()?;
                let depth = cursor.read_u8()?;
                let _ = write!(out, "#{id} depth {depth}");
            }
            Opcode::Jump | Opcode::JumpIfFalse => {
                let delta = cursor.read_uint()?;
                let _ = write!(out, "{delta} -> {:04}", cursor.pos() as u64 + delta);
            }
            Opcode::JumpN => {
                let delta = cursor.read_uint()?;
                let target = (cursor.pos() as u64).saturating_sub(delta);
                let _ = write!(out, "{delta} -> {target:04}");
            }
            Opcode::Call => {
                let id = cursor.read_u8()?;
                let name = Builtin::from_id(id)
                    .map(|b| b.name())
                    .or_else(|| program.function(id).map(|f| f.name.as_str()))
                    .unwrap_or("?");
                let _ = write!(out, "{id} ({name})");
            }
            Opcode::AllocateArrAndFill => {
                let byte = cursor.read_u8()?;
                let _ = match FillKind::from_byte(byte) {
                    Some(kind) => write!(out, "{kind:?}"),
                    None => write!(out, "fill {byte}"),
                };
            }
            _ => {}
        }
        let trimmed = out.trim_end_matches(' ').len();
        out.truncate(trimmed);
        out.push('\n');
    }
    Ok(())
}
