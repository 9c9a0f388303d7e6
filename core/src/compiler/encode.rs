//! Width-tagged literal encoding and the matching byte reader.

use thiserror::Error;

use super::opcode::Opcode;

/// Appends `value` with the narrowest tag that holds it: unsigned tags for
/// non-negative values, signed tags otherwise.
pub fn encode_int(value: i64, out: &mut Vec<u8>) {
    if value >= 0 {
        encode_uint(value as u64, out);
        return;
    }
    if let Ok(v) = i8::try_from(value) {
        out.push(Opcode::SInt1 as u8);
        out.extend_from_slice(&v.to_le_bytes());
    } else if let Ok(v) = i16::try_from(value) {
        out.push(Opcode::SInt2 as u8);
        out.extend_from_slice(&v.to_le_bytes());
    } else if let Ok(v) = i32::try_from(value) {
        out.push(Opcode::SInt4 as u8);
        out.extend_from_slice(&v.to_le_bytes());
    } else {
        out.push(Opcode::SInt8 as u8);
        out.extend_from_slice(&value.to_le_bytes());
    }
}

pub fn encode_uint(value: u64, out: &mut Vec<u8>) {
    if let Ok(v) = u8::try_from(value) {
        out.push(Opcode::UInt1 as u8);
        out.push(v);
    } else if let Ok(v) = u16::try_from(value) {
        out.push(Opcode::UInt2 as u8);
        out.extend_from_slice(&v.to_le_bytes());
    } else if let Ok(v) = u32::try_from(value) {
        out.push(Opcode::UInt4 as u8);
        out.extend_from_slice(&v.to_le_bytes());
    } else {
        out.push(Opcode::UInt8 as u8);
        out.extend_from_slice(&value.to_le_bytes());
    }
}

/// Encoded size of `value` including its tag.
pub fn uint_len(value: u64) -> usize {
    1 + match value {
        0..=0xFF => 1,
        0x100..=0xFFFF => 2,
        0x1_0000..=0xFFFF_FFFF => 4,
        _ => 8,
    }
}

/// Uses `FLT4` when the value survives a round trip through `f32`.
pub fn encode_float(value: f64, out: &mut Vec<u8>) {
    let narrow = value as f32;
    if f64::from(narrow) == value || value.is_nan() {
        out.push(Opcode::Flt4 as u8);
        out.extend_from_slice(&narrow.to_le_bytes());
    } else {
        out.push(Opcode::Flt8 as u8);
        out.extend_from_slice(&value.to_le_bytes());
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("Unexpected end of bytecode at offset {offset}")]
    UnexpectedEnd { offset: usize },
    #[error("Unknown opcode {byte:#04x} at offset {offset}")]
    UnknownOpcode { byte: u8, offset: usize },
    #[error("Expected an integer literal at offset {offset}")]
    ExpectedInteger { offset: usize },
    #[error("Unknown fill kind {byte} at offset {offset}")]
    UnknownFillKind { byte: u8, offset: usize },
    #[error("Jump to offset {target} is outside the code")]
    JumpOutOfRange { target: isize },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
}

/// Reads opcodes and operands from a code buffer.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    code: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(code: &'a [u8]) -> Self {
        Cursor { code, pos: 0 }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.code.len()
    }

    /// Moves by `delta` bytes. Landing exactly at the end is allowed.
    pub fn jump(&mut self, delta: isize) -> Result<(), DecodeError> {
        let target = self.pos as isize + delta;
        if target < 0 || target as usize > self.code.len() {
            return Err(DecodeError::JumpOutOfRange { target });
        }
        self.pos = target as usize;
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        let byte = *self
            .code
            .get(self.pos)
            .ok_or(DecodeError::UnexpectedEnd { offset: self.pos })?;
        self.pos += 1;
        Ok(byte)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let bytes = self
            .code
            .get(self.pos..self.pos + N)
            .ok_or(DecodeError::UnexpectedEnd { offset: self.pos })?;
        self.pos += N;
        let mut array = [0; N];
        array.copy_from_slice(bytes);
        Ok(array)
    }

    pub fn read_opcode(&mut self) -> Result<Opcode, DecodeError> {
        let offset = self.pos;
        let byte = self.read_u8()?;
        Opcode::try_from(byte).map_err(|byte| DecodeError::UnknownOpcode { byte, offset })
    }

    /// Reads the payload of a literal whose tag has already been consumed.
    pub fn read_literal(&mut self, tag: Opcode) -> Result<Literal, DecodeError> {
        use Opcode::*;
        let literal = match tag {
            SInt1 => Literal::Int(i8::from_le_bytes(self.read_array()?) as i64),
            SInt2 => Literal::Int(i16::from_le_bytes(self.read_array()?) as i64),
            SInt4 => Literal::Int(i32::from_le_bytes(self.read_array()?) as i64),
            SInt8 => Literal::Int(i64::from_le_bytes(self.read_array()?)),
            UInt1 => Literal::Int(self.read_u8()? as i64),
            UInt2 => Literal::Int(u16::from_le_bytes(self.read_array()?) as i64),
            UInt4 => Literal::Int(u32::from_le_bytes(self.read_array()?) as i64),
            UInt8 => Literal::Int(u64::from_le_bytes(self.read_array()?) as i64),
            Flt4 => Literal::Float(f32::from_le_bytes(self.read_array()?) as f64),
            Flt8 => Literal::Float(f64::from_le_bytes(self.read_array()?)),
            _ => {
                return Err(DecodeError::ExpectedInteger {
                    offset: self.pos.saturating_sub(1),
                });
            }
        };
        Ok(literal)
    }

    /// Reads a tagged unsigned operand, as used by jumps.
    pub fn read_uint(&mut self) -> Result<u64, DecodeError> {
        let offset = self.pos;
        let tag = self.read_opcode()?;
        if tag.literal_width().is_none() || tag.is_float_literal() || tag.is_signed_literal() {
            return Err(DecodeError::ExpectedInteger { offset });
        }
        match self.read_literal(tag)? {
            Literal::Int(value) => Ok(value as u64),
            Literal::Float(_) => Err(DecodeError::ExpectedInteger { offset }),
        }
    }
}
