use core::fmt;

/// One-byte instruction codes. Operands, where an instruction has any,
/// follow it in the byte stream.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    // Literals: the tag names the width of the little-endian payload.
    SInt1,
    SInt2,
    SInt4,
    SInt8,
    UInt1,
    UInt2,
    UInt4,
    UInt8,
    Flt4,
    Flt8,

    NegI,
    NegF,
    Not,

    AddI,
    AddF,
    AddS,
    SubI,
    SubF,
    MulI,
    MulF,
    DivI,
    DivF,
    ModI,

    LtI,
    LtF,
    LtS,
    LeI,
    LeF,
    LeS,
    GtI,
    GtF,
    GtS,
    GeI,
    GeF,
    GeS,
    EqI,
    EqF,
    EqS,
    NeI,
    NeF,
    NeS,

    And,
    Or,

    IndexA,
    IndexS,
    IntToFloat,

    Load,
    Store,
    StoreIndexA,
    StoreIndexS,

    AllocateArr,
    AllocateStr,
    AllocateArrAndFill,

    JumpIfFalse,
    Jump,
    JumpN,

    Return,
    Call,
    Pop,
}

static_assertions::assert_eq_size!(Opcode, u8);

impl Opcode {
    /// Every opcode, in discriminant order.
    pub const ALL: [Opcode; 59] = {
        use Opcode::*;
        [
            SInt1, SInt2, SInt4, SInt8, UInt1, UInt2, UInt4, UInt8, Flt4, Flt8, NegI, NegF, Not,
            AddI, AddF, AddS, SubI, SubF, MulI, MulF, DivI, DivF, ModI, LtI, LtF, LtS, LeI, LeF,
            LeS, GtI, GtF, GtS, GeI, GeF, GeS, EqI, EqF, EqS, NeI, NeF, NeS, And, Or, IndexA,
            IndexS, IntToFloat, Load, Store, StoreIndexA, StoreIndexS, AllocateArr, AllocateStr,
            AllocateArrAndFill, JumpIfFalse, Jump, JumpN, Return, Call, Pop,
        ]
    };

    pub fn name(self) -> &'static str {
        use Opcode::*;
        match self {
            SInt1 => "sINT1",
            SInt2 => "sINT2",
            SInt4 => "sINT4",
            SInt8 => "sINT8",
            UInt1 => "uINT1",
            UInt2 => "uINT2",
            UInt4 => "uINT4",
            UInt8 => "uINT8",
            Flt4 => "FLT4",
            Flt8 => "FLT8",
            NegI => "NEGATIVE_I",
            NegF => "NEGATIVE_F",
            Not => "NOT",
            AddI => "ADD_I",
            AddF => "ADD_F",
            AddS => "ADD_S",
            SubI => "SUB_I",
            SubF => "SUB_F",
            MulI => "MULT_I",
            MulF => "MULT_F",
            DivI => "DIV_I",
            DivF => "DIV_F",
            ModI => "MOD_I",
            LtI => "LESSER_I",
            LtF => "LESSER_F",
            LtS => "LESSER_S",
            LeI => "LESSER_EQUALS_I",
            LeF => "LESSER_EQUALS_F",
            LeS => "LESSER_EQUALS_S",
            GtI => "GREATER_I",
            GtF => "GREATER_F",
            GtS => "GREATER_S",
            GeI => "GREATER_EQUALS_I",
            GeF => "GREATER_EQUALS_F",
            GeS => "GREATER_EQUALS_S",
            EqI => "EQUALS_I",
            EqF => "EQUALS_F",
            EqS => "EQUALS_S",
            NeI => "NOT_EQUALS_I",
            NeF => "NOT_EQUALS_F",
            NeS => "NOT_EQUALS_S",
            And => "AND",
            Or => "OR",
            IndexA => "INDEX_A",
            IndexS => "INDEX_S",
            IntToFloat => "INT_TO_FLOAT",
            Load => "LOAD",
            Store => "STORE",
            StoreIndexA => "STORE_INDEX_A",
            StoreIndexS => "STORE_INDEX_S",
            AllocateArr => "ALLOCATE_ARR",
            AllocateStr => "ALLOCATE_STR",
            AllocateArrAndFill => "ALLOCATE_ARR_AND_FILL",
            JumpIfFalse => "JUMP_IF_FALSE",
            Jump => "JUMP",
            JumpN => "JUMP_N",
            Return => "RETURN",
            Call => "CALL",
            Pop => "POP",
        }
    }

    /// Width in bytes of the literal payload that follows an integer or
    /// float tag.
    pub fn literal_width(self) -> Option<usize> {
        use Opcode::*;
        match self {
            SInt1 | UInt1 => Some(1),
            SInt2 | UInt2 => Some(2),
            SInt4 | UInt4 | Flt4 => Some(4),
            SInt8 | UInt8 | Flt8 => Some(8),
            _ => None,
        }
    }

    pub fn is_float_literal(self) -> bool {
        matches!(self, Opcode::Flt4 | Opcode::Flt8)
    }

    pub fn is_signed_literal(self) -> bool {
        matches!(
            self,
            Opcode::SInt1 | Opcode::SInt2 | Opcode::SInt4 | Opcode::SInt8
        )
    }
}

impl TryFrom<u8> for Opcode {
    type Error = u8;

    fn try_from(byte: u8) -> Result<Self, u8> {
        Opcode::ALL.get(byte as usize).copied().ok_or(byte)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What `ALLOCATE_ARR_AND_FILL` puts in the innermost level.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillKind {
    Int,
    Float,
    Str,
    Array,
    /// The last size is a string of that many NUL bytes.
    Chars,
}

impl FillKind {
    pub fn from_byte(byte: u8) -> Option<FillKind> {
        [
            FillKind::Int,
            FillKind::Float,
            FillKind::Str,
            FillKind::Array,
            FillKind::Chars,
        ]
        .get(byte as usize)
            .copied()
    }
}
