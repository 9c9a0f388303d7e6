use core::cell::RefCell;
use std::io::{BufRead, Write};
use std::rc::Rc;

use smallvec::SmallVec;

use super::builtins;
use super::error::RuntimeError;
use super::value::Value;
use crate::builtins::Builtin;
use crate::compiler::{Cursor, DecodeError, FillKind, Literal, Opcode, Program};

pub const DEFAULT_MAX_CALL_DEPTH: usize = 1024;

/// Most values, rows included, a single `ALLOCATE_ARR_AND_FILL` may create.
pub const MAX_FILL_ELEMENTS: usize = 1 << 26;

/// Stack machine over a [`Program`]: an operand stack, a flat variable array
/// indexed by slot id, and the program's function table.
pub struct Vm<'p, 'io> {
    program: &'p Program,
    variables: Vec<Value>,
    stack: Vec<Value>,
    pub(super) out: &'io mut dyn Write,
    pub(super) input: &'io mut dyn BufRead,
    depth: usize,
    max_call_depth: usize,
}

impl<'p, 'io> Vm<'p, 'io> {
    pub fn new(
        program: &'p Program,
        out: &'io mut dyn Write,
        input: &'io mut dyn BufRead,
    ) -> Self {
        Vm {
            program,
            variables: vec![Value::default(); program.slots],
            stack: Vec::new(),
            out,
            input,
            depth: 0,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }

    pub fn with_max_call_depth(mut self, max_call_depth: usize) -> Self {
        self.max_call_depth = max_call_depth;
        self
    }

    /// Runs the top-level code to completion.
    pub fn run(&mut self) -> Result<(), RuntimeError> {
        let program = self.program;
        let result = self.execute(&program.code).map(|_| ());
        // Output written before a fault is still delivered.
        self.out.flush()?;
        if let Err(err) = &result {
            tracing::debug!(error = %err, depth = self.depth, "Runtime fault");
        }
        result
    }

    pub fn stack(&self) -> &[Value] {
        &self.stack
    }

    pub fn variables(&self) -> &[Value] {
        &self.variables
    }

    /// Executes `code` until it ends or hits `RETURN`. Returns the value left
    /// by `RETURN`, if any; the stack is restored to its height on entry.
    pub fn execute(&mut self, code: &[u8]) -> Result<Option<Value>, RuntimeError> {
        let base = self.stack.len();
        let mut cursor = Cursor::new(code);

        while !cursor.at_end() {
            let offset = cursor.pos();
            let op = cursor.read_opcode()?;
            tracing::trace!(offset, op = op.name(), stack = self.stack.len(), "Dispatch");

            use Opcode::*;
            match op {
                SInt1 | SInt2 | SInt4 | SInt8 | UInt1 | UInt2 | UInt4 | UInt8 | Flt4 | Flt8 => {
                    let value = match cursor.read_literal(op)? {
                        Literal::Int(i) => Value::Int(i),
                        Literal::Float(f) => Value::Float(f),
                    };
                    self.push(value);
                }

                NegI => {
                    let value = self.pop_int()?;
                    self.push(Value::Int(value.wrapping_neg()));
                }
                NegF => {
                    let value = self.pop_float()?;
                    self.push(Value::Float(-value));
                }
                Not => {
                    let value = self.pop_int()?;
                    self.push(Value::Int((value == 0) as i64));
                }

                AddI => self.int_op(|a, b| Ok(a.wrapping_add(b)))?,
                SubI => self.int_op(|a, b| Ok(a.wrapping_sub(b)))?,
                MulI => self.int_op(|a, b| Ok(a.wrapping_mul(b)))?,
                DivI => self.int_op(|a, b| {
                    if b == 0 {
                        return Err(RuntimeError::DivisionByZero);
                    }
                    Ok(a.wrapping_div(b))
                })?,
                ModI => self.int_op(|a, b| {
                    if b == 0 {
                        return Err(RuntimeError::DivisionByZero);
                    }
                    Ok(a.wrapping_rem(b))
                })?,
                AddF => self.float_op(|a, b| a + b)?,
                SubF => self.float_op(|a, b| a - b)?,
                MulF => self.float_op(|a, b| a * b)?,
                DivF => self.float_op(|a, b| a / b)?,
                AddS => {
                    let rhs = self.pop_str()?;
                    let lhs = self.pop_str()?;
                    let mut bytes = lhs.borrow().clone();
                    bytes.extend_from_slice(&rhs.borrow());
                    self.push(Value::str(bytes));
                }

                LtI => self.int_cmp(|a, b| a < b)?,
                LeI => self.int_cmp(|a, b| a <= b)?,
                GtI => self.int_cmp(|a, b| a > b)?,
                GeI => self.int_cmp(|a, b| a >= b)?,
                EqI => self.int_cmp(|a, b| a == b)?,
                NeI => self.int_cmp(|a, b| a != b)?,
                LtF => self.float_cmp(|a, b| a < b)?,
                LeF => self.float_cmp(|a, b| a <= b)?,
                GtF => self.float_cmp(|a, b| a > b)?,
                GeF => self.float_cmp(|a, b| a >= b)?,
                EqF => self.float_cmp(|a, b| a == b)?,
                NeF => self.float_cmp(|a, b| a != b)?,
                LtS => self.str_cmp(|a, b| a < b)?,
                LeS => self.str_cmp(|a, b| a <= b)?,
                GtS => self.str_cmp(|a, b| a > b)?,
                GeS => self.str_cmp(|a, b| a >= b)?,
                EqS => self.str_cmp(|a, b| a == b)?,
                NeS => self.str_cmp(|a, b| a != b)?,

                And => self.int_op(|a, b| Ok((a != 0 && b != 0) as i64))?,
                Or => self.int_op(|a, b| Ok((a != 0 || b != 0) as i64))?,

                IndexA => {
                    let items = self.pop_array()?;
                    let index = self.pop_int()?;
                    let item = element(&items.borrow(), index)?;
                    self.push(item);
                }
                IndexS => {
                    let bytes = self.pop_str()?;
                    let index = self.pop_int()?;
                    let bytes = bytes.borrow();
                    let i = checked_index(index, bytes.len())?;
                    self.push(Value::Int(bytes[i] as i64));
                }
                IntToFloat => {
                    let value = self.pop_int()?;
                    self.push(Value::Float(value as f64));
                }

                Load => {
                    let id = cursor.read_u8()?;
                    let value = self
                        .variables
                        .get(id as usize)
                        .cloned()
                        .ok_or(RuntimeError::UnknownVariable(id))?;
                    self.push(value);
                }
                Store => {
                    let id = cursor.read_u8()?;
                    let value = self.pop()?;
                    *self.slot(id)? = value;
                }
                StoreIndexA | StoreIndexS => {
                    let id = cursor.read_u8()?;
                    let depth = cursor.read_u8()?;
                    self.store_index(id, depth as usize, op == StoreIndexS)?;
                }

                AllocateArr => {
                    let count = self.pop_size()?;
                    let items = self.pop_n(count)?;
                    self.push(Value::array(items));
                }
                AllocateStr => {
                    let count = self.pop_size()?;
                    let bytes = self
                        .pop_n(count)?
                        .into_iter()
                        .map(|v| expect_int(v).map(|b| b as u8))
                        .collect::<Result<Vec<u8>, _>>()?;
                    self.push(Value::str(bytes));
                }
                AllocateArrAndFill => {
                    let at = cursor.pos();
                    let byte = cursor.read_u8()?;
                    let kind = FillKind::from_byte(byte)
                        .ok_or(DecodeError::UnknownFillKind { byte, offset: at })?;
                    let dims = self.pop_size()?;
                    let sizes = self
                        .pop_n(dims)?
                        .into_iter()
                        .map(|v| {
                            let n = expect_int(v)?;
                            usize::try_from(n).map_err(|_| RuntimeError::NegativeSize(n))
                        })
                        .collect::<Result<SmallVec<[usize; 4]>, _>>()?;
                    self.push(filled(&sizes, kind)?);
                }

                JumpIfFalse => {
                    let delta = cursor.read_uint()?;
                    if self.pop_int()? == 0 {
                        cursor.jump(delta as isize)?;
                    }
                }
                Jump => {
                    let delta = cursor.read_uint()?;
                    cursor.jump(delta as isize)?;
                }
                JumpN => {
                    let delta = cursor.read_uint()?;
                    cursor.jump(-(delta as isize))?;
                }

                Return => {
                    let value = if self.stack.len() > base {
                        self.stack.pop()
                    } else {
                        None
                    };
                    self.stack.truncate(base);
                    return Ok(value);
                }
                Call => {
                    let id = cursor.read_u8()?;
                    self.call(id)?;
                }
                Pop => {
                    self.pop()?;
                }
            }
        }

        self.stack.truncate(base);
        Ok(None)
    }

    fn call(&mut self, id: u8) -> Result<(), RuntimeError> {
        if let Some(builtin) = Builtin::from_id(id) {
            return builtins::call(self, builtin);
        }
        let program = self.program;
        let function = program
            .function(id)
            .ok_or(RuntimeError::UnknownFunction(id))?;
        if self.depth >= self.max_call_depth {
            return Err(RuntimeError::CallDepthExceeded(self.max_call_depth));
        }

        let args = self.pop_n(function.params.len())?;
        // Recursive calls reuse the same slots; keep the caller's copies.
        let saved = self
            .variables
            .get(function.slots.clone())
            .ok_or(RuntimeError::UnknownVariable(function.slots.start as u8))?
            .to_vec();
        for (&param, arg) in function.params.iter().zip(args) {
            *self.slot(param)? = arg;
        }

        tracing::debug!(name = %function.name, depth = self.depth, "Call");
        self.depth += 1;
        let result = self.execute(&function.code);
        self.depth -= 1;
        if let Some(slots) = self.variables.get_mut(function.slots.clone()) {
            slots.clone_from_slice(&saved);
        }

        match (result?, function.returns_value) {
            (Some(value), true) => self.push(value),
            (None, true) => return Err(RuntimeError::MissingReturnValue(function.name.clone())),
            (_, false) => {}
        }
        Ok(())
    }

    fn store_index(&mut self, id: u8, depth: usize, into_str: bool) -> Result<(), RuntimeError> {
        let indices = self.pop_n(depth)?;
        let value = self.pop()?;
        let Some((last, path)) = indices.split_last() else {
            *self.slot(id)? = value;
            return Ok(());
        };

        let mut target = self.slot(id)?.clone();
        for index in path {
            let index = expect_int(index.clone())?;
            let next = match &target {
                Value::Array(items) => element(&items.borrow(), index)?,
                other => return Err(mismatch("array", other)),
            };
            target = next;
        }

        let index = expect_int(last.clone())?;
        match &target {
            Value::Str(bytes) if into_str => {
                let mut bytes = bytes.borrow_mut();
                let i = checked_index(index, bytes.len())?;
                bytes[i] = expect_int(value)? as u8;
            }
            Value::Array(items) if !into_str => {
                let mut items = items.borrow_mut();
                let i = checked_index(index, items.len())?;
                items[i] = value;
            }
            other => return Err(mismatch(if into_str { "str" } else { "array" }, other)),
        }
        Ok(())
    }

    fn slot(&mut self, id: u8) -> Result<&mut Value, RuntimeError> {
        self.variables
            .get_mut(id as usize)
            .ok_or(RuntimeError::UnknownVariable(id))
    }

    pub(super) fn push(&mut self, value: Value) {
        self.stack.push(value);
    }

    pub(super) fn pop(&mut self) -> Result<Value, RuntimeError> {
        self.stack.pop().ok_or(RuntimeError::StackUnderflow)
    }

    /// Pops `n` values, returned in the order they were pushed.
    fn pop_n(&mut self, n: usize) -> Result<Vec<Value>, RuntimeError> {
        let len = self.stack.len();
        if len < n {
            return Err(RuntimeError::StackUnderflow);
        }
        Ok(self.stack.split_off(len - n))
    }

    pub(super) fn pop_int(&mut self) -> Result<i64, RuntimeError> {
        expect_int(self.pop()?)
    }

    pub(super) fn pop_float(&mut self) -> Result<f64, RuntimeError> {
        match self.pop()? {
            Value::Float(f) => Ok(f),
            other => Err(mismatch("float", &other)),
        }
    }

    pub(super) fn pop_str(&mut self) -> Result<Rc<RefCell<Vec<u8>>>, RuntimeError> {
        match self.pop()? {
            Value::Str(bytes) => Ok(bytes),
            other => Err(mismatch("str", &other)),
        }
    }

    fn pop_array(&mut self) -> Result<Rc<RefCell<Vec<Value>>>, RuntimeError> {
        match self.pop()? {
            Value::Array(items) => Ok(items),
            other => Err(mismatch("array", &other)),
        }
    }

    fn pop_size(&mut self) -> Result<usize, RuntimeError> {
        let n = self.pop_int()?;
        usize::try_from(n).map_err(|_| RuntimeError::NegativeSize(n))
    }

    fn int_op(
        &mut self,
        op: impl FnOnce(i64, i64) -> Result<i64, RuntimeError>,
    ) -> Result<(), RuntimeError> {
        let b = self.pop_int()?;
        let a = self.pop_int()?;
        self.push(Value::Int(op(a, b)?));
        Ok(())
    }

    fn float_op(&mut self, op: impl FnOnce(f64, f64) -> f64) -> Result<(), RuntimeError> {
        let b = self.pop_float()?;
        let a = self.pop_float()?;
        self.push(Value::Float(op(a, b)));
        Ok(())
    }

    fn int_cmp(&mut self, op: impl FnOnce(i64, i64) -> bool) -> Result<(), RuntimeError> {
        self.int_op(|a, b| Ok(op(a, b) as i64))
    }

    fn float_cmp(&mut self, op: impl FnOnce(f64, f64) -> bool) -> Result<(), RuntimeError> {
        let b = self.pop_float()?;
        let a = self.pop_float()?;
        self.push(Value::Int(op(a, b) as i64));
        Ok(())
    }

    fn str_cmp(&mut self, op: impl FnOnce(&[u8], &[u8]) -> bool) -> Result<(), RuntimeError> {
        let b = self.pop_str()?;
        let a = self.pop_str()?;
        let result = op(a.borrow().as_slice(), b.borrow().as_slice());
        self.push(Value::Int(result as i64));
        Ok(())
    }
}

fn mismatch(expected: &'static str, found: &Value) -> RuntimeError {
    RuntimeError::TypeMismatch {
        expected,
        found: found.kind(),
    }
}

fn expect_int(value: Value) -> Result<i64, RuntimeError> {
    match value {
        Value::Int(i) => Ok(i),
        other => Err(mismatch("int", &other)),
    }
}

fn element(items: &[Value], index: i64) -> Result<Value, RuntimeError> {
    let i = checked_index(index, items.len())?;
    Ok(items[i].clone())
}

fn checked_index(index: i64, len: usize) -> Result<usize, RuntimeError> {
    usize::try_from(index)
        .ok()
        .filter(|&i| i < len)
        .ok_or(RuntimeError::IndexOutOfBounds { index, len })
}

/// Nested arrays with one level per size, `kind` values at the bottom.
/// Every row gets its own buffer. Sizes come from the program, so the
/// number of values created is checked before anything is allocated.
fn filled(sizes: &[usize], kind: FillKind) -> Result<Value, RuntimeError> {
    let mut row = 1usize;
    let mut requested = 0usize;
    for &n in sizes {
        row = row.saturating_mul(n);
        requested = requested.saturating_add(row);
    }
    if requested > MAX_FILL_ELEMENTS {
        return Err(RuntimeError::AllocationTooLarge {
            requested,
            limit: MAX_FILL_ELEMENTS,
        });
    }
    Ok(fill_level(sizes, kind))
}

fn fill_level(sizes: &[usize], kind: FillKind) -> Value {
    match (sizes, kind) {
        ([], FillKind::Int | FillKind::Chars) => Value::Int(0),
        ([], FillKind::Float) => Value::Float(0.0),
        ([], FillKind::Str) => Value::str(Vec::new()),
        ([], FillKind::Array) => Value::array(Vec::new()),
        ([n], FillKind::Chars) => Value::str(vec![0u8; *n]),
        ([n, rest @ ..], _) => Value::array((0..*n).map(|_| fill_level(rest, kind)).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{FunctionCode, encode_float, encode_int, encode_uint};
    use pretty_assertions::assert_eq;
    use smallvec::smallvec;

    fn op(code: &mut Vec<u8>, op: Opcode) {
        code.push(op as u8);
    }

    /// Runs `code` followed by `RETURN` and yields the value on top.
    fn eval(mut code: Vec<u8>) -> Result<Option<Value>, RuntimeError> {
        let program = Program::default();
        let mut out = Vec::new();
        let mut input: &[u8] = b"";
        let mut vm = Vm::new(&program, &mut out, &mut input);
        op(&mut code, Opcode::Return);
        vm.execute(&code)
    }

    fn int(value: i64) -> Vec<u8> {
        let mut code = Vec::new();
        encode_int(value, &mut code);
        code
    }

    fn binary(lhs: Vec<u8>, rhs: Vec<u8>, opcode: Opcode) -> Vec<u8> {
        let mut code = lhs;
        code.extend(rhs);
        op(&mut code, opcode);
        code
    }

    #[test]
    fn test_integer_arithmetic() {
        assert_eq!(eval(binary(int(6), int(7), Opcode::MulI)), Ok(Some(Value::Int(42))));
        assert_eq!(eval(binary(int(-7), int(2), Opcode::DivI)), Ok(Some(Value::Int(-3))));
        assert_eq!(eval(binary(int(-7), int(3), Opcode::ModI)), Ok(Some(Value::Int(-1))));
        assert_eq!(
            eval(binary(int(i64::MAX), int(1), Opcode::AddI)),
            Ok(Some(Value::Int(i64::MIN)))
        );
    }

    #[test]
    fn test_integer_division_by_zero() {
        assert_eq!(
            eval(binary(int(1), int(0), Opcode::DivI)),
            Err(RuntimeError::DivisionByZero)
        );
        assert_eq!(
            eval(binary(int(1), int(0), Opcode::ModI)),
            Err(RuntimeError::DivisionByZero)
        );
    }

    #[test]
    fn test_float_promotion() {
        let mut code = int(1);
        op(&mut code, Opcode::IntToFloat);
        encode_float(0.5, &mut code);
        op(&mut code, Opcode::AddF);
        assert_eq!(eval(code), Ok(Some(Value::Float(1.5))));
    }

    #[test]
    fn test_type_mismatch() {
        let mut code = int(1);
        encode_float(0.5, &mut code);
        op(&mut code, Opcode::AddF);
        assert_eq!(
            eval(code),
            Err(RuntimeError::TypeMismatch {
                expected: "float",
                found: "int"
            })
        );
    }

    #[test]
    fn test_stack_underflow() {
        let mut code = int(1);
        op(&mut code, Opcode::AddI);
        assert_eq!(eval(code), Err(RuntimeError::StackUnderflow));
    }

    #[test]
    fn test_strings() {
        let string = |text: &[u8]| {
            let mut code = Vec::new();
            for &b in text {
                encode_int(b as i64, &mut code);
            }
            encode_uint(text.len() as u64, &mut code);
            op(&mut code, Opcode::AllocateStr);
            code
        };
        assert_eq!(
            eval(binary(string(b"ab"), string(b"c"), Opcode::AddS)),
            Ok(Some(Value::str("abc")))
        );
        assert_eq!(
            eval(binary(string(b"abc"), string(b"abd"), Opcode::LtS)),
            Ok(Some(Value::Int(1)))
        );
        assert_eq!(
            eval(binary(int(1), string(b"xyz"), Opcode::IndexS)),
            Ok(Some(Value::Int(b'y' as i64)))
        );
        assert_eq!(
            eval(binary(int(3), string(b"xyz"), Opcode::IndexS)),
            Err(RuntimeError::IndexOutOfBounds { index: 3, len: 3 })
        );
    }

    #[test]
    fn test_allocate_and_fill() {
        let mut code = int(2);
        code.extend(int(3));
        encode_uint(2, &mut code);
        op(&mut code, Opcode::AllocateArrAndFill);
        code.push(FillKind::Float as u8);
        let row = || Value::array(vec![Value::Float(0.0); 3]);
        assert_eq!(eval(code), Ok(Some(Value::array(vec![row(), row()]))));

        let mut code = int(-1);
        encode_uint(1, &mut code);
        op(&mut code, Opcode::AllocateArrAndFill);
        code.push(FillKind::Int as u8);
        assert_eq!(eval(code), Err(RuntimeError::NegativeSize(-1)));
    }

    #[test]
    fn test_allocate_chars_makes_strings() {
        let mut code = int(3);
        encode_uint(1, &mut code);
        op(&mut code, Opcode::AllocateArrAndFill);
        code.push(FillKind::Chars as u8);
        assert_eq!(eval(code), Ok(Some(Value::str(vec![0u8; 3]))));

        let mut code = int(2);
        code.extend(int(4));
        encode_uint(2, &mut code);
        op(&mut code, Opcode::AllocateArrAndFill);
        code.push(FillKind::Chars as u8);
        let row = || Value::str(vec![0u8; 4]);
        assert_eq!(eval(code), Ok(Some(Value::array(vec![row(), row()]))));
    }

    #[test]
    fn test_oversized_allocation_faults() {
        let mut code = int(1 << 62);
        encode_uint(1, &mut code);
        op(&mut code, Opcode::AllocateArrAndFill);
        code.push(FillKind::Int as u8);
        assert_eq!(
            eval(code),
            Err(RuntimeError::AllocationTooLarge {
                requested: 1 << 62,
                limit: MAX_FILL_ELEMENTS,
            })
        );

        // Empty rows count too.
        let mut code = int(1 << 40);
        code.extend(int(0));
        encode_uint(2, &mut code);
        op(&mut code, Opcode::AllocateArrAndFill);
        code.push(FillKind::Int as u8);
        assert!(matches!(
            eval(code),
            Err(RuntimeError::AllocationTooLarge { .. })
        ));
    }

    #[test]
    fn test_jumps() {
        // if (false) push 1; push 2
        let mut code = int(0);
        op(&mut code, Opcode::JumpIfFalse);
        encode_uint(2, &mut code);
        code.extend(int(1));
        code.extend(int(2));
        assert_eq!(eval(code), Ok(Some(Value::Int(2))));

        let mut code = Vec::new();
        op(&mut code, Opcode::Jump);
        encode_uint(100, &mut code);
        assert!(matches!(
            eval(code),
            Err(RuntimeError::Malformed(DecodeError::JumpOutOfRange { .. }))
        ));
    }

    #[test]
    fn test_unknown_opcode() {
        assert_eq!(
            eval(vec![0xFF]),
            Err(RuntimeError::Malformed(DecodeError::UnknownOpcode {
                byte: 0xFF,
                offset: 0
            }))
        );
    }

    #[test]
    fn test_store_index_nested() {
        // grid = [[0, 0], [0, 0]]; grid[1][0] = 7
        let mut code = int(2);
        code.extend(int(2));
        encode_uint(2, &mut code);
        op(&mut code, Opcode::AllocateArrAndFill);
        code.push(FillKind::Int as u8);
        op(&mut code, Opcode::Store);
        code.push(0);
        code.extend(int(7));
        code.extend(int(1));
        code.extend(int(0));
        op(&mut code, Opcode::StoreIndexA);
        code.extend([0, 2]);

        let program = Program {
            code,
            functions: Vec::new(),
            slots: 1,
        };
        let mut out = Vec::new();
        let mut input: &[u8] = b"";
        let mut vm = Vm::new(&program, &mut out, &mut input);
        vm.run().unwrap();
        let zeros = Value::array(vec![Value::Int(0); 2]);
        assert_eq!(
            vm.variables()[0],
            Value::array(vec![zeros, Value::array(vec![Value::Int(7), Value::Int(0)])])
        );
    }

    #[test]
    fn test_index_store_mutates_shared_buffer() {
        // a = [0, 0]; b = a; b[1] = 9
        let mut code = int(2);
        encode_uint(1, &mut code);
        op(&mut code, Opcode::AllocateArrAndFill);
        code.push(FillKind::Int as u8);
        op(&mut code, Opcode::Store);
        code.push(0);
        op(&mut code, Opcode::Load);
        code.push(0);
        op(&mut code, Opcode::Store);
        code.push(1);
        code.extend(int(9));
        code.extend(int(1));
        op(&mut code, Opcode::StoreIndexA);
        code.extend([1, 1]);

        let program = Program {
            code,
            functions: Vec::new(),
            slots: 2,
        };
        let mut out = Vec::new();
        let mut input: &[u8] = b"";
        let mut vm = Vm::new(&program, &mut out, &mut input);
        vm.run().unwrap();
        let expected = Value::array(vec![Value::Int(0), Value::Int(9)]);
        assert_eq!(vm.variables()[0], expected);
        assert_eq!(vm.variables()[1], expected);
    }

    fn countdown_program() -> Program {
        // def down(n int) int { if (n == 0) { return 0; } return down(n - 1); }
        let mut body = Vec::new();
        op(&mut body, Opcode::Load);
        body.push(0);
        body.extend(int(0));
        op(&mut body, Opcode::EqI);
        op(&mut body, Opcode::JumpIfFalse);
        encode_uint(3, &mut body);
        body.extend(int(0));
        op(&mut body, Opcode::Return);
        op(&mut body, Opcode::Load);
        body.push(0);
        body.extend(int(1));
        op(&mut body, Opcode::SubI);
        op(&mut body, Opcode::Call);
        body.push(13);
        op(&mut body, Opcode::Return);

        let mut code = int(50);
        op(&mut code, Opcode::Call);
        code.push(13);
        op(&mut code, Opcode::Store);
        code.push(1);
        Program {
            code,
            functions: vec![FunctionCode {
                id: 13,
                name: "down".to_owned(),
                params: smallvec![0],
                slots: 0..1,
                returns_value: true,
                code: body,
            }],
            slots: 2,
        }
    }

    #[test]
    fn test_recursion_and_call_depth() {
        let program = countdown_program();
        let mut out = Vec::new();
        let mut input: &[u8] = b"";
        let mut vm = Vm::new(&program, &mut out, &mut input);
        vm.run().unwrap();
        assert_eq!(vm.variables()[1], Value::Int(0));

        let mut vm = Vm::new(&program, &mut out, &mut input).with_max_call_depth(10);
        assert_eq!(vm.run(), Err(RuntimeError::CallDepthExceeded(10)));
    }

    #[test]
    fn test_missing_return_value() {
        let mut program = countdown_program();
        program.functions[0].code = vec![Opcode::Return as u8];
        let mut out = Vec::new();
        let mut input: &[u8] = b"";
        let mut vm = Vm::new(&program, &mut out, &mut input);
        assert_eq!(
            vm.run(),
            Err(RuntimeError::MissingReturnValue("down".to_owned()))
        );
    }
}
