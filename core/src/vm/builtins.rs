//! Runtime side of the built-in functions. Arguments are already on the
//! stack in call order; results are pushed back.

use super::error::RuntimeError;
use super::value::Value;
use super::vm::Vm;
use crate::builtins::Builtin;

pub(super) fn call(vm: &mut Vm<'_, '_>, builtin: Builtin) -> Result<(), RuntimeError> {
    use Builtin::*;
    match builtin {
        PrintBool => {
            let value = vm.pop_int()?;
            let text = if value != 0 { "true" } else { "false" };
            vm.out.write_all(text.as_bytes())?;
        }
        PrintChar => {
            let value = vm.pop_int()?;
            vm.out.write_all(&[value as u8])?;
        }
        PrintInt => {
            let value = vm.pop_int()?;
            write!(vm.out, "{value}")?;
        }
        PrintFloat => {
            let value = vm.pop_float()?;
            write!(vm.out, "{value:?}")?;
        }
        PrintStr => {
            let bytes = vm.pop_str()?;
            vm.out.write_all(&bytes.borrow())?;
        }
        Input => {
            vm.out.flush()?;
            let mut line = Vec::new();
            vm.input.read_until(b'\n', &mut line)?;
            if line.last() == Some(&b'\n') {
                line.pop();
            }
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            vm.push(Value::str(line));
        }
        CharFromInt => {
            let value = vm.pop_int()?;
            let byte = u8::try_from(value).map_err(|_| RuntimeError::InvalidConversion {
                value: value.to_string(),
                target: "char",
            })?;
            vm.push(Value::Int(byte as i64));
        }
        IntFromStr => {
            let bytes = vm.pop_str()?;
            let text = String::from_utf8_lossy(&bytes.borrow()).into_owned();
            let value = text
                .trim()
                .parse::<i64>()
                .map_err(|_| RuntimeError::InvalidConversion {
                    value: text.clone(),
                    target: "int",
                })?;
            vm.push(Value::Int(value));
        }
        // Chars are already ints at runtime.
        IntFromChar => {
            let value = vm.pop_int()?;
            vm.push(Value::Int(value));
        }
        StrFromInt => {
            let value = vm.pop_int()?;
            vm.push(Value::str(value.to_string()));
        }
        StrFromFloat => {
            let value = vm.pop_float()?;
            vm.push(Value::str(format!("{value:?}")));
        }
        StrFromChar => {
            let value = vm.pop_int()?;
            vm.push(Value::str(vec![value as u8]));
        }
        Len => {
            let bytes = vm.pop_str()?;
            let len = bytes.borrow().len();
            vm.push(Value::Int(len as i64));
        }
    }
    tracing::trace!(name = builtin.name(), id = builtin.id(), "Builtin");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::Program;
    use pretty_assertions::assert_eq;

    fn run(builtin: Builtin, args: Vec<Value>, input: &str) -> (Result<Option<Value>, RuntimeError>, String) {
        let program = Program::default();
        let mut out = Vec::new();
        let mut input = input.as_bytes();
        let result = {
            let mut vm = Vm::new(&program, &mut out, &mut input);
            for arg in args {
                vm.push(arg);
            }
            call(&mut vm, builtin).map(|()| vm.stack().last().cloned())
        };
        (result, String::from_utf8_lossy(&out).into_owned())
    }

    #[test]
    fn test_print() {
        assert_eq!(run(Builtin::PrintBool, vec![Value::Int(1)], "").1, "true");
        assert_eq!(run(Builtin::PrintChar, vec![Value::Int(b'A' as i64)], "").1, "A");
        assert_eq!(run(Builtin::PrintInt, vec![Value::Int(-12)], "").1, "-12");
        assert_eq!(run(Builtin::PrintFloat, vec![Value::Float(2.0)], "").1, "2.0");
        assert_eq!(run(Builtin::PrintStr, vec![Value::str("hi\n")], "").1, "hi\n");
    }

    #[test]
    fn test_input_strips_line_ending() {
        let (result, _) = run(Builtin::Input, vec![], "first\r\nsecond\n");
        assert_eq!(result, Ok(Some(Value::str("first"))));
        let (result, _) = run(Builtin::Input, vec![], "");
        assert_eq!(result, Ok(Some(Value::str(""))));
    }

    #[test]
    fn test_conversions() {
        let (result, _) = run(Builtin::IntFromStr, vec![Value::str(" 42 ")], "");
        assert_eq!(result, Ok(Some(Value::Int(42))));
        let (result, _) = run(Builtin::IntFromStr, vec![Value::str("4x")], "");
        assert_eq!(
            result,
            Err(RuntimeError::InvalidConversion {
                value: "4x".to_owned(),
                target: "int"
            })
        );
        let (result, _) = run(Builtin::CharFromInt, vec![Value::Int(300)], "");
        assert!(matches!(result, Err(RuntimeError::InvalidConversion { target: "char", .. })));
        let (result, _) = run(Builtin::StrFromFloat, vec![Value::Float(0.5)], "");
        assert_eq!(result, Ok(Some(Value::str("0.5"))));
        let (result, _) = run(Builtin::Len, vec![Value::str("abc")], "");
        assert_eq!(result, Ok(Some(Value::Int(3))));
    }
}
