//! Bytecode generation from checked, optimized trees.
//!
//! The generator reads only what the checker recorded on the nodes (ids and
//! operand types); it never consults scopes. Operator bytes are picked from
//! the operand types so the VM never has to inspect value tags to choose an
//! operation.

use smallvec::SmallVec;

use super::encode::{encode_float, encode_int, encode_uint, uint_len};
use super::opcode::{FillKind, Opcode};
use super::program::{FunctionCode, Program};
use crate::analyzer::{CompilationContext, CompileError};
use crate::syntax::{
    Assign, Ast, BinaryOp, Branch, ExprArena, ExprId, ExprKind, FunctionDef, Number, Span, Stmt,
    StmtKind, UnaryOp, VarId, VarInit,
};
use crate::types::{Primitive, Type};

/// Generates the bytes for a single expression.
pub fn generate(arena: &ExprArena, id: ExprId) -> Result<Vec<u8>, CompileError> {
    let mut out = Vec::new();
    BytecodeGenerator::new(arena).expr(id, &mut out)?;
    Ok(out)
}

/// Generates a whole program. Function definitions go to the function
/// table; everything else becomes top-level code.
pub fn generate_program(ast: &Ast, ctx: &CompilationContext) -> Result<Program, CompileError> {
    let mut generator = BytecodeGenerator::new(&ast.arena);
    let mut code = Vec::new();
    generator.stmts(&ast.stmts, &mut code)?;

    let mut functions = core::mem::take(&mut generator.functions);
    functions.sort_by_key(|f| f.id);

    let program = Program {
        code,
        functions,
        slots: ctx.scopes.slot_count(),
    };
    tracing::debug!(
        bytes = program.code.len(),
        functions = program.functions.len(),
        slots = program.slots,
        "Generated bytecode"
    );
    Ok(program)
}

pub struct BytecodeGenerator<'a> {
    arena: &'a ExprArena,
    functions: Vec<FunctionCode>,
}

fn missing(what: &str, span: &Span) -> CompileError {
    CompileError::internal(format!("{what} was not resolved by the checker"), span.clone())
}

fn emit(out: &mut Vec<u8>, op: Opcode) {
    out.push(op as u8);
}

impl<'a> BytecodeGenerator<'a> {
    pub fn new(arena: &'a ExprArena) -> Self {
        BytecodeGenerator {
            arena,
            functions: Vec::new(),
        }
    }

    pub fn expr(&self, id: ExprId, out: &mut Vec<u8>) -> Result<(), CompileError> {
        let node = &self.arena[id];
        match &node.kind {
            ExprKind::Numeric { value, .. } => match *value {
                Number::Int(i) => encode_int(i, out),
                Number::Float(f) => encode_float(f, out),
            },
            ExprKind::Array {
                elements,
                is_str,
                ty,
            } => {
                for &element in elements {
                    self.expr(element, out)?;
                }
                encode_uint(elements.len() as u64, out);
                emit(out, allocate_op(*is_str || *ty == Some(Type::STR)));
            }
            ExprKind::Variable { id, .. } => {
                let id = id.ok_or_else(|| missing("Variable", &node.span))?;
                emit(out, Opcode::Load);
                out.push(id);
            }
            ExprKind::Allocate { elem, sizes } => {
                for &size in sizes {
                    self.expr(size, out)?;
                }
                encode_uint(sizes.len() as u64, out);
                emit(out, Opcode::AllocateArrAndFill);
                out.push(fill_kind(*elem) as u8);
            }
            ExprKind::Unary {
                op,
                operand,
                operand_ty,
            } => {
                let operand = operand.ok_or_else(|| missing("Operand", &node.span))?;
                let ty = operand_ty.ok_or_else(|| missing("Operand type", &node.span))?;
                self.expr(operand, out)?;
                emit(
                    out,
                    match op {
                        UnaryOp::Negate if ty.is_float() => Opcode::NegF,
                        UnaryOp::Negate => Opcode::NegI,
                        UnaryOp::Not => Opcode::Not,
                    },
                );
            }
            ExprKind::Binary {
                op,
                lhs,
                rhs,
                lhs_ty,
                rhs_ty,
            } => {
                let (Some(lhs), Some(rhs)) = (lhs, rhs) else {
                    return Err(missing("Operand", &node.span));
                };
                let (Some(lhs_ty), Some(rhs_ty)) = (lhs_ty, rhs_ty) else {
                    return Err(missing("Operand type", &node.span));
                };
                let opcode = binary_op(*op, *lhs_ty, *rhs_ty);
                let float = matches!(opcode_form(opcode), Form::Float);

                self.expr(*lhs, out)?;
                if float && !lhs_ty.is_float() {
                    emit(out, Opcode::IntToFloat);
                }
                self.expr(*rhs, out)?;
                if float && !rhs_ty.is_float() {
                    emit(out, Opcode::IntToFloat);
                }
                emit(out, opcode);
            }
            ExprKind::Call { args, id, .. } => {
                let id = id.ok_or_else(|| missing("Function", &node.span))?;
                for &arg in args {
                    self.expr(arg, out)?;
                }
                emit(out, Opcode::Call);
                out.push(id);
            }
        }
        Ok(())
    }

    pub fn stmts(&mut self, stmts: &[Stmt], out: &mut Vec<u8>) -> Result<(), CompileError> {
        for stmt in stmts {
            self.stmt(stmt, out)?;
        }
        Ok(())
    }

    pub fn stmt(&mut self, stmt: &Stmt, out: &mut Vec<u8>) -> Result<(), CompileError> {
        match &stmt.kind {
            StmtKind::VarInit(init) => self.var_init(init, &stmt.span, out),
            StmtKind::Assign(assign) => self.assign(assign, &stmt.span, out),
            StmtKind::If(chain) => self.branches(&chain.branches, out),
            StmtKind::While(w) => {
                let mut body = Vec::new();
                self.stmts(&w.body, &mut body)?;
                self.while_loop(w.cond, body, out)
            }
            StmtKind::For(f) => {
                self.stmt(&f.init, out)?;
                let mut body = Vec::new();
                self.stmts(&f.body, &mut body)?;
                self.stmt(&f.step, &mut body)?;
                self.while_loop(f.cond, body, out)
            }
            StmtKind::Function(def) => self.function(def),
            StmtKind::Return(ret) => {
                if let Some(value) = ret.value {
                    self.expr(value, out)?;
                }
                emit(out, Opcode::Return);
                Ok(())
            }
            StmtKind::Call(call) => {
                self.expr(*call, out)?;
                if let ExprKind::Call {
                    returns: Some(_), ..
                } = self.arena[*call].kind
                {
                    emit(out, Opcode::Pop);
                }
                Ok(())
            }
        }
    }

    fn var_init(&self, init: &VarInit, span: &Span, out: &mut Vec<u8>) -> Result<(), CompileError> {
        let id = init.id.ok_or_else(|| missing("Variable", span))?;
        match init.value {
            Some(value) => self.expr(value, out)?,
            None => self.default_value(init, out)?,
        }
        emit(out, Opcode::Store);
        out.push(id);
        Ok(())
    }

    /// The value of a declaration without an initializer: a filled array
    /// when leading sizes are given, otherwise the zero of the type.
    fn default_value(&self, init: &VarInit, out: &mut Vec<u8>) -> Result<(), CompileError> {
        let sizes: SmallVec<[ExprId; 4]> = init.sizes.iter().map_while(|size| *size).collect();
        let ty = init.ty;
        if !sizes.is_empty() {
            for &size in &sizes {
                self.expr(size, out)?;
            }
            encode_uint(sizes.len() as u64, out);
            emit(out, Opcode::AllocateArrAndFill);
            let inner = Type::array(ty.prim, ty.dim - sizes.len() as u32);
            out.push(fill_kind(inner) as u8);
        } else if ty.is_array() {
            encode_uint(0, out);
            emit(out, allocate_op(ty.is_str()));
        } else if ty.prim == Primitive::Float {
            encode_float(0.0, out);
        } else {
            encode_int(0, out);
        }
        Ok(())
    }

    fn assign(&self, assign: &Assign, span: &Span, out: &mut Vec<u8>) -> Result<(), CompileError> {
        let id = assign.id.ok_or_else(|| missing("Variable", span))?;
        let mut scratch: SmallVec<[VarId; 4]> = SmallVec::new();
        for (&index, &slot) in assign.subscripts.iter().zip(&assign.scratch) {
            let ExprKind::Variable { id: Some(slot), .. } = self.arena[slot].kind else {
                return Err(missing("Scratch slot", span));
            };
            self.expr(index, out)?;
            emit(out, Opcode::Store);
            out.push(slot);
            scratch.push(slot);
        }
        self.expr(assign.value, out)?;
        if assign.subscripts.is_empty() {
            emit(out, Opcode::Store);
            out.push(id);
            return Ok(());
        }

        let var_ty = assign.var_ty.ok_or_else(|| missing("Variable type", span))?;
        if scratch.is_empty() {
            for &index in &assign.subscripts {
                self.expr(index, out)?;
            }
        } else {
            for slot in scratch {
                emit(out, Opcode::Load);
                out.push(slot);
            }
        }
        let depth = assign.subscripts.len() as u32;
        // The container written into by the last subscript.
        let container = Type::array(var_ty.prim, var_ty.dim + 1 - depth);
        emit(
            out,
            if container.is_str() {
                Opcode::StoreIndexS
            } else {
                Opcode::StoreIndexA
            },
        );
        out.push(id);
        out.push(depth as u8);
        Ok(())
    }

    /// `cond, JUMP_IF_FALSE, body, JUMP(rest)` for each branch. Built from
    /// the last branch backwards so every offset is known when emitted.
    fn branches(&mut self, branches: &[Branch], out: &mut Vec<u8>) -> Result<(), CompileError> {
        let mut rest: Vec<u8> = Vec::new();
        for branch in branches.iter().rev() {
            let mut block = Vec::new();
            self.stmts(&branch.body, &mut block)?;
            let mut code = Vec::new();
            match branch.cond {
                Some(cond) => {
                    if !rest.is_empty() {
                        emit(&mut block, Opcode::Jump);
                        encode_uint(rest.len() as u64, &mut block);
                    }
                    self.expr(cond, &mut code)?;
                    emit(&mut code, Opcode::JumpIfFalse);
                    encode_uint(block.len() as u64, &mut code);
                    code.extend_from_slice(&block);
                }
                // An `else` is always last, so nothing follows it.
                None => code = block,
            }
            code.extend_from_slice(&rest);
            rest = code;
        }
        out.extend_from_slice(&rest);
        Ok(())
    }

    /// `cond, JUMP_IF_FALSE n, body, JUMP_N m` where `JUMP_N` lands on the
    /// first byte of `cond`. Operand widths depend on each other, so they
    /// are recomputed until stable.
    fn while_loop(&self, cond: ExprId, body: Vec<u8>, out: &mut Vec<u8>) -> Result<(), CompileError> {
        let mut cond_code = Vec::new();
        self.expr(cond, &mut cond_code)?;

        let mut back_len = 1 + uint_len(0);
        let (forward, back) = loop {
            let forward = body.len() + back_len;
            let forward_len = 1 + uint_len(forward as u64);
            let back = cond_code.len() + forward_len + body.len() + back_len;
            let needed = 1 + uint_len(back as u64);
            if needed == back_len {
                break (forward, back);
            }
            back_len = needed;
        };

        out.extend_from_slice(&cond_code);
        emit(out, Opcode::JumpIfFalse);
        encode_uint(forward as u64, out);
        out.extend_from_slice(&body);
        emit(out, Opcode::JumpN);
        encode_uint(back as u64, out);
        Ok(())
    }

    fn function(&mut self, def: &FunctionDef) -> Result<(), CompileError> {
        let id = def.id.ok_or_else(|| missing("Function", &def.name_span))?;
        let params = def
            .params
            .iter()
            .map(|p| p.id.ok_or_else(|| missing("Parameter", &p.span)))
            .collect::<Result<SmallVec<[u8; 4]>, _>>()?;

        let mut code = Vec::new();
        self.stmts(&def.body, &mut code)?;
        emit(&mut code, Opcode::Return);

        tracing::debug!(name = %def.name, id, bytes = code.len(), "Generated function");
        self.functions.push(FunctionCode {
            id,
            name: def.name.clone(),
            params,
            slots: def.slots.clone(),
            returns_value: def.returns.is_some(),
            code,
        });
        Ok(())
    }
}

fn allocate_op(is_str: bool) -> Opcode {
    if is_str {
        Opcode::AllocateStr
    } else {
        Opcode::AllocateArr
    }
}

/// Fill for an allocation whose innermost element has type `ty`. A `char`
/// element makes the innermost level a string.
fn fill_kind(ty: Type) -> FillKind {
    if ty == Type::CHAR {
        FillKind::Chars
    } else if ty.is_str() {
        FillKind::Str
    } else if ty.is_array() {
        FillKind::Array
    } else if ty.prim == Primitive::Float {
        FillKind::Float
    } else {
        FillKind::Int
    }
}

enum Form {
    Int,
    Float,
    Str,
}

fn opcode_form(op: Opcode) -> Form {
    use Opcode::*;
    match op {
        AddF | SubF | MulF | DivF | LtF | LeF | GtF | GeF | EqF | NeF => Form::Float,
        AddS | LtS | LeS | GtS | GeS | EqS | NeS => Form::Str,
        _ => Form::Int,
    }
}

/// Picks the operator byte for the checked operand types.
fn binary_op(op: BinaryOp, lhs: Type, rhs: Type) -> Opcode {
    use Opcode::*;
    if op == BinaryOp::Subscript {
        // `rhs` is the container.
        return if rhs.is_str() { IndexS } else { IndexA };
    }
    let form = if lhs.is_str() || rhs.is_str() {
        Form::Str
    } else if lhs.is_float() || rhs.is_float() {
        Form::Float
    } else {
        Form::Int
    };
    let [int, float, string] = match op {
        BinaryOp::Add => [AddI, AddF, AddS],
        BinaryOp::Sub => [SubI, SubF, SubI],
        BinaryOp::Mul => [MulI, MulF, MulI],
        BinaryOp::Div => [DivI, DivF, DivI],
        BinaryOp::Mod => [ModI, ModI, ModI],
        BinaryOp::Lt => [LtI, LtF, LtS],
        BinaryOp::Le => [LeI, LeF, LeS],
        BinaryOp::Gt => [GtI, GtF, GtS],
        BinaryOp::Ge => [GeI, GeF, GeS],
        BinaryOp::Eq => [EqI, EqF, EqS],
        BinaryOp::Ne => [NeI, NeF, NeS],
        BinaryOp::And => [And, And, And],
        BinaryOp::Or => [Or, Or, Or],
        BinaryOp::Subscript => [IndexA, IndexA, IndexS],
    };
    match form {
        Form::Int => int,
        Form::Float => float,
        Form::Str => string,
    }
}

#[cfg(test)]
#[path = "bytecode_test.rs"]
mod bytecode_test;
