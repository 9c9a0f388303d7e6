//! Lexical scopes and variable slot assignment.
//!
//! Variable ids index the VM's flat variable array. A block scope takes ids
//! after its parent's and hands them back when it ends, so sibling blocks
//! share slots. A function scope reserves its whole range instead: globals
//! declared after the function start above it, which lets the VM save and
//! restore exactly that range around a call.

use core::ops::Range;

use hashbrown::HashMap;
use smallvec::SmallVec;

use super::error::{CompileError, codes};
use crate::builtins::{Builtin, FIRST_USER_FUNCTION};
use crate::syntax::{FunctionId, Span, VarId, scratch_name};
use crate::types::Type;

/// Ids are a single byte on the wire.
pub const MAX_SLOTS: usize = 256;

#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub id: VarId,
    pub ty: Type,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum FrameKind {
    Global,
    Block,
    Function { returns: Option<Type> },
}

#[derive(Debug)]
struct Frame {
    kind: FrameKind,
    vars: HashMap<String, Variable>,
    first_id: usize,
    next_id: usize,
}

#[derive(Debug)]
pub struct ScopeStack {
    frames: Vec<Frame>,
    /// Highest slot count reached anywhere.
    slot_count: usize,
    /// Highest slot count reached inside the current function.
    function_high: usize,
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeStack {
    pub fn new() -> Self {
        ScopeStack {
            frames: vec![Frame {
                kind: FrameKind::Global,
                vars: HashMap::new(),
                first_id: 0,
                next_id: 0,
            }],
            slot_count: 0,
            function_high: 0,
        }
    }

    fn current(&self) -> &Frame {
        // The global frame is never popped.
        &self.frames[self.frames.len() - 1]
    }

    fn current_mut(&mut self) -> &mut Frame {
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    fn push(&mut self, kind: FrameKind) {
        let next_id = self.current().next_id;
        self.frames.push(Frame {
            kind,
            vars: HashMap::new(),
            first_id: next_id,
            next_id,
        });
    }

    pub fn push_block(&mut self) {
        self.push(FrameKind::Block);
    }

    pub fn push_function(&mut self, returns: Option<Type>) {
        self.push(FrameKind::Function { returns });
        self.function_high = self.current().next_id;
    }

    /// Ends the innermost scope. For a function scope, returns the slot range
    /// it reserved.
    pub fn pop(&mut self) -> Option<Range<usize>> {
        if self.frames.len() == 1 {
            return None;
        }
        let frame = self.frames.pop()?;
        match frame.kind {
            FrameKind::Function { .. } => {
                let range = frame.first_id..self.function_high;
                self.current_mut().next_id = self.function_high;
                tracing::debug!(?range, "Reserved function slots");
                Some(range)
            }
            _ => None,
        }
    }

    /// The id the next declaration in the current scope would get.
    pub fn next_id(&self) -> usize {
        self.current().next_id
    }

    /// Size of the variable array the VM needs.
    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    pub fn in_function(&self) -> bool {
        self.function_returns().is_some()
    }

    /// Return type of the enclosing function: `Some(None)` for `void`,
    /// `None` outside any function.
    pub fn function_returns(&self) -> Option<Option<Type>> {
        self.frames.iter().rev().find_map(|frame| match frame.kind {
            FrameKind::Function { returns } => Some(returns),
            _ => None,
        })
    }

    pub fn lookup(&self, name: &str) -> Option<&Variable> {
        self.frames.iter().rev().find_map(|frame| frame.vars.get(name))
    }

    /// Declares `name` in the current scope.
    ///
    /// Returns `Ok(Err(existing))` when the name is already visible, so the
    /// caller can report the duplicate; running out of slots is fatal.
    pub fn declare(
        &mut self,
        name: &str,
        ty: Type,
        span: Span,
    ) -> Result<Result<VarId, Variable>, CompileError> {
        if let Some(existing) = self.lookup(name) {
            return Ok(Err(existing.clone()));
        }
        self.reserve(name, ty, span).map(Ok)
    }

    /// The `k`th scratch slot of the current scope, an int visible as
    /// [`scratch_name`]`(k)`. Reserved on first use; scratch values only live
    /// within one statement, so later statements of the scope share them.
    pub fn scratch(&mut self, k: usize, span: Span) -> Result<VarId, CompileError> {
        let name = scratch_name(k);
        if let Some(var) = self.current().vars.get(&name) {
            return Ok(var.id);
        }
        self.reserve(&name, Type::INT, span)
    }

    fn reserve(&mut self, name: &str, ty: Type, span: Span) -> Result<VarId, CompileError> {
        let id = self.current().next_id;
        if id >= MAX_SLOTS {
            return Err(CompileError::new(
                codes::TOO_MANY_SLOTS,
                format!("Too many variables: at most {MAX_SLOTS} may be live at once"),
                span,
            ));
        }
        let frame = self.current_mut();
        frame.next_id += 1;
        frame.vars.insert(
            name.to_owned(),
            Variable {
                id: id as VarId,
                ty,
                span,
            },
        );
        self.slot_count = self.slot_count.max(id + 1);
        if self.in_function() {
            self.function_high = self.function_high.max(id + 1);
        }
        Ok(id as VarId)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSig {
    pub id: FunctionId,
    pub name: String,
    pub params: SmallVec<[Type; 4]>,
    pub returns: Option<Type>,
}

/// Every callable name with its overloads, built-ins included.
#[derive(Debug)]
pub struct FunctionTable {
    by_name: HashMap<String, SmallVec<[FunctionSig; 1]>>,
    next_id: usize,
}

impl Default for FunctionTable {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl FunctionTable {
    pub fn with_builtins() -> Self {
        let mut by_name: HashMap<String, SmallVec<[FunctionSig; 1]>> = HashMap::new();
        for builtin in Builtin::ALL {
            by_name
                .entry(builtin.name().to_owned())
                .or_default()
                .push(FunctionSig {
                    id: builtin.id(),
                    name: builtin.name().to_owned(),
                    params: builtin.params().iter().copied().collect(),
                    returns: builtin.returns(),
                });
        }
        FunctionTable {
            by_name,
            next_id: FIRST_USER_FUNCTION as usize,
        }
    }

    /// Registers a user function. Returns `Ok(None)` when an overload with
    /// the same parameter types already exists.
    pub fn define(
        &mut self,
        name: &str,
        params: &[Type],
        returns: Option<Type>,
        span: Span,
    ) -> Result<Option<FunctionId>, CompileError> {
        if self.find(name, params).is_some() {
            return Ok(None);
        }
        if self.next_id >= MAX_SLOTS {
            return Err(CompileError::new(
                codes::TOO_MANY_SLOTS,
                format!("Too many functions: at most {MAX_SLOTS} ids are available"),
                span,
            ));
        }
        let id = self.next_id as FunctionId;
        self.next_id += 1;
        self.by_name
            .entry(name.to_owned())
            .or_default()
            .push(FunctionSig {
                id,
                name: name.to_owned(),
                params: params.iter().copied().collect(),
                returns,
            });
        Ok(Some(id))
    }

    pub fn overloads(&self, name: &str) -> &[FunctionSig] {
        self.by_name.get(name).map(|sigs| sigs.as_slice()).unwrap_or(&[])
    }

    /// The overload of `name` whose parameters are exactly `args`.
    pub fn find(&self, name: &str, args: &[Type]) -> Option<&FunctionSig> {
        self.overloads(name)
            .iter()
            .find(|sig| sig.params.as_slice() == args)
    }
}

#[cfg(test)]
#[path = "scope_test.rs"]
mod scope_test;
