//! Compiler and virtual machine for Vesper, a small statically typed
//! imperative language.
//!
//! Source is lexed and parsed into statements whose expressions live in an
//! [`syntax::ExprArena`], type checked, constant folded, and lowered to a
//! compact postfix bytecode that the stack-based [`vm::Vm`] executes.
//! Most users only need [`api::Engine`].

pub mod analyzer;
pub mod api;
pub mod builtins;
pub mod compiler;
pub mod lexer;
pub mod optimizer;
pub mod parser;
pub mod syntax;
pub mod types;
pub mod vm;
