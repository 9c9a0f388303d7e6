//! Name resolution and type checking.
//!
//! The checker walks the tree once, assigning variable slots and function
//! ids and recording checked types on the nodes that need them later. Minor
//! errors are collected in the [`CompilationContext`]; the first fatal error
//! stops the walk.

mod checker;
mod context;
mod error;
mod scope;
mod statements;

pub use checker::{CheckResult, Checker, Resolved, type_check};
pub use context::CompilationContext;
pub use error::{CompileError, codes};
pub use scope::{FunctionSig, FunctionTable, MAX_SLOTS, ScopeStack, Variable};
pub use statements::analyze;

#[cfg(test)]
#[path = "analyzer_test.rs"]
mod analyzer_test;
