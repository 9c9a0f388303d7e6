//! Vesper - a small statically typed imperative language
//!
//! # Overview
//!
//! Vesper programs are compiled to a compact, type-specialized postfix
//! bytecode and executed on a stack-based virtual machine. The language has
//! `bool`, `char`, `int`, `float` and `str` values, arrays of any of them,
//! top-level functions, `if`/`elif`/`else`, `while` and `for`.
//!
//! # Quick Start
//!
//! ```
//! use vesper::{CompileOptions, Engine, RunOptions};
//!
//! let engine = Engine::new(CompileOptions::default());
//! let program = engine
//!     .compile("def sq(n int) int { return n * n; } print(sq(7));")
//!     .unwrap();
//!
//! let mut out = Vec::new();
//! program.run(RunOptions::default(), &mut out, &mut &b""[..]).unwrap();
//! assert_eq!(out, b"49");
//! ```
//!
//! # Diagnostics
//!
//! Compilation collects every recoverable error before giving up, and
//! reports warnings for code the optimizer proves dead. Use
//! [`render_error`] or [`render_error_to`] to print them with source
//! snippets.

// Error rendering utilities
pub mod error_renderer;
pub use error_renderer::{CharSet, RenderConfig, render_diagnostics, render_error, render_error_to};

// Re-export public API from vesper_core
pub use vesper_core::api::{
    CompileOptions, CompiledProgram, Diagnostic, Engine, Error, RelatedInfo, RunOptions, Severity,
};

// Re-export the pieces needed to inspect compiled programs
pub use vesper_core::compiler::{self, Opcode, Program, disassemble};
pub use vesper_core::types::{self, Primitive, Type};
pub use vesper_core::vm::{RuntimeError, Value};
