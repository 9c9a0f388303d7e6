//! Public API for the Vesper language.
//!
//! # Example
//!
//! ```
//! use vesper_core::api::{CompileOptions, Engine, RunOptions};
//!
//! let engine = Engine::new(CompileOptions::default());
//! let program = engine.compile("x int = 6 * 7; print(x);").unwrap();
//!
//! let mut out = Vec::new();
//! program.run(RunOptions::default(), &mut out, &mut &b""[..]).unwrap();
//! assert_eq!(out, b"42");
//! ```

pub mod engine;
pub mod error;
pub mod options;

pub use engine::{CompiledProgram, Engine};
pub use error::{Diagnostic, Error, RelatedInfo, Severity};
pub use options::{CompileOptions, RunOptions};
