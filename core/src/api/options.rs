//! Options for compiling and running programs.

use crate::vm::DEFAULT_MAX_CALL_DEPTH;

/// Options that control compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Run the constant-folding pass before code generation.
    pub optimize: bool,
    /// Treat warnings as errors: a program with warnings fails to compile.
    pub warnings_as_errors: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            optimize: true,
            warnings_as_errors: false,
        }
    }
}

/// Options that control execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Maximum nesting of user function calls before execution faults.
    pub max_call_depth: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }
}
