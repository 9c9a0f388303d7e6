use thiserror::Error;

use crate::syntax::Span;

/// Diagnostic codes shared by the checker, the optimizer and the generator.
pub mod codes {
    pub const TYPE_MISMATCH: &str = "E001";
    pub const UNDEFINED_VARIABLE: &str = "E002";
    pub const UNDEFINED_FUNCTION: &str = "E003";
    pub const WRONG_ARITY: &str = "E004";
    pub const DUPLICATE_DEFINITION: &str = "E005";
    pub const VOID_VALUE: &str = "E006";
    pub const INDEX_OUT_OF_BOUNDS: &str = "E007";
    pub const TOO_MANY_SLOTS: &str = "E008";
    pub const RETURN_MISMATCH: &str = "E009";
    pub const INTERNAL: &str = "E999";

    pub const FALSE_CONDITIONAL: &str = "W001";
    pub const FALSE_LOOP: &str = "W002";
    pub const DIVISION_BY_ZERO: &str = "W003";
    pub const TRUNCATED_INITIALIZER: &str = "W004";
}

/// A fatal compile-time error. Compilation stops at the first one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct CompileError {
    pub code: &'static str,
    pub message: String,
    pub span: Span,
    pub help: Option<String>,
}

impl CompileError {
    pub fn new(code: &'static str, message: impl Into<String>, span: Span) -> Self {
        CompileError {
            code,
            message: message.into(),
            span,
            help: None,
        }
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// A node reached a later stage without the information the checker
    /// records on it.
    pub fn internal(message: impl Into<String>, span: Span) -> Self {
        Self::new(codes::INTERNAL, message, span)
    }
}
