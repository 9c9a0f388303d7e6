//! Public error types for the Vesper API.
//!
//! Internal errors (lexing, parsing, fatal checker errors, VM faults) are
//! converted to these types at the API boundary.

use core::fmt;

use crate::syntax::Span;

/// Public error type for all Vesper operations.
#[derive(Debug)]
pub enum Error {
    /// Lex, parse or type errors. Warnings collected before the failure are
    /// included alongside the errors.
    Compilation {
        diagnostics: Vec<Diagnostic>,
        source: String,
    },

    /// A fault raised while the VM was executing.
    Runtime {
        diagnostic: Diagnostic,
        source: String,
    },

    /// Resource limits exceeded (call depth or allocation size).
    ResourceExceeded(String),

    /// Reading input or writing program output failed.
    Io(String),
}

impl Error {
    /// Diagnostics carried by this error, if any.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            Error::Compilation { diagnostics, .. } => diagnostics,
            Error::Runtime { diagnostic, .. } => core::slice::from_ref(diagnostic),
            _ => &[],
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Compilation { diagnostics, .. } => {
                let error_count = diagnostics
                    .iter()
                    .filter(|d| d.severity == Severity::Error)
                    .count();
                write!(f, "Compilation failed with {} error(s)", error_count)
            }
            Error::Runtime { diagnostic, .. } => {
                write!(f, "Runtime error: {}", diagnostic.message)
            }
            Error::ResourceExceeded(msg) => write!(f, "Resource limit exceeded: {}", msg),
            Error::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

/// A diagnostic message (error, warning, or info) with source location.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// Severity level (error, warning, info).
    pub severity: Severity,

    /// Primary diagnostic message.
    pub message: String,

    /// Source location of the primary issue.
    pub span: Span,

    /// Related locations that provide additional context.
    pub related: Vec<RelatedInfo>,

    /// Help messages suggesting how to fix the issue.
    pub help: Vec<String>,

    /// Optional error code (e.g., "E001") for documentation lookup.
    pub code: Option<String>,
}

impl Diagnostic {
    pub fn error(code: &str, message: impl Into<String>, span: Span) -> Self {
        Self::new(Severity::Error, code, message, span)
    }

    pub fn warning(code: &str, message: impl Into<String>, span: Span) -> Self {
        Self::new(Severity::Warning, code, message, span)
    }

    fn new(severity: Severity, code: &str, message: impl Into<String>, span: Span) -> Self {
        Diagnostic {
            severity,
            message: message.into(),
            span,
            related: Vec::new(),
            help: Vec::new(),
            code: Some(code.to_owned()),
        }
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help.push(help.into());
        self
    }

    pub fn with_related(mut self, span: Span, message: impl Into<String>) -> Self {
        self.related.push(RelatedInfo {
            span,
            message: message.into(),
        });
        self
    }
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Error - compilation cannot succeed.
    Error,
    /// Warning - suspicious code that might be wrong.
    Warning,
    /// Info - informational message.
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// Related information for a diagnostic (e.g., "declared here").
#[derive(Debug, Clone, PartialEq)]
pub struct RelatedInfo {
    /// Source location of the related information.
    pub span: Span,

    /// Message explaining the relevance.
    pub message: String,
}

// ============================================================================
// Conversion from internal errors
// ============================================================================

impl crate::parser::ParseError {
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error("P001", self.message.clone(), self.span.clone())
    }
}

impl crate::analyzer::CompileError {
    pub fn to_diagnostic(&self) -> Diagnostic {
        let mut diagnostic = Diagnostic::error(self.code, self.message.clone(), self.span.clone());
        if let Some(help) = &self.help {
            diagnostic = diagnostic.with_help(help.clone());
        }
        diagnostic
    }
}

impl Error {
    pub(crate) fn from_parse(err: crate::parser::ParseError, source: &str) -> Self {
        Error::Compilation {
            diagnostics: vec![err.to_diagnostic()],
            source: source.to_owned(),
        }
    }

    /// A fatal compile error, reported after the diagnostics gathered so far.
    pub(crate) fn from_compile(
        err: crate::analyzer::CompileError,
        mut diagnostics: Vec<Diagnostic>,
        source: &str,
    ) -> Self {
        diagnostics.push(err.to_diagnostic());
        Error::Compilation {
            diagnostics,
            source: source.to_owned(),
        }
    }

    pub(crate) fn from_runtime(err: crate::vm::RuntimeError, source: &str) -> Self {
        use crate::vm::RuntimeError;
        match err {
            RuntimeError::CallDepthExceeded(_) | RuntimeError::AllocationTooLarge { .. } => {
                Error::ResourceExceeded(err.to_string())
            }
            RuntimeError::Io(msg) => Error::Io(msg),
            other => Error::Runtime {
                diagnostic: Diagnostic::error("R001", other.to_string(), Span::default()),
                source: source.to_owned(),
            },
        }
    }
}
