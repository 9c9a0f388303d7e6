use super::error::codes;
use super::scope::{FunctionTable, ScopeStack};
use crate::api::{Diagnostic, Severity};
use crate::syntax::Span;

/// State shared by every compilation stage: the symbol tables and the
/// diagnostics gathered so far.
#[derive(Debug, Default)]
pub struct CompilationContext {
    pub scopes: ScopeStack,
    pub functions: FunctionTable,
    pub diagnostics: Vec<Diagnostic>,
}

impl CompilationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a recoverable checker error.
    pub fn error(&mut self, code: &str, message: impl Into<String>, span: Span) {
        self.push(Diagnostic::error(code, message, span));
    }

    /// Records a type mismatch, the most common recoverable error.
    pub fn mismatch(&mut self, message: impl Into<String>, span: Span) {
        self.error(codes::TYPE_MISMATCH, message, span);
    }

    pub fn warning(&mut self, code: &str, message: impl Into<String>, span: Span) {
        self.push(Diagnostic::warning(code, message, span));
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        tracing::debug!(
            severity = %diagnostic.severity,
            message = %diagnostic.message,
            "Recorded diagnostic"
        );
        self.diagnostics.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }
}
