//! The Vesper compilation engine.

use std::io::{BufRead, Write};

use super::{CompileOptions, Diagnostic, Error, RunOptions, Severity};
use crate::analyzer::{self, CompilationContext};
use crate::compiler::{self, DecodeError, Program};
use crate::syntax::Ast;
use crate::vm::Vm;
use crate::{optimizer, parser};

/// Compiles Vesper source into programs for the VM.
///
/// The pipeline is lex and parse, type check, constant folding (unless
/// disabled) and bytecode generation. Code generation is never attempted
/// once the checker has reported an error.
///
/// # Example
///
/// ```
/// use vesper_core::api::{CompileOptions, Engine};
///
/// let engine = Engine::new(CompileOptions::default());
/// let diagnostics = engine.check("x int = 1.5;");
/// assert_eq!(diagnostics[0].code.as_deref(), Some("E001"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Engine {
    options: CompileOptions,
}

impl Engine {
    pub fn new(options: CompileOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Compiles a whole program.
    ///
    /// On success the returned program carries any warnings that were
    /// reported along the way. On failure every diagnostic gathered up to
    /// the failure is part of the error.
    pub fn compile(&self, source: &str) -> Result<CompiledProgram, Error> {
        let (ast, ctx) = self.front_end(source)?;
        let program = compiler::generate_program(&ast, &ctx)
            .map_err(|err| Error::from_compile(err, ctx.diagnostics.clone(), source))?;

        let warnings: Vec<Diagnostic> = ctx.warnings().cloned().collect();
        if self.options.warnings_as_errors && !warnings.is_empty() {
            return Err(Error::Compilation {
                diagnostics: warnings
                    .into_iter()
                    .map(|mut d| {
                        d.severity = Severity::Error;
                        d
                    })
                    .collect(),
                source: source.to_owned(),
            });
        }

        tracing::debug!(
            bytes = program.code_size(),
            functions = program.functions.len(),
            warnings = warnings.len(),
            "Compiled program"
        );
        Ok(CompiledProgram {
            program,
            warnings,
            source: source.to_owned(),
        })
    }

    /// Runs every compile-time check without generating code and returns
    /// the diagnostics, fatal ones included.
    pub fn check(&self, source: &str) -> Vec<Diagnostic> {
        match self.front_end(source) {
            Ok((_, ctx)) => ctx.diagnostics,
            Err(err) => err.diagnostics().to_vec(),
        }
    }

    fn front_end(&self, source: &str) -> Result<(Ast, CompilationContext), Error> {
        let mut ast = parser::parse(source).map_err(|err| Error::from_parse(err, source))?;
        let mut ctx = CompilationContext::new();

        if let Err(err) = analyzer::analyze(&mut ast, &mut ctx) {
            return Err(Error::from_compile(err, ctx.diagnostics, source));
        }
        if ctx.has_errors() {
            return Err(Error::Compilation {
                diagnostics: ctx.diagnostics,
                source: source.to_owned(),
            });
        }

        if self.options.optimize {
            if let Err(err) = optimizer::optimize_program(&mut ast, &mut ctx) {
                return Err(Error::from_compile(err, ctx.diagnostics, source));
            }
        }
        Ok((ast, ctx))
    }
}

/// A compiled program, ready to run any number of times.
#[derive(Debug, Clone)]
pub struct CompiledProgram {
    program: Program,
    warnings: Vec<Diagnostic>,
    source: String,
}

impl CompiledProgram {
    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Human-readable listing of the generated bytecode.
    pub fn disassemble(&self) -> Result<String, DecodeError> {
        compiler::disassemble(&self.program)
    }

    /// Executes the program with fresh variables. Output goes to `out`;
    /// `input()` reads lines from `input`.
    pub fn run(
        &self,
        options: RunOptions,
        out: &mut dyn Write,
        input: &mut dyn BufRead,
    ) -> Result<(), Error> {
        let mut vm =
            Vm::new(&self.program, out, input).with_max_call_depth(options.max_call_depth);
        vm.run()
            .map_err(|err| Error::from_runtime(err, &self.source))
    }
}
