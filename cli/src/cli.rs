//! Command-line interface definitions.
//!
//! This module contains only clap struct definitions - no business logic.
//! All command implementations are in the `commands` module.

use clap::{Args, Parser, Subcommand};
use vesper_core::vm::DEFAULT_MAX_CALL_DEPTH;

/// Vesper - a small statically typed language compiled to bytecode
#[derive(Parser, Debug)]
#[command(name = "vesper", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile and run a program
    Run(RunArgs),

    /// Type-check programs without running them
    Check(CheckArgs),

    /// Print the bytecode generated for a program
    Disasm(DisasmArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Compiler flags shared by every command that compiles.
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct CompileArgs {
    /// Skip constant folding and dead branch removal
    #[arg(long)]
    pub no_optimize: bool,

    /// Treat warnings as errors
    #[arg(long)]
    pub deny_warnings: bool,
}

/// Arguments for the `run` command.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Program to run (use "-" for stdin)
    pub file: String,

    #[command(flatten)]
    pub compile: CompileArgs,

    /// Maximum nesting of function calls before the program is aborted
    #[arg(long, default_value_t = DEFAULT_MAX_CALL_DEPTH)]
    pub max_call_depth: usize,

    /// Print compile and run times to stderr
    #[arg(long)]
    pub time: bool,
}

/// Arguments for the `check` command.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Files to check (use "-" for stdin)
    #[arg(required = true)]
    pub files: Vec<String>,

    #[command(flatten)]
    pub compile: CompileArgs,

    /// Only report failures through the exit code
    #[arg(short, long)]
    pub quiet: bool,
}

/// Arguments for the `disasm` command.
#[derive(Args, Debug)]
pub struct DisasmArgs {
    /// Program to disassemble (use "-" for stdin)
    pub file: String,

    #[command(flatten)]
    pub compile: CompileArgs,
}

/// Arguments for the `completions` command.
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
