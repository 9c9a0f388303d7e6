//! Shared engine setup.

use vesper::{CompileOptions, Engine};

use crate::cli::CompileArgs;

/// Build an engine configured from the shared compiler flags.
pub fn build_engine(args: CompileArgs) -> Engine {
    Engine::new(CompileOptions {
        optimize: !args.no_optimize,
        warnings_as_errors: args.deny_warnings,
    })
}
