//! The `run` command - compile and run a Vesper file.

use std::io::Write as _;
use std::process::ExitCode;
use std::time::Instant;

use vesper::RunOptions;

use crate::cli::RunArgs;
use crate::common::engine::build_engine;
use crate::common::error::{render_error, render_warnings};
use crate::common::input::{read_input, strip_shebang};

/// Run the run command.
///
/// The program's `input()` reads from stdin. When the program itself came
/// from stdin it has already consumed it, so `input()` sees end of input.
pub fn run(args: RunArgs, no_color: bool) -> ExitCode {
    let (content, display_name) = match read_input(&args.file) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Strip shebang line if present (e.g., #!/usr/bin/env vesper run)
    let (_, content) = strip_shebang(&content);

    let engine = build_engine(args.compile);
    let compile_start = Instant::now();
    let program = match engine.compile(&content) {
        Ok(program) => program,
        Err(e) => {
            render_error(&e, Some(&display_name), no_color);
            return ExitCode::FAILURE;
        }
    };
    let compile_time = compile_start.elapsed();
    render_warnings(&content, program.warnings(), &display_name, no_color);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut input = std::io::stdin().lock();
    let options = RunOptions {
        max_call_depth: args.max_call_depth,
    };

    let run_start = Instant::now();
    let result = program.run(options, &mut out, &mut input);
    let run_time = run_start.elapsed();
    out.flush().ok();

    if args.time {
        eprintln!("compile: {compile_time:?}, run: {run_time:?}");
    }

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(file = %display_name, "Program aborted");
            render_error(&e, Some(&display_name), no_color);
            ExitCode::FAILURE
        }
    }
}
