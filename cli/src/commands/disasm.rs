//! The `disasm` command - print the bytecode listing of a Vesper file.

use std::process::ExitCode;

use crate::cli::DisasmArgs;
use crate::common::engine::build_engine;
use crate::common::error::{render_error, render_warnings};
use crate::common::input::{read_input, strip_shebang};

/// Run the disasm command.
pub fn run(args: DisasmArgs, no_color: bool) -> ExitCode {
    let (content, display_name) = match read_input(&args.file) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let (_, content) = strip_shebang(&content);

    let program = match build_engine(args.compile).compile(&content) {
        Ok(program) => program,
        Err(e) => {
            render_error(&e, Some(&display_name), no_color);
            return ExitCode::FAILURE;
        }
    };
    render_warnings(&content, program.warnings(), &display_name, no_color);

    match program.disassemble() {
        Ok(listing) => {
            print!("{listing}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
