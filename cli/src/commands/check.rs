//! The `check` command - type-check Vesper files without running.

use std::process::ExitCode;

use vesper::{RenderConfig, Severity, render_diagnostics};

use crate::cli::{CheckArgs, CompileArgs};
use crate::common::engine::build_engine;
use crate::common::input::{read_input, strip_shebang};

/// Run the check command.
pub fn run(args: CheckArgs, no_color: bool) -> ExitCode {
    let mut has_errors = false;

    for file in &args.files {
        if !check_file(file, args.compile, args.quiet, no_color) {
            has_errors = true;
        }
    }

    if has_errors {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Check a single file. Returns true if OK, false if errors.
fn check_file(path: &str, compile: CompileArgs, quiet: bool, no_color: bool) -> bool {
    let (content, display_name) = match read_input(path) {
        Ok(c) => c,
        Err(e) => {
            if !quiet {
                eprintln!("error: {}", e);
            }
            return false;
        }
    };
    let (_, content) = strip_shebang(&content);

    let diagnostics = build_engine(compile).check(&content);
    let failed = diagnostics.iter().any(|d| {
        d.severity == Severity::Error || (compile.deny_warnings && d.severity == Severity::Warning)
    });

    if !quiet {
        let config = RenderConfig {
            color: !no_color,
            filename: Some(&display_name),
            ..Default::default()
        };
        render_diagnostics(&content, &diagnostics, &mut std::io::stderr(), &config).ok();
        if !failed {
            println!("{}: OK", display_name);
        }
    }
    !failed
}
