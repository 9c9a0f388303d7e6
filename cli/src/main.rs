//! Vesper CLI - compile and run Vesper programs.

use std::process::ExitCode;

use clap::Parser;
use vesper_cli::cli::{Cli, Command};
use vesper_cli::{commands, common};

fn main() -> ExitCode {
    // Install panic handler for user-friendly crash reporting
    common::panic::install_handler();

    // Initialize logging subscriber
    use tracing_subscriber::{EnvFilter, fmt};

    // Use RUST_LOG environment variable to control log level
    // Default to WARN if not set
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .compact()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run(args) => commands::run::run(args, cli.no_color),
        Command::Check(args) => commands::check::run(args, cli.no_color),
        Command::Disasm(args) => commands::disasm::run(args, cli.no_color),
        Command::Completions(args) => {
            commands::completions::run(args);
            ExitCode::SUCCESS
        }
    }
}
