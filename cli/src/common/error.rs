//! Error handling utilities for the CLI.

use vesper::{Diagnostic, Error, RenderConfig, render_diagnostics, render_error_to};

fn config(no_color: bool, filename: Option<&str>) -> RenderConfig<'_> {
    RenderConfig {
        color: !no_color,
        filename,
        ..Default::default()
    }
}

/// Render an error to stderr.
pub fn render_error(error: &Error, filename: Option<&str>, no_color: bool) {
    render_error_to(error, &mut std::io::stderr(), &config(no_color, filename)).ok();
}

/// Render warnings of a program that compiled to stderr.
pub fn render_warnings(source: &str, warnings: &[Diagnostic], filename: &str, no_color: bool) {
    if warnings.is_empty() {
        return;
    }
    render_diagnostics(
        source,
        warnings,
        &mut std::io::stderr(),
        &config(no_color, Some(filename)),
    )
    .ok();
}
