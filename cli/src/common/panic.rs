//! Panic handler for user-friendly crash reporting.

use std::fmt;
use std::panic::PanicHookInfo;

/// Install the custom panic handler.
///
/// This should be called early in main() before any other initialization.
pub fn install_handler() {
    std::panic::set_hook(Box::new(panic_hook));
}

fn panic_hook(info: &PanicHookInfo<'_>) {
    let report = CrashReport::from_hook(info);
    eprintln!("\nvesper crashed unexpectedly!\n");
    eprintln!("{report}");
    eprintln!("\nPlease include the report above and the program you ran when filing a bug.");
}

/// Everything needed to reproduce a crash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrashReport {
    pub version: String,
    pub os: String,
    pub arch: String,
    pub location: String,
    /// Command line arguments, program name excluded.
    pub command_line: Vec<String>,
    pub message: String,
}

impl CrashReport {
    fn from_hook(info: &PanicHookInfo<'_>) -> Self {
        let message = info
            .payload()
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| info.payload().downcast_ref::<String>().map(|s| s.as_str()))
            .unwrap_or("unknown");

        let location = info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "unknown".to_string());

        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            location,
            command_line: std::env::args().skip(1).collect(),
            message: message.to_string(),
        }
    }

    /// The command line as typed, with arguments containing whitespace or
    /// quotes wrapped in single quotes.
    pub fn format_command_line(&self) -> Option<String> {
        if self.command_line.is_empty() {
            return None;
        }
        let args: Vec<String> = self.command_line.iter().map(|a| quote(a)).collect();
        Some(format!("vesper {}", args.join(" ")))
    }
}

fn quote(arg: &str) -> String {
    let needs_quotes =
        arg.is_empty() || arg.chars().any(|c| c.is_whitespace() || "'\"\\$`".contains(c));
    if needs_quotes {
        format!("'{}'", arg.replace('\'', r"'\''"))
    } else {
        arg.to_string()
    }
}

impl fmt::Display for CrashReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "message:  {}", self.message)?;
        writeln!(f, "location: {}", self.location)?;
        write!(f, "version:  {} ({}-{})", self.version, self.os, self.arch)?;
        if let Some(command) = self.format_command_line() {
            write!(f, "\ncommand:  {command}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(command_line: &[&str]) -> CrashReport {
        CrashReport {
            version: "0.1.0".to_string(),
            os: "linux".to_string(),
            arch: "x86_64".to_string(),
            location: "core/src/vm/vm.rs:42:5".to_string(),
            command_line: command_line.iter().map(|s| s.to_string()).collect(),
            message: "index out of bounds".to_string(),
        }
    }

    #[test]
    fn format_command_line_escapes_spaces() {
        assert_eq!(
            report(&["run", "my prog.vsp"]).format_command_line(),
            Some("vesper run 'my prog.vsp'".to_string())
        );
    }

    #[test]
    fn format_command_line_escapes_single_quotes() {
        assert_eq!(
            report(&["run", "it's.vsp"]).format_command_line(),
            Some(r"vesper run 'it'\''s.vsp'".to_string())
        );
    }

    #[test]
    fn empty_command_line_is_omitted() {
        assert_eq!(report(&[]).format_command_line(), None);
        assert!(!report(&[]).to_string().contains("command:"));
    }

    #[test]
    fn display_lists_all_fields() {
        let text = report(&["check", "a.vsp"]).to_string();
        assert_eq!(
            text,
            "message:  index out of bounds\n\
             location: core/src/vm/vm.rs:42:5\n\
             version:  0.1.0 (linux-x86_64)\n\
             command:  vesper check a.vsp"
        );
    }
}
