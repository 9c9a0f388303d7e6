//! File input utilities.

use std::io::Read;

/// Read input from a file path or stdin if path is "-".
///
/// Returns the content and a display name for error messages.
pub fn read_input(path: &str) -> Result<(String, String), String> {
    if is_stdin(path) {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .map_err(|e| format!("<stdin>: {}", e))?;
        Ok((content, "<stdin>".to_string()))
    } else {
        let content = std::fs::read_to_string(path).map_err(|e| format!("{}: {}", path, e))?;
        Ok((content, path.to_string()))
    }
}

/// Check if the path represents stdin.
pub fn is_stdin(path: &str) -> bool {
    path == "-"
}

/// Blank out a leading `#!` line so scripts can be made executable.
///
/// The line is replaced by nothing but its newline, which keeps every
/// reported line number pointing at the original file.
pub fn strip_shebang(content: &str) -> (Option<&str>, String) {
    match content.strip_prefix("#!") {
        Some(rest) => {
            let end = rest.find('\n').unwrap_or(rest.len());
            let line = &content[..end + 2];
            (Some(line), rest[end..].to_string())
        }
        None => (None, content.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shebang_is_removed_but_newline_kept() {
        let (line, rest) = strip_shebang("#!/usr/bin/env vesper run\nprint(1);\n");
        assert_eq!(line, Some("#!/usr/bin/env vesper run"));
        assert_eq!(rest, "\nprint(1);\n");
    }

    #[test]
    fn content_without_shebang_is_untouched() {
        let (line, rest) = strip_shebang("print(1);");
        assert_eq!(line, None);
        assert_eq!(rest, "print(1);");
    }

    #[test]
    fn shebang_only_file() {
        let (line, rest) = strip_shebang("#!vesper");
        assert_eq!(line, Some("#!vesper"));
        assert_eq!(rest, "");
    }

    #[test]
    fn dash_means_stdin() {
        assert!(is_stdin("-"));
        assert!(!is_stdin("prog.vsp"));
    }
}
