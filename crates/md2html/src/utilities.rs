//! Utility functions for scanning Markdown source lines.

use std::borrow::Cow;

/// Width of a tab stop when measuring indentation
pub const TAB_STOP: usize = 4;

/// Characters that may be backslash-escaped
pub fn is_escapable(c: char) -> bool {
    c.is_ascii_punctuation()
}

/// Check whether a line is empty or whitespace-only
pub fn is_blank(line: &str) -> bool {
    line.chars().all(|c| c == ' ' || c == '\t')
}

/// Measure leading indentation in columns and return the rest of the line.
///
/// Tabs advance to the next multiple of [`TAB_STOP`].
pub fn split_indent(line: &str) -> (usize, &str) {
    let mut columns = 0;
    for (i, c) in line.char_indices() {
        match c {
            ' ' => columns += 1,
            '\t' => columns += TAB_STOP - columns % TAB_STOP,
            _ => return (columns, &line[i..]),
        }
    }
    (columns, "")
}

/// Remove up to `columns` columns of leading whitespace
pub fn strip_columns(line: &str, columns: usize) -> &str {
    let mut seen = 0;
    for (i, c) in line.char_indices() {
        if seen >= columns {
            return &line[i..];
        }
        match c {
            ' ' => seen += 1,
            '\t' => seen += TAB_STOP - seen % TAB_STOP,
            _ => return &line[i..],
        }
    }
    ""
}

/// Count how many times `c` repeats at the start of `s`
pub fn run_length(s: &str, c: char) -> usize {
    s.chars().take_while(|&x| x == c).count()
}

/// Normalize `\r\n` and lone `\r` line endings to `\n`
pub fn normalize_newlines(text: &str) -> Cow<'_, str> {
    if text.contains('\r') {
        Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_indent() {
        assert_eq!(split_indent("   foo"), (3, "foo"));
        assert_eq!(split_indent("\tfoo"), (4, "foo"));
        assert_eq!(split_indent("  \tfoo"), (4, "foo"));
        assert_eq!(split_indent("    "), (4, ""));
    }

    #[test]
    fn test_strip_columns() {
        assert_eq!(strip_columns("    code", 2), "  code");
        assert_eq!(strip_columns(" code", 4), "code");
        assert_eq!(strip_columns("\tcode", 2), "code");
    }

    #[test]
    fn test_is_blank() {
        assert!(is_blank(""));
        assert!(is_blank(" \t "));
        assert!(!is_blank(" x"));
    }

    #[test]
    fn test_run_length() {
        assert_eq!(run_length("```rust", '`'), 3);
        assert_eq!(run_length("~~", '`'), 0);
    }

    #[test]
    fn test_normalize_newlines() {
        assert_eq!(normalize_newlines("a\r\nb\rc"), "a\nb\nc");
        assert!(matches!(normalize_newlines("a\nb"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_is_escapable() {
        assert!(is_escapable('*'));
        assert!(is_escapable('\\'));
        assert!(!is_escapable('a'));
        assert!(!is_escapable(' '));
    }
}
