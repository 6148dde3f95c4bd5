//! Line classification.
//!
//! Tags every source line with its structural role before block parsing.
//! Rules are checked in priority order and the first match wins:
//! thematic break, ATX heading, code fence, blockquote marker, list marker,
//! blank, paragraph text. While a fence is open only the matching close
//! fence is recognized; every other line is literal code.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::utilities::{is_blank, run_length, split_indent, strip_columns};

static ORDERED_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{1,9})([.)])").expect("ordered marker pattern"));

/// Blockquotes and list items nest at most this deep. Markers past the
/// limit are read as paragraph text.
pub const MAX_NESTING: usize = 64;

/// A code fence delimiter: character and run length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fence {
    pub marker: char,
    pub len: usize,
}

/// Kind of list marker, which decides whether two items share a list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    /// `-`, `*` or `+`
    Bullet(char),
    /// `<number>.` or `<number>)`
    Ordered(char),
}

impl ListKind {
    pub fn is_ordered(&self) -> bool {
        matches!(self, ListKind::Ordered(_))
    }
}

/// A list item marker and the classified content after it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListMarker<'a> {
    pub kind: ListKind,
    /// Start number for ordered markers, 1 for bullets
    pub start: u32,
    /// Columns from the marker to the item content
    pub content_offset: usize,
    /// The rest of the line, classified on its own
    pub rest: Box<Line<'a>>,
}

/// Structural role of a source line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role<'a> {
    ThematicBreak,
    Heading { level: u8, text: &'a str },
    FenceOpen { fence: Fence, language: Option<&'a str> },
    FenceClose,
    /// Literal line inside an open fence
    CodeLine(&'a str),
    Blockquote(Box<Line<'a>>),
    ListItem(ListMarker<'a>),
    Blank,
    /// Paragraph text, leading whitespace removed
    Text(&'a str),
}

/// A classified line: leading indentation in columns plus its role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line<'a> {
    pub indent: usize,
    /// Source text after the indentation, markers included
    pub text: &'a str,
    pub role: Role<'a>,
}

impl<'a> Line<'a> {
    fn new(indent: usize, text: &'a str, role: Role<'a>) -> Self {
        Self { indent, text, role }
    }
}

/// Classify a single line outside of any code fence.
pub fn classify_line(line: &str) -> Line<'_> {
    classify_nested(line, 0)
}

/// `depth` counts the container markers already consumed on this line
fn classify_nested(line: &str, depth: usize) -> Line<'_> {
    let (indent, rest) = split_indent(line);

    if rest.is_empty() {
        return Line::new(indent, rest, Role::Blank);
    }
    if is_thematic_break(rest) {
        return Line::new(indent, rest, Role::ThematicBreak);
    }
    if let Some(role) = heading(rest) {
        return Line::new(indent, rest, role);
    }
    if let Some(role) = fence_open(rest) {
        return Line::new(indent, rest, role);
    }
    if depth < MAX_NESTING {
        if let Some(after) = rest.strip_prefix('>') {
            let after = after.strip_prefix(' ').unwrap_or(after);
            let inner = classify_nested(after, depth + 1);
            return Line::new(indent, rest, Role::Blockquote(Box::new(inner)));
        }
        if let Some(marker) = list_marker(rest, depth) {
            return Line::new(indent, rest, Role::ListItem(marker));
        }
    }
    Line::new(indent, rest, Role::Text(rest))
}

fn is_thematic_break(s: &str) -> bool {
    let marker = match s.chars().next() {
        Some(c @ ('-' | '*' | '_')) => c,
        _ => return false,
    };
    let mut count = 0;
    for c in s.chars() {
        if c == marker {
            count += 1;
        } else if c != ' ' && c != '\t' {
            return false;
        }
    }
    count >= 3
}

fn heading(s: &str) -> Option<Role<'_>> {
    let level = run_length(s, '#');
    if level == 0 || level > 6 {
        return None;
    }
    let after = &s[level..];
    if !(after.is_empty() || after.starts_with(' ') || after.starts_with('\t')) {
        return None;
    }
    Some(Role::Heading {
        level: level as u8,
        text: strip_closing_hashes(after.trim()),
    })
}

/// Drop an optional closing `#` sequence (`## Title ##`)
fn strip_closing_hashes(text: &str) -> &str {
    let without = text.trim_end_matches('#');
    if without.is_empty() {
        return without;
    }
    if without.len() != text.len() && (without.ends_with(' ') || without.ends_with('\t')) {
        without.trim_end()
    } else {
        text
    }
}

fn fence_open(s: &str) -> Option<Role<'_>> {
    let marker = match s.chars().next() {
        Some(c @ ('`' | '~')) => c,
        _ => return None,
    };
    let len = run_length(s, marker);
    if len < 3 {
        return None;
    }
    let info = s[len..].trim();
    if marker == '`' && info.contains('`') {
        return None;
    }
    Some(Role::FenceOpen {
        fence: Fence { marker, len },
        language: info.split_whitespace().next(),
    })
}

fn list_marker(s: &str, depth: usize) -> Option<ListMarker<'_>> {
    let (kind, start, width) = match s.chars().next() {
        Some(c @ ('-' | '*' | '+')) => (ListKind::Bullet(c), 1, 1),
        _ => {
            let caps = ORDERED_MARKER.captures(s)?;
            let number = caps.get(1)?.as_str();
            let delimiter = caps.get(2)?.as_str().chars().next()?;
            (
                ListKind::Ordered(delimiter),
                number.parse().ok()?,
                number.len() + 1,
            )
        }
    };

    let after = &s[width..];
    if !(after.is_empty() || after.starts_with(' ') || after.starts_with('\t')) {
        return None;
    }

    let (gap, content) = split_indent(after);
    let (content_offset, rest) = if content.is_empty() {
        (width + 1, Line::new(0, content, Role::Blank))
    } else if gap > 4 {
        // Wide gaps keep their extra indentation as part of the content
        (width + 1, classify_nested(strip_columns(after, 1), depth + 1))
    } else {
        (width + gap, classify_nested(content, depth + 1))
    };

    Some(ListMarker {
        kind,
        start,
        content_offset,
        rest: Box::new(rest),
    })
}

/// An open fence as seen by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenFence {
    /// Number of `>` markers in front of the fence
    quotes: usize,
    /// Column of the fence inside its innermost quote
    column: usize,
    fence: Fence,
}

/// Lazy classifier over the lines of a document.
///
/// Yields one `(raw line, classified line)` pair per input line, in order.
/// Restart by calling [`classify`] again on the same input.
pub struct Classifier<'a> {
    lines: std::str::Lines<'a>,
    open_fence: Option<OpenFence>,
}

/// Classify every line of `input`
pub fn classify(input: &str) -> Classifier<'_> {
    Classifier {
        lines: input.lines(),
        open_fence: None,
    }
}

impl<'a> Iterator for Classifier<'a> {
    type Item = (&'a str, Line<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        let raw = self.lines.next()?;

        let line = match self.open_fence {
            Some(open) => match classify_in_fence(raw, open) {
                Some(line) => {
                    if ends_fence(&line) {
                        self.open_fence = None;
                    }
                    return Some((raw, line));
                }
                None => {
                    self.open_fence = None;
                    classify_line(raw)
                }
            },
            None => classify_line(raw),
        };

        self.open_fence = find_fence_open(&line, 0, 0);
        Some((raw, line))
    }
}

/// Classify a line while a fence is open. Returns `None` when the line lacks
/// the fence's blockquote markers, which ends the fence.
fn classify_in_fence(raw: &str, open: OpenFence) -> Option<Line<'_>> {
    let mut quotes = Vec::with_capacity(open.quotes);
    let mut rest = raw;
    for _ in 0..open.quotes {
        let (indent, text) = split_indent(rest);
        let after = text.strip_prefix('>')?;
        quotes.push((indent, text));
        rest = after.strip_prefix(' ').unwrap_or(after);
    }

    let (indent, trimmed) = split_indent(rest);
    let close_len = run_length(trimmed, open.fence.marker);
    let role = if close_len >= open.fence.len && is_blank(&trimmed[close_len * open.fence.marker.len_utf8()..])
    {
        Role::FenceClose
    } else {
        Role::CodeLine(strip_columns(rest, open.column))
    };

    let mut line = Line::new(indent, trimmed, role);
    for (indent, text) in quotes.into_iter().rev() {
        line = Line::new(indent, text, Role::Blockquote(Box::new(line)));
    }
    Some(line)
}

fn ends_fence(line: &Line<'_>) -> bool {
    match &line.role {
        Role::FenceClose => true,
        Role::Blockquote(inner) => ends_fence(inner),
        _ => false,
    }
}

fn find_fence_open(line: &Line<'_>, quotes: usize, column: usize) -> Option<OpenFence> {
    match &line.role {
        Role::FenceOpen { fence, .. } => Some(OpenFence {
            quotes,
            column: column + line.indent,
            fence: *fence,
        }),
        Role::Blockquote(inner) => find_fence_open(inner, quotes + 1, 0),
        Role::ListItem(marker) => find_fence_open(
            &marker.rest,
            quotes,
            column + line.indent + marker.content_offset,
        ),
        _ => None,
    }
}
