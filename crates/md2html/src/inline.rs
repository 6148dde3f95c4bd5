//! Inline parsing.
//!
//! Turns the raw text of a paragraph or heading into inline spans. Parsing
//! never fails: anything that does not form a complete construct stays
//! literal text with its original characters.
//!
//! Precedence, highest first: backslash escapes, code spans, links and
//! images, emphasis. Emphasis delimiters are collected in a first pass and
//! matched afterwards, closers left to right against the nearest earlier
//! opener.
//!
//! Every search that could run to the end of the text is either done once
//! per paragraph or remembered, so parsing stays linear in the input.

use std::collections::HashMap;

use md2html_core::{Block, BreakKind, Document, Inline, ListItem};

use crate::block::{RawBlock, RawDocument};
use crate::utilities::{is_escapable, run_length};

/// Link labels are parsed recursively at most this deep
const MAX_DEPTH: usize = 8;

/// Emphasis, strong and link spans nest at most this deep. A pair that would
/// go deeper stays literal.
pub const MAX_SPAN_DEPTH: usize = 32;

/// Parse the raw inline text of one block.
pub fn parse_inlines(text: &str) -> Vec<Inline> {
    InlineParser::new(text, false, 0).parse()
}

/// Run the inline parser over every block of a raw document.
pub fn resolve(raw: RawDocument) -> Document {
    Document::new(resolve_blocks(raw.blocks))
}

fn resolve_blocks(blocks: Vec<RawBlock>) -> Vec<Block> {
    blocks.into_iter().map(resolve_block).collect()
}

fn resolve_block(block: RawBlock) -> Block {
    match block {
        RawBlock::Heading { level, text } => Block::Heading {
            level,
            content: parse_inlines(&text),
        },
        RawBlock::Paragraph(text) => Block::Paragraph(parse_inlines(&text)),
        RawBlock::BlockQuote(blocks) => Block::BlockQuote(resolve_blocks(blocks)),
        RawBlock::List {
            ordered,
            start,
            tight,
            items,
        } => Block::List {
            ordered,
            start,
            tight,
            items: items
                .into_iter()
                .map(|blocks| ListItem::new(resolve_blocks(blocks)))
                .collect(),
        },
        RawBlock::CodeBlock { language, code } => Block::CodeBlock { language, code },
        RawBlock::ThematicBreak => Block::ThematicBreak,
    }
}

/// A run of `*` or `_` waiting to be matched
#[derive(Debug)]
struct Delimiter {
    marker: char,
    count: usize,
    can_open: bool,
    can_close: bool,
}

#[derive(Debug)]
enum Node {
    Inline(Inline),
    Delimiter(Delimiter),
}

struct InlineParser<'a> {
    src: &'a str,
    pos: usize,
    in_link: bool,
    depth: usize,
    nodes: Vec<Node>,
    text: String,
    labels: LabelScanner,
    /// Closing byte of a link title mapped to the earliest offset from which
    /// it is known to be missing
    unclosed_titles: HashMap<u8, usize>,
}

impl<'a> InlineParser<'a> {
    fn new(src: &'a str, in_link: bool, depth: usize) -> Self {
        Self {
            src,
            pos: 0,
            in_link,
            depth,
            nodes: Vec::new(),
            text: String::new(),
            labels: LabelScanner::default(),
            unclosed_titles: HashMap::new(),
        }
    }

    fn parse(mut self) -> Vec<Inline> {
        while let Some(c) = self.src[self.pos..].chars().next() {
            match c {
                '\\' => self.backslash(),
                '`' => self.code_span(),
                '*' | '_' => self.delimiter_run(c),
                '!' if self.src[self.pos + 1..].starts_with('[') => self.image(),
                '[' => self.link(),
                '\n' => self.line_ending(),
                _ => self.literal(c),
            }
        }
        self.flush_text();
        resolve_emphasis(self.nodes)
    }

    fn literal(&mut self, c: char) {
        self.text.push(c);
        self.pos += c.len_utf8();
    }

    fn flush_text(&mut self) {
        if !self.text.is_empty() {
            let text = std::mem::take(&mut self.text);
            self.nodes.push(Node::Inline(Inline::Text(text)));
        }
    }

    fn push(&mut self, inline: Inline) {
        self.flush_text();
        self.nodes.push(Node::Inline(inline));
    }

    fn backslash(&mut self) {
        match self.src[self.pos + 1..].chars().next() {
            Some('\n') => {
                self.pos += 2;
                self.push(Inline::LineBreak(BreakKind::Hard));
            }
            Some(c) if is_escapable(c) => {
                self.text.push(c);
                self.pos += 1 + c.len_utf8();
            }
            _ => self.literal('\\'),
        }
    }

    fn code_span(&mut self) {
        let open = run_length(&self.src[self.pos..], '`');
        let content_start = self.pos + open;
        match find_backtick_close(self.src, content_start, open) {
            Some(end) => {
                let content = &self.src[content_start..end - open];
                self.push(Inline::Code(normalize_code(content)));
                self.pos = end;
            }
            None => {
                // Unmatched run stays literal
                self.text.push_str(&self.src[self.pos..content_start]);
                self.pos = content_start;
            }
        }
    }

    fn delimiter_run(&mut self, marker: char) {
        let count = run_length(&self.src[self.pos..], marker);
        let before = self.src[..self.pos].chars().next_back();
        let after = self.src[self.pos + count..].chars().next();

        let mut can_open = after.is_some_and(|c| !c.is_whitespace());
        let mut can_close = before.is_some_and(|c| !c.is_whitespace());
        if marker == '_' {
            // snake_case stays literal
            can_open &= !before.is_some_and(char::is_alphanumeric);
            can_close &= !after.is_some_and(char::is_alphanumeric);
        }

        self.flush_text();
        self.nodes.push(Node::Delimiter(Delimiter {
            marker,
            count,
            can_open,
            can_close,
        }));
        self.pos += count;
    }

    fn link(&mut self) {
        if self.in_link || self.depth >= MAX_DEPTH {
            self.literal('[');
            return;
        }
        let Some((label_end, tail)) = self.link_parts(self.pos) else {
            self.literal('[');
            return;
        };
        let label = &self.src[self.pos + 1..label_end];
        let content = InlineParser::new(label, true, self.depth + 1).parse();
        self.push(Inline::Link {
            content,
            url: tail.url,
            title: tail.title,
        });
        self.pos = tail.end;
    }

    fn image(&mut self) {
        let Some((label_end, tail)) = self.link_parts(self.pos + 1) else {
            self.literal('!');
            return;
        };
        let alt = self.src[self.pos + 2..label_end].to_string();
        self.push(Inline::Image {
            alt,
            url: tail.url,
            title: tail.title,
        });
        self.pos = tail.end;
    }

    /// Parse `[label](dest "title")` for the `[` at `open`. Returns the
    /// index of the closing `]` and the parsed tail.
    fn link_parts(&mut self, open: usize) -> Option<(usize, LinkTail)> {
        let label_end = self.labels.label_end(self.src, open)?;
        if self.src.as_bytes().get(label_end + 1) != Some(&b'(') {
            return None;
        }
        let tail = parse_link_tail(self.src, label_end + 1, &mut self.unclosed_titles)?;
        Some((label_end, tail))
    }

    fn line_ending(&mut self) {
        let kept = self.text.trim_end_matches(' ').len();
        let spaces = self.text.len() - kept;
        self.text.truncate(kept);
        let kind = if spaces >= 2 {
            BreakKind::Hard
        } else {
            BreakKind::Soft
        };
        self.push(Inline::LineBreak(kind));
        self.pos += 1;
    }
}

/// Find the byte index just past a backtick run of exactly `len`, starting
/// the search at `from`.
fn find_backtick_close(src: &str, from: usize, len: usize) -> Option<usize> {
    let bytes = src.as_bytes();
    let mut i = from;
    while i < bytes.len() {
        if bytes[i] == b'`' {
            let start = i;
            while i < bytes.len() && bytes[i] == b'`' {
                i += 1;
            }
            if i - start == len {
                return Some(i);
            }
        } else {
            i += 1;
        }
    }
    None
}

fn normalize_code(content: &str) -> String {
    let code = content.replace('\n', " ");
    let strip = code.len() >= 2
        && code.starts_with(' ')
        && code.ends_with(' ')
        && !code.chars().all(|c| c == ' ');
    if strip {
        code[1..code.len() - 1].to_string()
    } else {
        code
    }
}

/// Destination and title of an inline link
struct LinkTail {
    url: String,
    title: Option<String>,
    /// Byte index just past the closing `)`
    end: usize,
}

/// Forward-only scanner pairing each `[` with its closing `]`.
///
/// Escapes skip the next byte and code spans are opaque, the same rules a
/// label search from the `[` would follow. Pairs are found with one stack
/// pass, so each byte is stepped over once. The parser can land inside an
/// escape or code span the scanner stepped over (after a link destination
/// that contains a backtick); the scan then restarts from there.
#[derive(Default)]
struct LabelScanner {
    origin: usize,
    pos: usize,
    open: Vec<usize>,
    closes: HashMap<usize, usize>,
    /// Escapes and code spans stepped over, in order
    skipped: Vec<(usize, usize)>,
}

impl LabelScanner {
    /// Index of the `]` matching the `[` at `open`
    fn label_end(&mut self, src: &str, open: usize) -> Option<usize> {
        while self.pos <= open {
            self.step(src);
        }
        if open < self.origin || self.covers(open) {
            self.restart(open);
            self.step(src);
        }
        while !self.closes.contains_key(&open) && self.pos < src.len() {
            self.step(src);
        }
        self.closes.get(&open).copied()
    }

    fn step(&mut self, src: &str) {
        let bytes = src.as_bytes();
        let start = self.pos;
        match bytes[start] {
            b'\\' => {
                self.pos = (start + 2).min(bytes.len());
                self.skipped.push((start, self.pos));
            }
            b'`' => {
                let run = run_length(&src[start..], '`');
                match find_backtick_close(src, start + run, run) {
                    Some(end) => {
                        self.pos = end;
                        self.skipped.push((start, end));
                    }
                    None => self.pos = start + run,
                }
            }
            b'[' => {
                self.open.push(start);
                self.pos += 1;
            }
            b']' => {
                if let Some(open) = self.open.pop() {
                    self.closes.insert(open, start);
                }
                self.pos += 1;
            }
            _ => self.pos += 1,
        }
    }

    /// Whether `at` lies inside an escape or code span already stepped over
    fn covers(&self, at: usize) -> bool {
        let i = self.skipped.partition_point(|&(start, _)| start < at);
        i > 0 && self.skipped[i - 1].1 > at
    }

    fn restart(&mut self, at: usize) {
        self.origin = at;
        self.pos = at;
        self.open.clear();
        self.closes.clear();
        self.skipped.clear();
    }
}

/// Parse `(dest "title")` starting at the `(`.
fn parse_link_tail(
    src: &str,
    open_paren: usize,
    unclosed_titles: &mut HashMap<u8, usize>,
) -> Option<LinkTail> {
    let bytes = src.as_bytes();
    let dest_start = skip_whitespace(bytes, open_paren + 1);

    let (url, dest_end) = if bytes.get(dest_start) == Some(&b'<') {
        let inner = dest_start + 1;
        let close = inner + src[inner..].find(['>', '<', '\n'])?;
        if bytes[close] != b'>' {
            return None;
        }
        (unescape(&src[inner..close]), close + 1)
    } else {
        let mut i = dest_start;
        let mut parens = 0usize;
        while i < bytes.len() {
            match bytes[i] {
                b'\\' => i = (i + 2).min(bytes.len()),
                b' ' | b'\t' | b'\n' => break,
                b'(' => {
                    parens += 1;
                    i += 1;
                }
                b')' => {
                    if parens == 0 {
                        break;
                    }
                    parens -= 1;
                    i += 1;
                }
                _ => i += 1,
            }
        }
        if parens != 0 {
            return None;
        }
        (unescape(&src[dest_start..i]), i)
    };

    let mut i = skip_whitespace(bytes, dest_end);
    let mut title = None;
    if i > dest_end {
        if let Some(&quote) = bytes.get(i).filter(|b| matches!(b, b'"' | b'\'' | b'(')) {
            let close = if quote == b'(' { b')' } else { quote };
            let start = i + 1;
            // A title that found no closing byte from an earlier offset
            // cannot find one from a later offset either
            if unclosed_titles.get(&close).is_some_and(|&from| start >= from) {
                return None;
            }
            let Some(end) = find_title_close(bytes, start, close) else {
                unclosed_titles.insert(close, start);
                return None;
            };
            title = Some(unescape(&src[start..end]));
            i = skip_whitespace(bytes, end + 1);
        }
    }

    if bytes.get(i) != Some(&b')') {
        return None;
    }
    Some(LinkTail {
        url,
        title,
        end: i + 1,
    })
}

fn find_title_close(bytes: &[u8], start: usize, close: u8) -> Option<usize> {
    let mut i = start;
    loop {
        match bytes.get(i) {
            None => return None,
            Some(b'\\') => i += 2,
            Some(&c) if c == close => return Some(i),
            Some(_) => i += 1,
        }
    }
}

fn skip_whitespace(bytes: &[u8], mut i: usize) -> usize {
    while matches!(bytes.get(i), Some(b' ' | b'\t' | b'\n')) {
        i += 1;
    }
    i
}

/// Drop backslashes in front of escapable characters
fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next) = chars.peek() {
                if is_escapable(next) {
                    out.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        out.push(c);
    }
    out
}

/// Match emphasis delimiters and flatten the node list into inlines.
fn resolve_emphasis(nodes: Vec<Node>) -> Vec<Inline> {
    let mut list = NodeList::new(nodes);
    // Openers before these slots can no longer match, for `*` and `_`
    let mut floors = [0usize; 2];

    let mut cursor = list.head;
    while let Some(closer) = cursor {
        let marker = match list.delimiter(closer) {
            Some(d) if d.can_close => d.marker,
            _ => {
                cursor = list.slots[closer].next;
                continue;
            }
        };
        let floor = &mut floors[usize::from(marker == '_')];

        let matched = list
            .find_opener(closer, marker, *floor)
            .is_some_and(|opener| list.enclose(opener, closer));
        if !matched {
            *floor = closer;
            cursor = list.slots[closer].next;
        } else if list.delimiter(closer).is_none() {
            cursor = list.slots[closer].next;
            list.unlink(closer);
        }
    }
    list.into_inlines()
}

/// Inline nodes as a doubly linked list over a vector, so a matched range
/// folds into one span without shifting the rest. Slot order is source
/// order.
struct NodeList {
    slots: Vec<Slot>,
    head: Option<usize>,
}

struct Slot {
    node: Option<Node>,
    /// Span nesting inside this node
    depth: usize,
    prev: Option<usize>,
    next: Option<usize>,
}

impl NodeList {
    fn new(nodes: Vec<Node>) -> Self {
        let len = nodes.len();
        let slots = nodes
            .into_iter()
            .enumerate()
            .map(|(i, node)| Slot {
                depth: match &node {
                    Node::Inline(inline) => span_depth(inline),
                    Node::Delimiter(_) => 0,
                },
                node: Some(node),
                prev: i.checked_sub(1),
                next: (i + 1 < len).then_some(i + 1),
            })
            .collect();
        Self {
            slots,
            head: (len > 0).then_some(0),
        }
    }

    /// The delimiter in slot `i`, if it has characters left
    fn delimiter(&self, i: usize) -> Option<&Delimiter> {
        match &self.slots[i].node {
            Some(Node::Delimiter(d)) if d.count > 0 => Some(d),
            _ => None,
        }
    }

    /// Nearest opener for `marker` before `closer`, not looking below `floor`
    fn find_opener(&self, closer: usize, marker: char, floor: usize) -> Option<usize> {
        let mut cursor = self.slots[closer].prev;
        while let Some(i) = cursor.filter(|&i| i >= floor) {
            if self
                .delimiter(i)
                .is_some_and(|d| d.marker == marker && d.can_open)
            {
                return Some(i);
            }
            cursor = self.slots[i].prev;
        }
        None
    }

    /// Fold everything between `opener` and `closer` into one emphasis or
    /// strong span. Leaves the list untouched and returns false when the
    /// span would nest too deep.
    fn enclose(&mut self, opener: usize, closer: usize) -> bool {
        let Some(first) = self.slots[opener].next.filter(|&i| i != closer) else {
            return false;
        };

        let mut depth = 0;
        let mut cursor = Some(first);
        while let Some(i) = cursor.filter(|&i| i != closer) {
            depth = depth.max(self.slots[i].depth);
            cursor = self.slots[i].next;
        }
        if depth >= MAX_SPAN_DEPTH {
            return false;
        }

        let used = match (self.delimiter(opener), self.delimiter(closer)) {
            (Some(o), Some(c)) if o.count >= 2 && c.count >= 2 => 2,
            _ => 1,
        };

        let mut inner = Vec::new();
        let mut cursor = Some(first);
        while let Some(i) = cursor.filter(|&i| i != closer) {
            inner.extend(self.slots[i].node.take());
            cursor = self.slots[i].next;
        }
        let children = flatten(inner);
        let span = if used == 2 {
            Inline::Strong(children)
        } else {
            Inline::Emphasis(children)
        };

        let slot = &mut self.slots[first];
        slot.node = Some(Node::Inline(span));
        slot.depth = depth + 1;
        slot.next = Some(closer);
        self.slots[closer].prev = Some(first);

        for i in [opener, closer] {
            if let Some(Node::Delimiter(d)) = &mut self.slots[i].node {
                d.count -= used;
            }
        }
        if self.delimiter(opener).is_none() {
            self.unlink(opener);
        }
        true
    }

    fn unlink(&mut self, i: usize) {
        let (prev, next) = (self.slots[i].prev, self.slots[i].next);
        match prev {
            Some(p) => self.slots[p].next = next,
            None => self.head = next,
        }
        if let Some(n) = next {
            self.slots[n].prev = prev;
        }
        self.slots[i].node = None;
    }

    fn into_inlines(mut self) -> Vec<Inline> {
        let mut nodes = Vec::new();
        let mut cursor = self.head;
        while let Some(i) = cursor {
            nodes.extend(self.slots[i].node.take());
            cursor = self.slots[i].next;
        }
        flatten(nodes)
    }
}

fn span_depth(inline: &Inline) -> usize {
    match inline {
        Inline::Emphasis(children) | Inline::Strong(children) => {
            1 + children.iter().map(span_depth).max().unwrap_or(0)
        }
        Inline::Link { content, .. } => 1 + content.iter().map(span_depth).max().unwrap_or(0),
        _ => 0,
    }
}

/// Turn leftover delimiters into literal text and merge adjacent text.
fn flatten(nodes: Vec<Node>) -> Vec<Inline> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            Node::Inline(inline) => push_merged(&mut out, inline),
            Node::Delimiter(d) if d.count > 0 => {
                push_merged(&mut out, Inline::Text(d.marker.to_string().repeat(d.count)))
            }
            Node::Delimiter(_) => {}
        }
    }
    out
}

fn push_merged(out: &mut Vec<Inline>, inline: Inline) {
    if let Inline::Text(text) = &inline {
        if let Some(Inline::Text(prev)) = out.last_mut() {
            prev.push_str(text);
            return;
        }
    }
    out.push(inline);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn text(s: &str) -> Inline {
        Inline::Text(s.to_string())
    }

    fn em(children: Vec<Inline>) -> Inline {
        Inline::Emphasis(children)
    }

    fn strong(children: Vec<Inline>) -> Inline {
        Inline::Strong(children)
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(parse_inlines("Hello world"), vec![text("Hello world")]);
        assert_eq!(parse_inlines(""), vec![]);
    }

    #[test]
    fn test_emphasis_and_strong() {
        assert_eq!(
            parse_inlines("Hello *world* and __bold__"),
            vec![
                text("Hello "),
                em(vec![text("world")]),
                text(" and "),
                strong(vec![text("bold")]),
            ]
        );
    }

    #[test]
    fn test_nested_emphasis() {
        assert_eq!(
            parse_inlines("***both***"),
            vec![em(vec![strong(vec![text("both")])])]
        );
        assert_eq!(
            parse_inlines("**a *b* c**"),
            vec![strong(vec![text("a "), em(vec![text("b")]), text(" c")])]
        );
    }

    #[test]
    fn test_unbalanced_emphasis_keeps_leftover() {
        assert_eq!(
            parse_inlines("**foo*"),
            vec![text("*"), em(vec![text("foo")])]
        );
    }

    #[rstest]
    #[case("*a", "*a")]
    #[case("a * b * c", "a * b * c")]
    #[case("snake_case_name", "snake_case_name")]
    #[case("*foo *", "*foo *")]
    #[case("`code", "`code")]
    #[case("``a`", "``a`")]
    #[case("[foo", "[foo")]
    #[case("[foo]", "[foo]")]
    #[case("[foo](bar", "[foo](bar")]
    #[case("![alt](", "![alt](")]
    #[case("a ] b", "a ] b")]
    fn test_degrades_to_literal(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(parse_inlines(input), vec![text(expected)]);
    }

    #[test]
    fn test_backslash_escapes() {
        assert_eq!(
            parse_inlines(r"\*not em\* \[x\] \a \\"),
            vec![text(r"*not em* [x] \a \")]
        );
    }

    #[test]
    fn test_backslash_line_break() {
        assert_eq!(
            parse_inlines("a\\\nb"),
            vec![text("a"), Inline::LineBreak(BreakKind::Hard), text("b")]
        );
    }

    #[test]
    fn test_code_span() {
        assert_eq!(
            parse_inlines("use `*x*` here"),
            vec![text("use "), Inline::Code("*x*".to_string()), text(" here")]
        );
        assert_eq!(
            parse_inlines("`` a ` b ``"),
            vec![Inline::Code("a ` b".to_string())]
        );
        assert_eq!(parse_inlines("` `"), vec![Inline::Code(" ".to_string())]);
    }

    #[test]
    fn test_code_span_beats_emphasis() {
        assert_eq!(
            parse_inlines("*a `*` b*"),
            vec![em(vec![
                text("a "),
                Inline::Code("*".to_string()),
                text(" b")
            ])]
        );
    }

    #[test]
    fn test_link() {
        assert_eq!(
            parse_inlines("see [the *docs*](https://example.com \"Docs\")."),
            vec![
                text("see "),
                Inline::Link {
                    content: vec![text("the "), em(vec![text("docs")])],
                    url: "https://example.com".to_string(),
                    title: Some("Docs".to_string()),
                },
                text("."),
            ]
        );
    }

    #[test]
    fn test_link_destination_forms() {
        let link = |url: &str, title: Option<&str>| Inline::Link {
            content: vec![text("a")],
            url: url.to_string(),
            title: title.map(str::to_string),
        };
        assert_eq!(parse_inlines("[a](<my url>)"), vec![link("my url", None)]);
        assert_eq!(parse_inlines("[a](f(x))"), vec![link("f(x)", None)]);
        assert_eq!(parse_inlines("[a]()"), vec![link("", None)]);
        assert_eq!(parse_inlines("[a](u 't')"), vec![link("u", Some("t"))]);
        assert_eq!(parse_inlines("[a](u (t))"), vec![link("u", Some("t"))]);
        assert_eq!(parse_inlines(r"[a](u\_v)"), vec![link("u_v", None)]);
    }

    #[test]
    fn test_nested_link_is_literal() {
        assert_eq!(
            parse_inlines("[a [b](c)](d)"),
            vec![Inline::Link {
                content: vec![text("a [b](c)")],
                url: "d".to_string(),
                title: None,
            }]
        );
    }

    #[test]
    fn test_image_alt_is_verbatim() {
        assert_eq!(
            parse_inlines("![a *b*](pic.png \"T\")"),
            vec![Inline::Image {
                alt: "a *b*".to_string(),
                url: "pic.png".to_string(),
                title: Some("T".to_string()),
            }]
        );
    }

    #[test]
    fn test_image_inside_link() {
        assert_eq!(
            parse_inlines("[![i](i.png)](/home)"),
            vec![Inline::Link {
                content: vec![Inline::Image {
                    alt: "i".to_string(),
                    url: "i.png".to_string(),
                    title: None,
                }],
                url: "/home".to_string(),
                title: None,
            }]
        );
    }

    #[test]
    fn test_bang_without_bracket() {
        assert_eq!(parse_inlines("Wow! [x]"), vec![text("Wow! [x]")]);
    }

    #[test]
    fn test_line_breaks() {
        assert_eq!(
            parse_inlines("one  \ntwo \nthree"),
            vec![
                text("one"),
                Inline::LineBreak(BreakKind::Hard),
                text("two"),
                Inline::LineBreak(BreakKind::Soft),
                text("three"),
            ]
        );
    }

    #[test]
    fn test_emphasis_across_soft_break() {
        assert_eq!(
            parse_inlines("*a\nb*"),
            vec![em(vec![
                text("a"),
                Inline::LineBreak(BreakKind::Soft),
                text("b")
            ])]
        );
    }

    #[test]
    fn test_unmatched_brackets_stay_literal() {
        let input = "[".repeat(50_000);
        assert_eq!(parse_inlines(&input), vec![text(&input)]);
    }

    #[test]
    fn test_link_after_unmatched_bracket() {
        assert_eq!(
            parse_inlines("[[a](u)"),
            vec![
                text("["),
                Inline::Link {
                    content: vec![text("a")],
                    url: "u".to_string(),
                    title: None,
                },
            ]
        );
    }

    #[test]
    fn test_code_span_inside_label() {
        assert_eq!(
            parse_inlines("[a `]` b](u)"),
            vec![Inline::Link {
                content: vec![text("a "), Inline::Code("]".to_string()), text(" b")],
                url: "u".to_string(),
                title: None,
            }]
        );
    }

    #[test]
    fn test_link_after_backtick_in_destination() {
        let link = |label: &str, url: &str| Inline::Link {
            content: vec![text(label)],
            url: url.to_string(),
            title: None,
        };
        assert_eq!(
            parse_inlines("[a](x`y) [b](c) `"),
            vec![link("a", "x`y"), text(" "), link("b", "c"), text(" `")]
        );
    }

    #[test]
    fn test_unclosed_titles_stay_literal() {
        let input = "[a](u (".repeat(10_000);
        assert_eq!(parse_inlines(&input), vec![text(&input)]);
    }

    #[test]
    fn test_unmatched_delimiters_stay_literal() {
        let input = "*a ".repeat(20_000) + &"b_ ".repeat(20_000);
        assert_eq!(parse_inlines(&input), vec![text(&input)]);
    }

    #[test]
    fn test_many_emphasis_spans() {
        let inlines = parse_inlines(&"*a* ".repeat(10_000));
        assert_eq!(inlines.len(), 20_000);
        assert_eq!(inlines[..2], [em(vec![text("a")]), text(" ")]);
        assert_eq!(inlines[19_998..], [em(vec![text("a")]), text(" ")]);
    }

    #[test]
    fn test_span_nesting_is_capped() {
        let input = "*x ".repeat(100) + &"x* ".repeat(100);
        let inlines = parse_inlines(&input);
        let depth = inlines.iter().map(span_depth).max().unwrap_or(0);
        assert_eq!(depth, MAX_SPAN_DEPTH);
    }

    #[test]
    fn test_resolve_document() {
        let raw = RawDocument {
            blocks: vec![
                RawBlock::Heading {
                    level: 2,
                    text: "*H*".to_string(),
                },
                RawBlock::List {
                    ordered: false,
                    start: 1,
                    tight: true,
                    items: vec![vec![RawBlock::Paragraph("`c`".to_string())]],
                },
                RawBlock::CodeBlock {
                    language: None,
                    code: "*raw*\n".to_string(),
                },
            ],
        };
        assert_eq!(
            resolve(raw),
            Document::new(vec![
                Block::Heading {
                    level: 2,
                    content: vec![em(vec![text("H")])],
                },
                Block::List {
                    ordered: false,
                    start: 1,
                    tight: true,
                    items: vec![ListItem::from_inlines(vec![Inline::Code("c".to_string())])],
                },
                Block::CodeBlock {
                    language: None,
                    code: "*raw*\n".to_string(),
                },
            ])
        );
    }
}
