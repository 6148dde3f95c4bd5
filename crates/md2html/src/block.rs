//! Block parsing.
//!
//! Consumes classified lines and builds a tree of raw blocks whose
//! paragraphs and headings still hold their verbatim inline source. Open
//! containers (blockquotes, lists, list items) live on an explicit stack;
//! a line is routed to the innermost container whose continuation rule it
//! satisfies, and everything above that is closed.

use tracing::trace;

use crate::classify::{classify, Line, ListKind, Role, MAX_NESTING};

/// A block whose inline content has not been parsed yet
#[derive(Debug, Clone, PartialEq)]
pub enum RawBlock {
    Heading {
        level: u8,
        text: String,
    },
    Paragraph(String),
    BlockQuote(Vec<RawBlock>),
    /// Each item is the sequence of blocks it contains
    List {
        ordered: bool,
        start: u32,
        tight: bool,
        items: Vec<Vec<RawBlock>>,
    },
    CodeBlock {
        language: Option<String>,
        code: String,
    },
    ThematicBreak,
}

/// Output of the block parser
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawDocument {
    pub blocks: Vec<RawBlock>,
}

/// Parse the block structure of a Markdown document.
pub fn parse_blocks(input: &str) -> RawDocument {
    let mut parser = BlockParser::new();
    for (_, line) in classify(input) {
        parser.feed(line);
    }
    parser.finish()
}

/// The block currently accepting lines in a container
enum Leaf {
    Paragraph(Vec<String>),
    Code {
        language: Option<String>,
        code: String,
    },
}

impl Leaf {
    fn finish(self) -> RawBlock {
        match self {
            Leaf::Paragraph(lines) => {
                let mut text = lines.join("\n");
                text.truncate(text.trim_end().len());
                RawBlock::Paragraph(text)
            }
            Leaf::Code { language, code } => RawBlock::CodeBlock { language, code },
        }
    }
}

#[derive(Default)]
struct Container {
    blocks: Vec<RawBlock>,
    leaf: Option<Leaf>,
}

impl Container {
    fn close_leaf(&mut self) {
        if let Some(leaf) = self.leaf.take() {
            self.blocks.push(leaf.finish());
        }
    }

    fn in_code(&self) -> bool {
        matches!(self.leaf, Some(Leaf::Code { .. }))
    }

    /// Append to an open paragraph. Returns false if none is open.
    fn continue_paragraph(&mut self, text: &str) -> bool {
        match &mut self.leaf {
            Some(Leaf::Paragraph(lines)) => {
                lines.push(text.to_string());
                true
            }
            _ => false,
        }
    }

    fn push_code_line(&mut self, text: &str) {
        if let Some(Leaf::Code { code, .. }) = &mut self.leaf {
            code.push_str(text);
            code.push('\n');
        }
    }

    fn into_blocks(mut self) -> Vec<RawBlock> {
        self.close_leaf();
        self.blocks
    }
}

struct ListFrame {
    kind: ListKind,
    start: u32,
    items: Vec<Vec<RawBlock>>,
    loose: bool,
}

struct ItemFrame {
    /// Columns a continuation line must be indented by
    content_offset: usize,
    body: Container,
    /// A blank line was seen since the item's last content
    blank_pending: bool,
    loose: bool,
}

enum Frame {
    Quote(Container),
    List(ListFrame),
    Item(ItemFrame),
}

/// Incremental block parser; feed it classified lines, then [`finish`].
///
/// [`finish`]: BlockParser::finish
pub struct BlockParser {
    root: Container,
    stack: Vec<Frame>,
}

impl BlockParser {
    pub fn new() -> Self {
        Self {
            root: Container::default(),
            stack: Vec::new(),
        }
    }

    /// Route one classified line into the tree
    pub fn feed(&mut self, line: Line<'_>) {
        let (matched, line) = self.match_containers(line);

        if matched < self.stack.len() && self.lazy_continuation(&line) {
            return;
        }

        let blank = matches!(line.role, Role::Blank);
        for (i, frame) in self.stack[..matched].iter_mut().enumerate() {
            if let Frame::Item(item) = frame {
                if blank {
                    item.blank_pending = true;
                } else if i + 1 < matched {
                    // The line continues inside an existing child
                    item.blank_pending = false;
                }
            }
        }

        while self.stack.len() > matched {
            self.close_top();
        }
        self.handle(line);
    }

    /// Close everything still open and return the block tree
    pub fn finish(mut self) -> RawDocument {
        if self.container_mut().in_code() {
            trace!("closing unterminated code fence at end of input");
        }
        if !self.stack.is_empty() {
            trace!(open = self.stack.len(), "closing open containers at end of input");
        }
        while !self.stack.is_empty() {
            self.close_top();
        }
        RawDocument {
            blocks: self.root.into_blocks(),
        }
    }

    /// Count the open containers the line continues, unwrapping the line as
    /// it descends.
    fn match_containers<'a>(&self, mut line: Line<'a>) -> (usize, Line<'a>) {
        let mut matched = 0;
        while matched < self.stack.len() {
            match &self.stack[matched] {
                Frame::Quote(_) => match line.role {
                    Role::Blockquote(inner) => line = *inner,
                    role => {
                        line.role = role;
                        break;
                    }
                },
                Frame::Item(item) => {
                    if !continues_item(item.content_offset, &line) {
                        break;
                    }
                    line.indent = line.indent.saturating_sub(item.content_offset);
                }
                Frame::List(list) => {
                    let item_continues = matches!(
                        self.stack.get(matched + 1),
                        Some(Frame::Item(item)) if continues_item(item.content_offset, &line)
                    );
                    if !item_continues {
                        // A marker of the same kind starts a sibling item
                        if matches!(&line.role, Role::ListItem(marker) if marker.kind == list.kind) {
                            matched += 1;
                        }
                        break;
                    }
                }
            }
            matched += 1;
        }
        (matched, line)
    }

    /// Paragraph text may continue an open paragraph without repeating the
    /// container markers.
    fn lazy_continuation(&mut self, line: &Line<'_>) -> bool {
        match line.role {
            Role::Text(text) => self.container_mut().continue_paragraph(text),
            _ => false,
        }
    }

    fn handle(&mut self, line: Line<'_>) {
        let opens_container = matches!(line.role, Role::Blockquote(_) | Role::ListItem(_));
        if opens_container && self.depth() >= MAX_NESTING {
            trace!(depth = self.depth(), "container nesting limit reached, keeping marker as text");
            self.push_text(line.text);
            return;
        }

        match line.role {
            Role::Blank => self.container_mut().close_leaf(),

            Role::Text(text) => self.push_text(text),

            Role::Heading { level, text } => self.push_block(RawBlock::Heading {
                level,
                text: text.to_string(),
            }),

            Role::ThematicBreak => self.push_block(RawBlock::ThematicBreak),

            Role::FenceOpen { language, .. } => {
                self.start_child();
                self.container_mut().leaf = Some(Leaf::Code {
                    language: language.map(str::to_string),
                    code: String::new(),
                });
            }

            Role::CodeLine(text) => {
                if self.container_mut().in_code() {
                    self.container_mut().push_code_line(text);
                } else {
                    self.push_text(text);
                }
            }

            Role::FenceClose => {
                if self.container_mut().in_code() {
                    self.container_mut().close_leaf();
                } else {
                    // The fence was opened in a container this line no longer continues
                    self.push_text(line.text);
                }
            }

            Role::Blockquote(inner) => {
                self.start_child();
                self.stack.push(Frame::Quote(Container::default()));
                self.handle(*inner);
            }

            Role::ListItem(marker) => {
                let sibling = matches!(
                    self.stack.last(),
                    Some(Frame::List(list)) if list.kind == marker.kind
                );
                if !sibling {
                    self.start_child();
                    self.stack.push(Frame::List(ListFrame {
                        kind: marker.kind,
                        start: marker.start,
                        items: Vec::new(),
                        loose: false,
                    }));
                }
                self.stack.push(Frame::Item(ItemFrame {
                    content_offset: line.indent + marker.content_offset,
                    body: Container::default(),
                    blank_pending: false,
                    loose: false,
                }));
                self.handle(*marker.rest);
            }
        }
    }

    fn push_text(&mut self, text: &str) {
        if self.container_mut().continue_paragraph(text) {
            return;
        }
        self.start_child();
        self.container_mut().leaf = Some(Leaf::Paragraph(vec![text.to_string()]));
    }

    fn push_block(&mut self, block: RawBlock) {
        self.start_child();
        self.container_mut().blocks.push(block);
    }

    /// Close the open leaf before a new child block starts. A child that
    /// follows a blank line inside an item makes the item loose.
    fn start_child(&mut self) {
        self.container_mut().close_leaf();
        if let Some(Frame::Item(item)) = self.stack.last_mut() {
            if item.blank_pending && !item.body.blocks.is_empty() {
                item.loose = true;
            }
            item.blank_pending = false;
        }
    }

    fn close_top(&mut self) {
        let Some(frame) = self.stack.pop() else {
            return;
        };
        match frame {
            Frame::Quote(container) => {
                let blocks = container.into_blocks();
                self.container_mut().blocks.push(RawBlock::BlockQuote(blocks));
            }
            Frame::Item(item) => {
                let blocks = item.body.into_blocks();
                if let Some(Frame::List(list)) = self.stack.last_mut() {
                    list.items.push(blocks);
                    list.loose |= item.loose;
                }
            }
            Frame::List(list) => {
                self.container_mut().blocks.push(RawBlock::List {
                    ordered: list.kind.is_ordered(),
                    start: list.start,
                    tight: !list.loose,
                    items: list.items,
                });
            }
        }
    }

    /// Open blockquotes and list items
    fn depth(&self) -> usize {
        self.stack
            .iter()
            .filter(|frame| !matches!(frame, Frame::List(_)))
            .count()
    }

    /// Innermost container that can hold blocks
    fn container_mut(&mut self) -> &mut Container {
        for frame in self.stack.iter_mut().rev() {
            match frame {
                Frame::Quote(container) => return container,
                Frame::Item(item) => return &mut item.body,
                Frame::List(_) => {}
            }
        }
        &mut self.root
    }
}

impl Default for BlockParser {
    fn default() -> Self {
        Self::new()
    }
}

fn continues_item(content_offset: usize, line: &Line<'_>) -> bool {
    matches!(
        line.role,
        Role::Blank | Role::CodeLine(_) | Role::FenceClose
    ) || line.indent >= content_offset
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn para(s: &str) -> RawBlock {
        RawBlock::Paragraph(s.to_string())
    }

    fn list(tight: bool, items: Vec<Vec<RawBlock>>) -> RawBlock {
        RawBlock::List {
            ordered: false,
            start: 1,
            tight,
            items,
        }
    }

    fn parse(input: &str) -> Vec<RawBlock> {
        parse_blocks(input).blocks
    }

    #[test]
    fn test_heading_and_paragraph() {
        assert_eq!(
            parse("# Title\n\nHello *world*."),
            vec![
                RawBlock::Heading {
                    level: 1,
                    text: "Title".to_string()
                },
                para("Hello *world*."),
            ]
        );
    }

    #[test]
    fn test_paragraph_lines_accumulate() {
        assert_eq!(
            parse("one  \n  two\nthree   \n\nfour"),
            vec![para("one  \ntwo\nthree"), para("four")]
        );
    }

    #[test]
    fn test_block_roles_interrupt_paragraph() {
        assert_eq!(
            parse("text\n---\nmore\n## H"),
            vec![
                para("text"),
                RawBlock::ThematicBreak,
                para("more"),
                RawBlock::Heading {
                    level: 2,
                    text: "H".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_seven_hashes_is_paragraph() {
        assert_eq!(parse("####### seven"), vec![para("####### seven")]);
    }

    #[test]
    fn test_fenced_code() {
        assert_eq!(
            parse("```rust\nfn main() {}\n\n  x\n```\nafter"),
            vec![
                RawBlock::CodeBlock {
                    language: Some("rust".to_string()),
                    code: "fn main() {}\n\n  x\n".to_string(),
                },
                para("after"),
            ]
        );
    }

    #[test]
    fn test_unterminated_fence_closes_at_end() {
        assert_eq!(
            parse("```\nstill code\n# not heading"),
            vec![RawBlock::CodeBlock {
                language: None,
                code: "still code\n# not heading\n".to_string(),
            }]
        );
    }

    #[test]
    fn test_tight_list() {
        assert_eq!(
            parse("- a\n- b\n"),
            vec![list(true, vec![vec![para("a")], vec![para("b")]])]
        );
    }

    #[test]
    fn test_blank_between_items_stays_tight() {
        assert_eq!(
            parse("- a\n\n- b"),
            vec![list(true, vec![vec![para("a")], vec![para("b")]])]
        );
    }

    #[test]
    fn test_blank_inside_item_is_loose() {
        assert_eq!(
            parse("- a\n\n  more\n- b"),
            vec![list(
                false,
                vec![vec![para("a"), para("more")], vec![para("b")]]
            )]
        );
    }

    #[test]
    fn test_nested_list() {
        assert_eq!(
            parse("- a\n  - b\n  - c\n- d"),
            vec![list(
                true,
                vec![
                    vec![
                        para("a"),
                        list(true, vec![vec![para("b")], vec![para("c")]])
                    ],
                    vec![para("d")],
                ]
            )]
        );
    }

    #[test]
    fn test_blank_between_nested_items_keeps_outer_tight() {
        assert_eq!(
            parse("- a\n  - b\n\n  - c\n  > q"),
            vec![list(
                true,
                vec![vec![
                    para("a"),
                    list(true, vec![vec![para("b")], vec![para("c")]]),
                    RawBlock::BlockQuote(vec![para("q")]),
                ]]
            )]
        );
    }

    #[test]
    fn test_blank_before_nested_list_is_loose() {
        let blocks = parse("- a\n\n  - b");
        let RawBlock::List { tight, .. } = &blocks[0] else {
            panic!("expected list");
        };
        assert!(!tight);
    }

    #[test]
    fn test_ordered_list_start_and_kind_change() {
        assert_eq!(
            parse("3. c\n4. d\n1) x"),
            vec![
                RawBlock::List {
                    ordered: true,
                    start: 3,
                    tight: true,
                    items: vec![vec![para("c")], vec![para("d")]],
                },
                RawBlock::List {
                    ordered: true,
                    start: 1,
                    tight: true,
                    items: vec![vec![para("x")]],
                },
            ]
        );
    }

    #[test]
    fn test_bullet_change_starts_new_list() {
        assert_eq!(
            parse("- a\n+ b"),
            vec![
                list(true, vec![vec![para("a")]]),
                list(true, vec![vec![para("b")]]),
            ]
        );
    }

    #[test]
    fn test_blockquote() {
        assert_eq!(
            parse("> # Quote\n> text\n>\n> more"),
            vec![RawBlock::BlockQuote(vec![
                RawBlock::Heading {
                    level: 1,
                    text: "Quote".to_string()
                },
                para("text"),
                para("more"),
            ])]
        );
    }

    #[test]
    fn test_nested_blockquote_and_blank_closes_quote() {
        assert_eq!(
            parse("> > deep\n\nout"),
            vec![
                RawBlock::BlockQuote(vec![RawBlock::BlockQuote(vec![para("deep")])]),
                para("out"),
            ]
        );
    }

    #[test]
    fn test_lazy_continuation_in_blockquote() {
        assert_eq!(
            parse("> a\nb\n\nc"),
            vec![RawBlock::BlockQuote(vec![para("a\nb")]), para("c")]
        );
    }

    #[test]
    fn test_lazy_continuation_in_list_item() {
        assert_eq!(
            parse("- a\nb\n- c"),
            vec![list(true, vec![vec![para("a\nb")], vec![para("c")]])]
        );
    }

    #[test]
    fn test_lazy_continuation_does_not_apply_after_blank() {
        assert_eq!(
            parse("> a\n\nb"),
            vec![RawBlock::BlockQuote(vec![para("a")]), para("b")]
        );
    }

    #[test]
    fn test_code_inside_list_item() {
        assert_eq!(
            parse("- item\n\n  ```sh\n  ls -la\n  ```\n- next"),
            vec![list(
                false,
                vec![
                    vec![
                        para("item"),
                        RawBlock::CodeBlock {
                            language: Some("sh".to_string()),
                            code: "ls -la\n".to_string(),
                        }
                    ],
                    vec![para("next")],
                ]
            )]
        );
    }

    #[test]
    fn test_code_inside_blockquote() {
        assert_eq!(
            parse("> ```\n> <b>\n> ```\n> after"),
            vec![RawBlock::BlockQuote(vec![
                RawBlock::CodeBlock {
                    language: None,
                    code: "<b>\n".to_string(),
                },
                para("after"),
            ])]
        );
    }

    #[test]
    fn test_list_inside_blockquote() {
        assert_eq!(
            parse("> - a\n> - b"),
            vec![RawBlock::BlockQuote(vec![list(
                true,
                vec![vec![para("a")], vec![para("b")]]
            )])]
        );
    }

    #[test]
    fn test_unterminated_containers_close_at_end() {
        assert_eq!(
            parse("> - a\n>   > b"),
            vec![RawBlock::BlockQuote(vec![list(
                true,
                vec![vec![para("a"), RawBlock::BlockQuote(vec![para("b")])]]
            )])]
        );
    }

    #[test]
    fn test_stray_fence_close_is_text() {
        let mut parser = BlockParser::new();
        parser.feed(Line {
            indent: 0,
            text: "```",
            role: Role::FenceClose,
        });
        assert_eq!(parser.finish().blocks, vec![para("```")]);
    }

    #[test]
    fn test_fence_left_open_by_closed_item_keeps_lines() {
        let blocks = parse("- > ```\n> code\n> ```");
        assert_eq!(blocks.len(), 2);
        let RawBlock::BlockQuote(quoted) = &blocks[1] else {
            panic!("expected blockquote after the list, got {blocks:?}");
        };
        assert_eq!(quoted, &vec![para("code\n```")]);
    }

    fn nesting(blocks: &[RawBlock]) -> usize {
        blocks
            .iter()
            .map(|block| match block {
                RawBlock::BlockQuote(inner) => 1 + nesting(inner),
                RawBlock::List { items, .. } => {
                    1 + items.iter().map(|item| nesting(item)).max().unwrap_or(0)
                }
                _ => 0,
            })
            .max()
            .unwrap_or(0)
    }

    #[test]
    fn test_indented_lists_stop_nesting_at_limit() {
        let source: Vec<String> = (0..MAX_NESTING + 10)
            .map(|level| format!("{}- x", "  ".repeat(level)))
            .collect();
        let blocks = parse(&source.join("\n"));
        assert_eq!(nesting(&blocks), MAX_NESTING);
    }

    #[test]
    fn test_quotes_stop_nesting_at_limit() {
        let source = format!("{}deep", "> ".repeat(MAX_NESTING * 2));
        let blocks = parse(&source);
        assert_eq!(nesting(&blocks), MAX_NESTING);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse(""), vec![]);
        assert_eq!(parse("\n\n   \n"), vec![]);
    }
}
