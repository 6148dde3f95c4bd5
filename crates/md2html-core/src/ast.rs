//! Markdown document model
//!
//! This module defines the tree produced by the md2html parsers and consumed
//! by the HTML renderer. Every node owns its children; there are no parent
//! pointers and no sharing.

/// Root of a parsed Markdown document
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub blocks: Vec<Block>,
}

/// Structural unit that starts and ends on line boundaries
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// ATX heading, `level` in 1..=6
    Heading {
        level: u8,
        content: Vec<Inline>,
    },

    /// Consecutive text lines
    Paragraph(Vec<Inline>),

    /// `>` container
    BlockQuote(Vec<Block>),

    /// Bullet or ordered list.
    ///
    /// `tight` is derived once when the list closes: tight lists render
    /// their item paragraphs without `<p>` wrappers.
    List {
        ordered: bool,
        start: u32,
        tight: bool,
        items: Vec<ListItem>,
    },

    /// Fenced code block; `code` is literal text
    CodeBlock {
        language: Option<String>,
        code: String,
    },

    /// `---`, `***` or `___`
    ThematicBreak,
}

/// One item of a [`Block::List`]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListItem {
    pub content: Vec<Block>,
}

impl ListItem {
    pub fn new(content: Vec<Block>) -> Self {
        Self { content }
    }

    pub fn from_inlines(inlines: Vec<Inline>) -> Self {
        Self {
            content: vec![Block::Paragraph(inlines)],
        }
    }
}

/// Kind of line break between two source lines of the same block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakKind {
    /// Two or more trailing spaces (or a trailing backslash)
    Hard,
    /// A plain line ending
    Soft,
}

/// Span-level content of a paragraph or heading
#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    /// Literal text, stored unescaped
    Text(String),

    /// `**strong**` or `__strong__`
    Strong(Vec<Inline>),

    /// `*em*` or `_em_`
    Emphasis(Vec<Inline>),

    /// Code span with surrounding backticks removed
    Code(String),

    /// Inline link `[content](url "title")`
    Link {
        content: Vec<Inline>,
        url: String,
        title: Option<String>,
    },

    /// Inline image; `alt` is the raw label text
    Image {
        alt: String,
        url: String,
        title: Option<String>,
    },

    /// Line break inside a paragraph or heading
    LineBreak(BreakKind),
}

impl Document {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Plain text of the first level-1 heading, falling back to the first
    /// heading of any level.
    pub fn title(&self) -> Option<String> {
        let mut first = None;
        for block in &self.blocks {
            if let Block::Heading { level, content } = block {
                if *level == 1 {
                    return Some(inlines_plain_text(content));
                }
                if first.is_none() {
                    first = Some(content);
                }
            }
        }
        first.map(|content| inlines_plain_text(content))
    }
}

impl Inline {
    /// Append the text content of this inline, without markup
    pub fn push_plain_text(&self, out: &mut String) {
        match self {
            Inline::Text(text) | Inline::Code(text) => out.push_str(text),
            Inline::Strong(inlines) | Inline::Emphasis(inlines) => {
                inlines.iter().for_each(|i| i.push_plain_text(out))
            }
            Inline::Link { content, .. } => content.iter().for_each(|i| i.push_plain_text(out)),
            Inline::Image { alt, .. } => out.push_str(alt),
            Inline::LineBreak(_) => out.push(' '),
        }
    }
}

/// Text content of an inline sequence (used for alt text, ids and titles)
pub fn inlines_plain_text(inlines: &[Inline]) -> String {
    let mut out = String::new();
    for inline in inlines {
        inline.push_plain_text(&mut out);
    }
    out
}
