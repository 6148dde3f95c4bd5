//! HTML rendering
//!
//! Walks a [`Document`] and writes HTML. Output is deterministic: the same
//! document and options always produce the same bytes.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::ast::{inlines_plain_text, BreakKind, Block, Document, Inline, ListItem};
use crate::escape::{escape_attr, escape_text, escape_url};
use crate::options::Options;

static SLUG_STRIP: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s-]").expect("slug pattern"));
static SLUG_SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("space pattern"));

/// Render a document to an HTML body fragment.
///
/// Top-level blocks are separated by a newline; there is no trailing newline.
pub fn render(document: &Document, options: &Options) -> String {
    let mut renderer = Renderer::new(options);
    let mut output = String::with_capacity(4096);
    renderer.render_blocks(&document.blocks, &mut output);
    output
}

/// Render an inline sequence on its own, e.g. for titles or previews.
pub fn render_inlines(inlines: &[Inline], options: &Options) -> String {
    let mut output = String::new();
    Renderer::new(options).render_inlines(inlines, &mut output);
    output
}

/// Turn heading text into an `id` slug.
pub fn slugify(text: &str) -> String {
    let lowered = text.trim().to_lowercase();
    let stripped = SLUG_STRIP.replace_all(&lowered, "");
    let slug = SLUG_SPACES.replace_all(stripped.trim(), "-").into_owned();
    if slug.is_empty() {
        "section".to_string()
    } else {
        slug
    }
}

struct Renderer<'a> {
    options: &'a Options,
    // slug -> times seen, for de-duplicating heading ids
    ids: HashMap<String, usize>,
}

impl<'a> Renderer<'a> {
    fn new(options: &'a Options) -> Self {
        Self {
            options,
            ids: HashMap::new(),
        }
    }

    fn render_blocks(&mut self, blocks: &[Block], out: &mut String) {
        for (i, block) in blocks.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            self.render_block(block, out);
        }
    }

    fn render_block(&mut self, block: &Block, out: &mut String) {
        match block {
            Block::Heading { level, content } => self.render_heading(*level, content, out),

            Block::Paragraph(inlines) => {
                out.push_str("<p>");
                self.render_inlines(inlines, out);
                out.push_str("</p>");
            }

            Block::BlockQuote(blocks) => {
                out.push_str("<blockquote>\n");
                for block in blocks {
                    self.render_block(block, out);
                    out.push('\n');
                }
                out.push_str("</blockquote>");
            }

            Block::List {
                ordered,
                start,
                tight,
                items,
            } => self.render_list(*ordered, *start, *tight, items, out),

            Block::CodeBlock { language, code } => {
                out.push_str("<pre><code");
                if let Some(language) = language.as_deref().filter(|l| !l.is_empty()) {
                    out.push_str(" class=\"");
                    escape_attr(&self.options.code_class_prefix, out);
                    escape_attr(language, out);
                    out.push('"');
                }
                out.push('>');
                escape_text(code, out);
                out.push_str("</code></pre>");
            }

            Block::ThematicBreak => out.push_str("<hr />"),
        }
    }

    fn render_heading(&mut self, level: u8, content: &[Inline], out: &mut String) {
        let level = level.clamp(1, 6);
        out.push_str("<h");
        out.push(char::from(b'0' + level));
        if self.options.heading_ids {
            let id = self.unique_id(slugify(&inlines_plain_text(content)));
            out.push_str(" id=\"");
            escape_attr(&id, out);
            out.push('"');
        }
        out.push('>');
        self.render_inlines(content, out);
        out.push_str("</h");
        out.push(char::from(b'0' + level));
        out.push('>');
    }

    fn unique_id(&mut self, slug: String) -> String {
        let seen = self.ids.entry(slug.clone()).or_insert(0);
        let id = if *seen == 0 {
            slug
        } else {
            format!("{}-{}", slug, seen)
        };
        *seen += 1;
        id
    }

    fn render_list(
        &mut self,
        ordered: bool,
        start: u32,
        tight: bool,
        items: &[ListItem],
        out: &mut String,
    ) {
        let tag = if ordered { "ol" } else { "ul" };
        out.push('<');
        out.push_str(tag);
        if ordered && start != 1 {
            out.push_str(" start=\"");
            out.push_str(&start.to_string());
            out.push('"');
        }
        out.push_str(">\n");

        for item in items {
            self.render_list_item(item, tight, out);
            out.push('\n');
        }

        out.push_str("</");
        out.push_str(tag);
        out.push('>');
    }

    fn render_list_item(&mut self, item: &ListItem, tight: bool, out: &mut String) {
        out.push_str("<li>");

        if tight {
            let mut after_paragraph = false;
            for block in &item.content {
                match block {
                    Block::Paragraph(inlines) => {
                        if after_paragraph {
                            out.push('\n');
                        }
                        self.render_inlines(inlines, out);
                        after_paragraph = true;
                    }
                    other => {
                        if !out.ends_with('\n') {
                            out.push('\n');
                        }
                        self.render_block(other, out);
                        out.push('\n');
                        after_paragraph = false;
                    }
                }
            }
        } else if !item.content.is_empty() {
            out.push('\n');
            for block in &item.content {
                self.render_block(block, out);
                out.push('\n');
            }
        }

        out.push_str("</li>");
    }

    fn render_inlines(&mut self, inlines: &[Inline], out: &mut String) {
        for inline in inlines {
            self.render_inline(inline, out);
        }
    }

    fn render_inline(&mut self, inline: &Inline, out: &mut String) {
        match inline {
            Inline::Text(text) => escape_text(text, out),

            Inline::Strong(content) => {
                out.push_str("<strong>");
                self.render_inlines(content, out);
                out.push_str("</strong>");
            }

            Inline::Emphasis(content) => {
                out.push_str("<em>");
                self.render_inlines(content, out);
                out.push_str("</em>");
            }

            Inline::Code(code) => {
                out.push_str("<code>");
                escape_text(code, out);
                out.push_str("</code>");
            }

            Inline::Link {
                content,
                url,
                title,
            } => {
                out.push_str("<a href=\"");
                escape_url(url, out);
                out.push('"');
                if let Some(title) = title {
                    out.push_str(" title=\"");
                    escape_attr(title, out);
                    out.push('"');
                }
                out.push('>');
                self.render_inlines(content, out);
                out.push_str("</a>");
            }

            Inline::Image { alt, url, title } => {
                out.push_str("<img src=\"");
                escape_url(url, out);
                out.push_str("\" alt=\"");
                escape_attr(alt, out);
                out.push('"');
                if let Some(title) = title {
                    out.push_str(" title=\"");
                    escape_attr(title, out);
                    out.push('"');
                }
                out.push_str(" />");
            }

            Inline::LineBreak(BreakKind::Hard) => out.push_str("<br>\n"),

            Inline::LineBreak(BreakKind::Soft) => {
                if self.options.hard_breaks {
                    out.push_str("<br>\n");
                } else {
                    out.push('\n');
                }
            }
        }
    }
}
