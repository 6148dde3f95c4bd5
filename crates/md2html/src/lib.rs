//! # md2html
//!
//! Convert Markdown text to HTML.
//!
//! Parsing runs in two stages. The block stage classifies each line and
//! builds the document structure with an explicit container stack; the
//! inline stage then parses emphasis, code spans, links and images inside
//! every paragraph and heading. The resulting [`Document`] is rendered by
//! `md2html-core`.
//!
//! Malformed Markdown never fails: anything that does not form a complete
//! construct is kept as literal text.
//!
//! ## Example
//!
//! ```rust
//! let html = md2html::to_html("# Title\n\nHello *world*.");
//! assert_eq!(html, "<h1>Title</h1>\n<p>Hello <em>world</em>.</p>");
//! ```
//!
//! ## Example (themed page)
//!
//! ```rust
//! use md2html::{Converter, ThemeResolver, Themes};
//!
//! let themes = Themes::new();
//! let theme = themes.resolve("minimal").unwrap();
//! let page = Converter::new().convert_with_theme("# Hi", &theme);
//! assert!(page.contains("<h1>Hi</h1>"));
//! assert!(page.contains("<title>Hi</title>"));
//! ```

use std::path::PathBuf;

pub mod block;
pub mod classify;
pub mod inline;
mod service;
pub mod theme;
mod utilities;

pub use md2html_core::{
    inlines_plain_text, render, render_inlines, slugify, Block, BreakKind, Document, Inline,
    ListItem, Options,
};
pub use service::Converter;
pub use theme::{Template, Theme, ThemeResolver, Themes};
pub use utilities::normalize_newlines;

/// Error type for md2html operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unknown theme: {0}")]
    ThemeNotFound(String),

    #[error("invalid template for theme {name}: {reason}")]
    InvalidTemplate { name: String, reason: String },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid config {}: {message}", path.display())]
    Config { path: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Parse Markdown into a document tree.
///
/// `\r\n` and lone `\r` line endings are treated as `\n`.
pub fn parse(markdown: &str) -> Document {
    let markdown = normalize_newlines(markdown);
    inline::resolve(block::parse_blocks(&markdown))
}

/// Convert Markdown to an HTML body with default options.
pub fn to_html(markdown: &str) -> String {
    render(&parse(markdown), &Options::default())
}
