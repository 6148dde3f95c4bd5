//! md2html-core - Markdown document model and HTML rendering
//!
//! This crate provides the document tree shared by the md2html parsers and
//! the renderer that serializes it to HTML. It does no parsing itself; see
//! the `md2html` crate for that.
//!
//! # Architecture
//!
//! ```text
//! Markdown ──classify──▶ lines ──blocks──▶ ┌──────────┐
//!                                          │ Document │ ──render──▶ HTML
//!                           inline spans ─▶└──────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use md2html_core::{render, Block, Document, Inline, ListItem, Options};
//!
//! let doc = Document::new(vec![Block::List {
//!     ordered: true,
//!     start: 2,
//!     tight: true,
//!     items: vec![
//!         ListItem::from_inlines(vec![Inline::Code("cargo build".to_string())]),
//!         ListItem::from_inlines(vec![Inline::Link {
//!             content: vec![Inline::Text("docs".to_string())],
//!             url: "https://docs.rs".to_string(),
//!             title: None,
//!         }]),
//!     ],
//! }]);
//!
//! let html = render(&doc, &Options::default());
//! assert_eq!(
//!     html,
//!     "<ol start=\"2\">\n<li><code>cargo build</code></li>\n<li><a href=\"https://docs.rs\">docs</a></li>\n</ol>"
//! );
//! ```

mod ast;
pub mod escape;
mod options;
mod render;

pub use ast::{inlines_plain_text, Block, BreakKind, Document, Inline, ListItem};
pub use options::Options;
pub use render::{render, render_inlines, slugify};
