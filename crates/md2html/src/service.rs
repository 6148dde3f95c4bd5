//! Converter - the main entry point for Markdown to HTML conversion.

use md2html_core::{render, Document, Options};
use tracing::debug;

use crate::theme::{Theme, ThemeResolver};
use crate::Result;

/// Converts Markdown to HTML with a fixed set of render options.
///
/// A converter holds no per-call state, so one instance can be shared
/// between threads.
#[derive(Debug, Clone, Default)]
pub struct Converter {
    options: Options,
}

impl Converter {
    /// Create a converter with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a converter with custom options
    pub fn with_options(options: Options) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut Options {
        &mut self.options
    }

    /// Parse Markdown into a document tree
    pub fn parse(&self, markdown: &str) -> Document {
        let document = crate::parse(markdown);
        debug!(blocks = document.blocks.len(), "parsed document");
        document
    }

    /// Render a parsed document to an HTML body
    pub fn render(&self, document: &Document) -> String {
        render(document, &self.options)
    }

    /// Convert Markdown to an HTML body without a page wrapper
    pub fn convert(&self, markdown: &str) -> String {
        self.render(&self.parse(markdown))
    }

    /// Convert Markdown and place the body into a theme's template.
    ///
    /// The page title is the text of the document's first heading.
    pub fn convert_with_theme(&self, markdown: &str, theme: &Theme) -> String {
        let document = self.parse(markdown);
        let body = self.render(&document);
        let title = document.title().unwrap_or_default();
        debug!(theme = %theme.name, "applying theme");
        theme.template.render(&title, &body)
    }

    /// Resolve `theme` and convert. Nothing is converted if the theme
    /// cannot be found.
    pub fn convert_named<R>(&self, markdown: &str, theme: &str, resolver: &R) -> Result<String>
    where
        R: ThemeResolver + ?Sized,
    {
        let theme = resolver.resolve(theme)?;
        Ok(self.convert_with_theme(markdown, &theme))
    }
}
