//! Configuration options for HTML rendering

/// Options for HTML rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Render soft line breaks as `<br>` instead of a newline
    pub hard_breaks: bool,

    /// Emit slug `id` attributes on headings
    pub heading_ids: bool,

    /// Prefix for the `class` attribute of fenced code with a language tag
    pub code_class_prefix: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            hard_breaks: false,
            heading_ids: false,
            code_class_prefix: "language-".to_string(),
        }
    }
}
