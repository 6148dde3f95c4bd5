//! Themes wrap a rendered HTML body in a complete page.
//!
//! A theme is a named [`Template`] with exactly one `{{body}}` placeholder
//! and an optional `{{title}}` placeholder. [`Themes`] keeps the registered
//! themes in insertion order and ships with `default`, `dark` and `minimal`.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::{IndexMap, IndexSet};
use md2html_core::escape::escape_text;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::debug;

use crate::{Error, Result};

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*([A-Za-z_]+)\s*\}\}").expect("valid placeholder pattern"));

const SHELL_HEAD: &str = "<!DOCTYPE html>
<html lang=\"en\">
<head>
<meta charset=\"utf-8\" />
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\" />
<title>{{title}}</title>
";

const SHELL_BODY: &str = "</head>
<body>
<main>
{{body}}
</main>
</body>
</html>
";

const DEFAULT_CSS: &str = "body {
  margin: 0 auto;
  max-width: 46rem;
  padding: 2rem 1rem;
  font: 16px/1.6 -apple-system, \"Segoe UI\", Helvetica, Arial, sans-serif;
  color: #24292f;
}
pre {
  padding: 1rem;
  overflow: auto;
  background: #f6f8fa;
  border-radius: 6px;
}
code {
  font-family: ui-monospace, SFMono-Regular, Menlo, monospace;
  font-size: 0.9em;
}
blockquote {
  margin: 0;
  padding: 0 1rem;
  color: #57606a;
  border-left: 0.25rem solid #d0d7de;
}
img {
  max-width: 100%;
}
hr {
  border: 0;
  border-top: 1px solid #d0d7de;
}";

const DARK_CSS: &str = "body {
  margin: 0 auto;
  max-width: 46rem;
  padding: 2rem 1rem;
  font: 16px/1.6 -apple-system, \"Segoe UI\", Helvetica, Arial, sans-serif;
  color: #c9d1d9;
  background: #0d1117;
}
a {
  color: #58a6ff;
}
pre {
  padding: 1rem;
  overflow: auto;
  background: #161b22;
  border-radius: 6px;
}
code {
  font-family: ui-monospace, SFMono-Regular, Menlo, monospace;
  font-size: 0.9em;
}
blockquote {
  margin: 0;
  padding: 0 1rem;
  color: #8b949e;
  border-left: 0.25rem solid #30363d;
}
img {
  max-width: 100%;
}
hr {
  border: 0;
  border-top: 1px solid #30363d;
}";

/// Build the standard page shell, optionally with an inline stylesheet.
pub fn page_shell(css: Option<&str>) -> String {
    let mut page = String::from(SHELL_HEAD);
    if let Some(css) = css {
        page.push_str("<style>\n");
        page.push_str(css.trim_end());
        page.push_str("\n</style>\n");
    }
    page.push_str(SHELL_BODY);
    page
}

/// A validated page template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
}

impl Template {
    /// Validate `source` as the template of theme `name`.
    ///
    /// The template must contain exactly one `{{body}}` placeholder; the
    /// only other placeholder allowed is `{{title}}`.
    pub fn parse(name: &str, source: impl Into<String>) -> Result<Self> {
        let source = source.into();
        let invalid = |reason: String| Error::InvalidTemplate {
            name: name.to_string(),
            reason,
        };

        let mut bodies = 0;
        for caps in PLACEHOLDER.captures_iter(&source) {
            match &caps[1] {
                "body" => bodies += 1,
                "title" => {}
                other => return Err(invalid(format!("unknown placeholder {{{{{other}}}}}"))),
            }
        }
        match bodies {
            0 => Err(invalid("missing {{body}} placeholder".to_string())),
            1 => Ok(Self { source }),
            n => Err(invalid(format!("{n} {{{{body}}}} placeholders, expected one"))),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Substitute the body and the escaped title into the template.
    pub fn render(&self, title: &str, body: &str) -> String {
        let mut escaped_title = String::with_capacity(title.len());
        escape_text(title, &mut escaped_title);

        PLACEHOLDER
            .replace_all(&self.source, |caps: &Captures| match &caps[1] {
                "body" => body.to_string(),
                _ => escaped_title.clone(),
            })
            .into_owned()
    }
}

/// A named template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub name: String,
    pub template: Template,
}

/// Anything that can look up a theme by name
pub trait ThemeResolver {
    /// Find the theme called `name`, or fail with [`Error::ThemeNotFound`].
    fn resolve(&self, name: &str) -> Result<Theme>;
}

/// Insertion-ordered theme registry
#[derive(Debug, Clone)]
pub struct Themes {
    templates: IndexMap<String, Template>,
}

impl Themes {
    /// Create a registry holding the built-in themes
    pub fn new() -> Self {
        let mut themes = Self::empty();
        for (name, css) in [
            ("default", Some(DEFAULT_CSS)),
            ("dark", Some(DARK_CSS)),
            ("minimal", None),
        ] {
            let template = Template::parse(name, page_shell(css))
                .expect("built-in templates have one body placeholder");
            themes.insert(name, template);
        }
        themes
    }

    /// Create a registry with no themes at all
    pub fn empty() -> Self {
        Self {
            templates: IndexMap::new(),
        }
    }

    /// Register a template, returning the one it replaces
    pub fn insert(&mut self, name: &str, template: Template) -> Option<Template> {
        self.templates.insert(name.to_string(), template)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// Theme names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Load themes from a directory.
    ///
    /// `<name>.html` files are full templates; `<name>.css` files are
    /// stylesheets placed in the standard page shell. When both exist the
    /// HTML template wins. Other files are ignored. Returns the number of
    /// distinct theme names loaded.
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize> {
        let io_error = |path: &Path| {
            let path = path.to_path_buf();
            move |source| Error::Io { path, source }
        };

        let mut paths: Vec<PathBuf> = fs::read_dir(dir)
            .map_err(io_error(dir))?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<_>>()
            .map_err(io_error(dir))?;
        // css before html, so a template of the same name replaces the stylesheet
        paths.sort_by(|a, b| (a.extension(), a.file_stem()).cmp(&(b.extension(), b.file_stem())));

        let mut loaded = IndexSet::new();
        for path in paths {
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let source = match path.extension().and_then(|e| e.to_str()) {
                Some("html") => fs::read_to_string(&path).map_err(io_error(&path))?,
                Some("css") => {
                    let css = fs::read_to_string(&path).map_err(io_error(&path))?;
                    page_shell(Some(&css))
                }
                _ => continue,
            };
            let template = Template::parse(name, source)?;
            debug!(theme = name, path = %path.display(), "loaded theme");
            self.insert(name, template);
            loaded.insert(name.to_string());
        }
        Ok(loaded.len())
    }
}

impl Default for Themes {
    fn default() -> Self {
        Self::new()
    }
}

impl ThemeResolver for Themes {
    fn resolve(&self, name: &str) -> Result<Theme> {
        if name.trim().is_empty() {
            return Err(Error::InvalidArgument(
                "theme name must not be empty".to_string(),
            ));
        }
        let template = self
            .templates
            .get(name)
            .ok_or_else(|| Error::ThemeNotFound(name.to_string()))?;
        debug!(theme = name, "resolved theme");
        Ok(Theme {
            name: name.to_string(),
            template: template.clone(),
        })
    }
}
