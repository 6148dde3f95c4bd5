use std::fs;
use std::path::{Path, PathBuf};

use md2html::{Error, Options};
use serde::Deserialize;
use tracing::debug;

/// Settings read from an `md2html.toml` file
#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Theme used when `--theme` is not given
    pub theme: Option<String>,
    /// Extra theme directory, relative to the config file
    pub theme_dir: Option<PathBuf>,
    pub render: RenderConfig,
}

#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    pub hard_breaks: bool,
    pub heading_ids: bool,
    pub code_class_prefix: Option<String>,
}

impl Config {
    /// Load config from a TOML file. The file must exist.
    pub fn load(path: &Path) -> md2html::Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config: Self = toml::from_str(&content).map_err(|err| Error::Config {
            path: path.to_path_buf(),
            message: err.message().to_string(),
        })?;

        if let (Some(dir), Some(base)) = (&config.theme_dir, path.parent()) {
            if dir.is_relative() {
                config.theme_dir = Some(base.join(dir));
            }
        }
        debug!(path = %path.display(), ?config, "loaded config");
        Ok(config)
    }

    /// Render options described by the `[render]` table
    pub fn render_options(&self) -> Options {
        let mut options = Options {
            hard_breaks: self.render.hard_breaks,
            heading_ids: self.render.heading_ids,
            ..Options::default()
        };
        if let Some(prefix) = &self.render.code_class_prefix {
            options.code_class_prefix = prefix.clone();
        }
        options
    }
}
