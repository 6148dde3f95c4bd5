use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use md2html::{normalize_newlines, Converter, ThemeResolver, Themes};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod config;

use config::Config;

#[derive(Parser, Debug)]
#[command(name = "md2html", version)]
#[command(about = "Convert Markdown files to HTML")]
struct Cli {
    /// Input Markdown file, or `-` for stdin
    #[arg(required_unless_present = "list_themes")]
    input: Option<PathBuf>,

    /// Output HTML file (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Wrap the body in a named theme
    #[arg(short, long)]
    theme: Option<String>,

    /// Directory with extra `<name>.html` or `<name>.css` themes
    #[arg(long)]
    theme_dir: Option<PathBuf>,

    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Render every line break as <br>
    #[arg(long)]
    hard_breaks: bool,

    /// Add id attributes to headings
    #[arg(long)]
    heading_ids: bool,

    /// More logging on stderr (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Print the available theme names and exit
    #[arg(long)]
    list_themes: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    let mut themes = Themes::new();
    if let Some(dir) = cli.theme_dir.as_ref().or(config.theme_dir.as_ref()) {
        let loaded = themes
            .load_dir(dir)
            .with_context(|| format!("loading themes from {}", dir.display()))?;
        info!(count = loaded, dir = %dir.display(), "loaded themes");
    }

    if cli.list_themes {
        let mut stdout = io::stdout().lock();
        for name in themes.names() {
            writeln!(stdout, "{name}")?;
        }
        return Ok(());
    }

    // Resolve the theme before touching the output
    let theme = cli
        .theme
        .as_deref()
        .or(config.theme.as_deref())
        .map(|name| themes.resolve(name))
        .transpose()?;

    let input = cli.input.context("no input file given")?;
    let markdown = read_input(&input)?;
    let markdown = normalize_newlines(&markdown);

    let mut options = config.render_options();
    options.hard_breaks |= cli.hard_breaks;
    options.heading_ids |= cli.heading_ids;
    let converter = Converter::with_options(options);

    let mut html = match &theme {
        Some(theme) => converter.convert_with_theme(&markdown, theme),
        None => converter.convert(&markdown),
    };
    if !html.ends_with('\n') {
        html.push('\n');
    }

    match &cli.output {
        Some(path) => {
            fs::write(path, &html).with_context(|| format!("writing {}", path.display()))?;
            info!(output = %path.display(), bytes = html.len(), "wrote html");
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(html.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut markdown = String::new();
        io::stdin()
            .read_to_string(&mut markdown)
            .context("reading stdin")?;
        return Ok(markdown);
    }
    debug!(input = %path.display(), "reading input");
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}
