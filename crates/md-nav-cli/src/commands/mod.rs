use std::path::{Path, PathBuf};

use clap::Subcommand;
use md_nav::config::NavConfig;
use md_nav::document::Document;
use md_nav::output::OutputFormat;

pub mod active;
pub mod export;
pub mod headings;
pub mod render;
pub mod sections;
pub mod toc;
pub mod watch;

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the recursive section tree of a markdown file
    Sections(sections::SectionsArgs),
    /// Render a file and list the headings recovered from the HTML
    Headings(headings::HeadingsArgs),
    /// Print the table of contents as an outline, HTML list, or JSON
    Toc(toc::TocArgs),
    /// Render a file to sectioned HTML
    Render(render::RenderArgs),
    /// Export a directory of markdown files to a static site
    Export(export::ExportArgs),
    /// Compute the active heading and reading progress at a scroll position
    Active(active::ActiveArgs),
    /// Watch a file and reprint its table of contents on every change
    Watch(watch::WatchArgs),
}

/// Run the given command.
pub fn run(command: &Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Sections(args) => sections::run(args),
        Commands::Headings(args) => headings::run(args),
        Commands::Toc(args) => toc::run(args),
        Commands::Render(args) => render::run(args),
        Commands::Export(args) => export::run(args),
        Commands::Active(args) => active::run(args),
        Commands::Watch(args) => watch::run(args),
    }
}

/// Load a document from a path, or from stdin when the path is `-`.
pub(crate) fn load_document(path: &Path) -> Result<Document, Box<dyn std::error::Error>> {
    if path == Path::new("-") {
        let mut content = Vec::new();
        std::io::Read::read_to_end(&mut std::io::stdin(), &mut content)?;
        return Ok(Document::from_bytes(&content)?);
    }
    Ok(Document::from_file(path)?)
}

/// `--config` when given (a missing file is an error), defaults otherwise.
pub(crate) fn load_config(path: Option<&PathBuf>) -> Result<NavConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(NavConfig::from_file(path)?),
        None => Ok(NavConfig::default()),
    }
}

pub(crate) fn parse_format(format: &str) -> Result<OutputFormat, Box<dyn std::error::Error>> {
    OutputFormat::from_str(format).ok_or_else(|| format!("unknown format \"{format}\"").into())
}
