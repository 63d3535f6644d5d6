use std::path::PathBuf;

use clap::Args;
use md_nav::output::{self, OutputFormat};
use md_nav::toc::{self as nav_toc, HeadingTree};
use md_nav::Error;

#[derive(Debug, Args)]
pub struct TocArgs {
    /// Markdown file, or `-` for stdin
    pub file: PathBuf,

    /// Heading id to mark active
    #[arg(long)]
    pub active: Option<String>,

    /// Path to navigation config YAML
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output format: text, json, compact, html, auto (auto=json when piped)
    #[arg(long, default_value = "auto")]
    pub format: String,
}

pub fn run(args: &TocArgs) -> Result<(), Box<dyn std::error::Error>> {
    let doc = super::load_document(&args.file)?;
    let config = super::load_config(args.config.as_ref())?;
    let format = super::parse_format(&args.format)?;

    let article = doc.render(&config);
    if let Some(id) = &args.active {
        if article.toc.find(id).is_none() {
            return Err(Error::HeadingNotFound(id.clone()).into());
        }
    }

    print!("{}", format_toc(&article.toc, args.active.as_deref(), format)?);
    Ok(())
}

pub(crate) fn format_toc(
    tree: &HeadingTree,
    active: Option<&str>,
    format: OutputFormat,
) -> Result<String, Box<dyn std::error::Error>> {
    let out = match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "active": active,
                "toc": tree.to_json(),
            });
            format!("{}\n", serde_json::to_string_pretty(&json)?)
        }
        OutputFormat::Html => nav_toc::render_toc_html(tree, active),
        OutputFormat::Compact => {
            let flat: Vec<_> = tree.flatten().into_iter().cloned().collect();
            format!("{}\n", output::format_headings(&flat, OutputFormat::Compact)?)
        }
        OutputFormat::Text => nav_toc::render_toc_text(tree, active),
    };
    Ok(out)
}
