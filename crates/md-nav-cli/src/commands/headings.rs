use std::path::PathBuf;

use clap::Args;
use md_nav::output;

#[derive(Debug, Args)]
pub struct HeadingsArgs {
    /// Markdown file, or `-` for stdin
    pub file: PathBuf,

    /// Path to navigation config YAML
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output format: text, json, compact, auto (auto=json when piped)
    #[arg(long, default_value = "auto")]
    pub format: String,
}

pub fn run(args: &HeadingsArgs) -> Result<(), Box<dyn std::error::Error>> {
    let doc = super::load_document(&args.file)?;
    let config = super::load_config(args.config.as_ref())?;
    let format = super::parse_format(&args.format)?;

    let article = doc.render(&config);
    println!("{}", output::format_headings(&article.headings, format)?);
    Ok(())
}
