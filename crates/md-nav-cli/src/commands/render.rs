use std::path::PathBuf;

use clap::Args;
use md_nav::export;
use md_nav::Error;

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Markdown file, or `-` for stdin
    pub file: PathBuf,

    /// Write the HTML here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Emit a full page with table of contents and progress bar
    #[arg(long)]
    pub page: bool,

    /// Path to navigation config YAML
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub fn run(args: &RenderArgs) -> Result<(), Box<dyn std::error::Error>> {
    let doc = super::load_document(&args.file)?;
    let config = super::load_config(args.config.as_ref())?;

    let html = if args.page {
        export::export_html(&doc, &config)
    } else {
        doc.render(&config).html
    };

    match &args.output {
        Some(path) => {
            std::fs::write(path, html).map_err(|_| Error::WriteFailed(path.clone()))?;
            eprintln!("wrote {}", path.display());
        }
        None => print!("{html}"),
    }
    Ok(())
}
