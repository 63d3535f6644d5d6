use std::path::PathBuf;

use clap::Args;
use md_nav::export;

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Directory containing markdown files
    pub dir: PathBuf,

    /// Output directory for generated site
    #[arg(long, default_value = "site")]
    pub out: PathBuf,

    /// Path to navigation config YAML
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub fn run(args: &ExportArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(args.config.as_ref())?;
    let count = export::export_site(&args.dir, &args.out, &config)?;

    eprintln!("exported {count} articles to {}", args.out.display());

    Ok(())
}
