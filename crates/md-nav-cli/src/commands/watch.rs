use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use clap::Args;
use md_nav::config::NavConfig;
use md_nav::document::Document;
use md_nav::output::OutputFormat;
use notify::{RecursiveMode, Watcher};
use notify_debouncer_mini::{new_debouncer, DebounceEventResult};

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Markdown file to watch
    pub file: PathBuf,

    /// Path to navigation config YAML
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output format: text, json, compact, html
    #[arg(long, default_value = "text")]
    pub format: String,

    /// Debounce interval in milliseconds
    #[arg(long, default_value = "300")]
    pub debounce: u64,
}

pub fn run(args: &WatchArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.file == Path::new("-") {
        return Err("watch needs a file path, not stdin".into());
    }
    let config = super::load_config(args.config.as_ref())?;
    let format = super::parse_format(&args.format)?;
    let target = args
        .file
        .canonicalize()
        .map_err(|_| md_nav::Error::FileNotFound(args.file.clone()))?;
    let dir = target.parent().unwrap_or(Path::new(".")).to_path_buf();

    eprintln!("Watching {} for changes...", args.file.display());
    rebuild(&target, &config, format, false);

    let (tx, rx) = mpsc::channel::<DebounceEventResult>();
    let mut debouncer = new_debouncer(Duration::from_millis(args.debounce), tx)?;
    // Editors often replace the file instead of writing in place, so watch
    // the directory and filter.
    debouncer.watcher().watch(&dir, RecursiveMode::NonRecursive)?;

    loop {
        match rx.recv()? {
            Ok(events) => {
                let touched = events.iter().any(|ev| {
                    ev.path.canonicalize().unwrap_or_else(|_| ev.path.clone()) == target
                });
                if touched {
                    rebuild(&target, &config, format, true);
                }
            }
            Err(e) => log::warn!("watch error: {e:?}"),
        }
    }
}

/// Re-read the file and print a fresh table of contents. All derived state is
/// rebuilt from scratch.
fn rebuild(path: &Path, config: &NavConfig, format: OutputFormat, changed: bool) {
    let doc = match Document::from_file(path) {
        Ok(doc) => doc,
        Err(e) => {
            eprintln!("[{}] {e}", timestamp());
            return;
        }
    };
    let article = doc.render(config);
    let active = article.headings.first().map(|h| h.id.as_str());

    match super::toc::format_toc(&article.toc, active, format) {
        Ok(out) => {
            if changed && format == OutputFormat::Text {
                print!("\x1B[2J\x1B[H");
            }
            eprintln!(
                "[{}] {}: {} sections, {} headings",
                timestamp(),
                path.display(),
                article.sections.flatten().len(),
                article.headings.len()
            );
            print!("{out}");
        }
        Err(e) => eprintln!("[{}] {e}", timestamp()),
    }
}

fn timestamp() -> String {
    let since_midnight = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
        % 86400;
    let h = since_midnight / 3600;
    let m = (since_midnight % 3600) / 60;
    let s = since_midnight % 60;
    format!("{h:02}:{m:02}:{s:02}")
}
