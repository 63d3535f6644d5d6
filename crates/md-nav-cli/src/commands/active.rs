use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use md_nav::heading::{is_fence, parse_heading_line};
use md_nav::output::OutputFormat;
use md_nav::scroll::{History, ScrollContainer, ScrollMetrics, ScrollTracker};
use md_nav::section::SectionTree;
use md_nav::Error;

#[derive(Debug, Args)]
pub struct ActiveArgs {
    /// Markdown file, or `-` for stdin
    pub file: PathBuf,

    /// Scroll position of the container in pixels
    #[arg(long)]
    pub scroll_top: f64,

    /// Pixels per source line used to estimate heading offsets
    #[arg(long, default_value = "24")]
    pub line_height: f64,

    /// Visible height of the container in pixels
    #[arg(long, default_value = "800")]
    pub viewport: f64,

    /// Simulate a table-of-contents click on this heading id first
    #[arg(long)]
    pub jump: Option<String>,

    /// Path to navigation config YAML
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output format: text, json, auto (auto=json when piped)
    #[arg(long, default_value = "auto")]
    pub format: String,
}

/// A scroll container laid out from source line positions.
struct EstimatedLayout {
    metrics: ScrollMetrics,
    offsets: HashMap<String, f64>,
}

impl ScrollContainer for EstimatedLayout {
    type Handle = String;

    fn metrics(&self) -> Option<ScrollMetrics> {
        Some(self.metrics)
    }

    fn find(&self, id: &str) -> Option<String> {
        self.offsets.contains_key(id).then(|| id.to_string())
    }

    fn offset_top(&self, handle: &String) -> Option<f64> {
        self.offsets.get(handle).copied()
    }
}

/// Records the fragment the tracker would write to the address bar.
#[derive(Default)]
struct Fragment(Option<String>);

impl History for Fragment {
    fn replace_fragment(&mut self, id: &str) {
        self.0 = Some(id.to_string());
    }
}

pub fn run(args: &ActiveArgs) -> Result<(), Box<dyn std::error::Error>> {
    let doc = super::load_document(&args.file)?;
    let config = super::load_config(args.config.as_ref())?;
    let format = super::parse_format(&args.format)?;
    if args.line_height <= 0.0 {
        return Err("--line-height must be positive".into());
    }

    let article = doc.render(&config);
    let lines = doc.body.lines().count().max(1) as f64;
    let layout = EstimatedLayout {
        metrics: ScrollMetrics {
            scroll_top: args.scroll_top,
            scroll_height: lines * args.line_height,
            client_height: args.viewport,
        },
        offsets: estimate_offsets(&doc.body, &article.sections, args.line_height),
    };

    let mut fragment = Fragment::default();
    let mut tracker = ScrollTracker::new(config.scroll.clone());
    tracker.attach(&layout, &article.headings);
    let now = Instant::now();

    let mut jump_offset = None;
    if let Some(id) = &args.jump {
        jump_offset = Some(
            tracker
                .begin_programmatic_scroll(&layout, id, &mut fragment, now)
                .ok_or_else(|| Error::HeadingNotFound(id.clone()))?,
        );
    }

    tracker.on_scroll();
    tracker.on_animation_frame(&layout, &mut fragment, now);
    let state = tracker.state();

    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "active_id": state.active_id,
                "reading_progress": state.reading_progress,
                "fragment": fragment.0,
                "jump_offset": jump_offset,
                "programmatic": tracker.is_programmatic(),
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        _ => {
            match &state.active_id {
                Some(id) => println!("active: #{id}"),
                None => println!("active: (none)"),
            }
            println!("progress: {:.1}%", state.reading_progress);
            if let Some(offset) = jump_offset {
                println!("jump: scroll to {offset:.0}px");
            }
            if let Some(f) = &fragment.0 {
                println!("url: #{f}");
            }
        }
    }
    Ok(())
}

/// Pixel offset of every section heading, as `line_index * line_height`.
/// Sections are matched to source lines in document order, skipping fences.
fn estimate_offsets(body: &str, tree: &SectionTree, line_height: f64) -> HashMap<String, f64> {
    let mut heading_lines: Vec<(usize, u8, &str)> = Vec::new();
    let mut in_code_block = false;
    for (index, line) in body.lines().enumerate() {
        if is_fence(line) {
            in_code_block = !in_code_block;
        } else if !in_code_block {
            if let Some((level, title)) = parse_heading_line(line) {
                heading_lines.push((index, level, title));
            }
        }
    }

    let mut offsets = HashMap::new();
    let mut cursor = heading_lines.iter();
    for section in tree.flatten() {
        let found = cursor
            .by_ref()
            .find(|(_, level, title)| *level == section.level && *title == section.title);
        match found {
            Some((index, _, _)) => {
                offsets.insert(section.id.clone(), *index as f64 * line_height);
            }
            None => log::debug!("no source line for section #{}", section.id),
        }
    }
    offsets
}
