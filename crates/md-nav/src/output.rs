use std::io::IsTerminal;

use crate::error::Result;
use crate::heading::Heading;
use crate::section::{SectionNode, SectionTree};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    /// One line per entry: `level:id:title`
    Compact,
    Html,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            "compact" => Some(Self::Compact),
            "html" => Some(Self::Html),
            "auto" => Some(Self::auto()),
            _ => None,
        }
    }

    /// Auto-detect: JSON when stdout is not a TTY, text otherwise.
    pub fn auto() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Text
        } else {
            Self::Json
        }
    }
}

/// Indented outline of the section tree, with leaf/container markers and
/// content sizes.
pub fn format_section_tree(tree: &SectionTree, format: OutputFormat) -> Result<String> {
    fn text(nodes: &[SectionNode], depth: usize, out: &mut String) {
        for node in nodes {
            let s = &node.section;
            let kind = if node.is_leaf() { "leaf" } else { "container" };
            out.push_str(&format!(
                "{}{} {} (#{}, {kind}, {} bytes)\n",
                "  ".repeat(depth),
                "#".repeat(s.level as usize),
                s.title,
                s.id,
                s.content.len(),
            ));
            text(&node.children, depth + 1, out);
        }
    }

    let out = match format {
        OutputFormat::Json => serde_json::to_string_pretty(tree)?,
        OutputFormat::Compact => tree
            .flatten()
            .iter()
            .map(|s| format!("{}:{}:{}", s.level, s.id, s.title))
            .collect::<Vec<_>>()
            .join("\n"),
        _ => {
            let mut out = String::new();
            text(&tree.sections, 0, &mut out);
            out.trim_end().to_string()
        }
    };
    Ok(out)
}

/// Flat heading list.
pub fn format_headings(headings: &[Heading], format: OutputFormat) -> Result<String> {
    let out = match format {
        OutputFormat::Json => serde_json::to_string_pretty(headings)?,
        OutputFormat::Compact => headings
            .iter()
            .map(|h| format!("{}:{}:{}", h.level, h.id, h.text))
            .collect::<Vec<_>>()
            .join("\n"),
        _ => headings
            .iter()
            .map(|h| format!("h{} #{} {}", h.level, h.id, h.text))
            .collect::<Vec<_>>()
            .join("\n"),
    };
    Ok(out)
}
