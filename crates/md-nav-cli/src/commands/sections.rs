use std::path::PathBuf;

use clap::Args;
use md_nav::document::Document;
use md_nav::frontmatter::yaml_value_to_string;
use md_nav::output::{self, OutputFormat};
use md_nav::section::SectionTree;
use md_nav::Error;

#[derive(Debug, Args)]
pub struct SectionsArgs {
    /// Markdown file, or `-` for stdin
    pub file: PathBuf,

    /// Only print the subtree rooted at this section id
    #[arg(long)]
    pub id: Option<String>,

    /// Output format: text, json, compact, auto (auto=json when piped)
    #[arg(long, default_value = "auto")]
    pub format: String,
}

pub fn run(args: &SectionsArgs) -> Result<(), Box<dyn std::error::Error>> {
    let doc = super::load_document(&args.file)?;
    let format = super::parse_format(&args.format)?;
    let tree = select(doc.section_tree(), args.id.as_deref())?;

    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "path": doc.path.as_ref().map(|p| p.display().to_string()),
                "frontmatter": doc.frontmatter.as_ref().map(|fm| fm.to_json()),
                "tree": serde_json::to_value(&tree)?,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        _ => {
            print_frontmatter(&doc, format);
            if tree.is_empty() {
                eprintln!("no sections");
            } else {
                println!("{}", output::format_section_tree(&tree, format)?);
            }
        }
    }
    Ok(())
}

/// The whole tree, or the subtree rooted at `id`.
fn select(tree: SectionTree, id: Option<&str>) -> Result<SectionTree, Error> {
    let Some(id) = id else {
        return Ok(tree);
    };
    let node = tree
        .find(id)
        .ok_or_else(|| Error::SectionNotFound(id.to_string()))?;
    Ok(SectionTree {
        preamble: String::new(),
        sections: vec![node.clone()],
    })
}

fn print_frontmatter(doc: &Document, format: OutputFormat) {
    let Some(fm) = &doc.frontmatter else {
        return;
    };
    for key in fm.keys() {
        let Some(value) = fm.get(key) else {
            continue;
        };
        match format {
            OutputFormat::Compact => println!("field:{key}={}", yaml_value_to_string(value)),
            _ => println!("{key}: {}", yaml_value_to_string(value)),
        }
    }
    if format != OutputFormat::Compact {
        println!();
    }
}
