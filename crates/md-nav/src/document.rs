use std::path::{Path, PathBuf};

use crate::config::NavConfig;
use crate::error::{Error, Result};
use crate::extract;
use crate::frontmatter::Frontmatter;
use crate::heading::Heading;
use crate::render;
use crate::section::SectionTree;
use crate::toc::{self, HeadingTree};

/// A markdown article: optional frontmatter plus the body that gets
/// sectionized.
#[derive(Debug, Clone)]
pub struct Document {
    pub path: Option<PathBuf>,
    pub raw: String,
    pub frontmatter: Option<Frontmatter>,
    pub body: String,
}

/// Everything derived from one document body. Rebuilt from scratch whenever
/// the source text changes.
#[derive(Debug, Clone)]
pub struct RenderedArticle {
    pub sections: SectionTree,
    pub html: String,
    pub headings: Vec<Heading>,
    pub toc: HeadingTree,
}

impl Document {
    /// Load a document from a file path.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let bytes = std::fs::read(path)?;
        let mut doc = Self::from_bytes(&bytes)?;
        doc.path = Some(path.to_path_buf());
        Ok(doc)
    }

    /// Parse a document from raw bytes. Invalid UTF-8 is replaced rather than
    /// rejected, so a stray byte never blanks the whole article.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        match std::str::from_utf8(bytes) {
            Ok(content) => Self::from_str(content),
            Err(e) => {
                log::warn!("markdown is not valid UTF-8 ({e}); decoding lossily");
                Self::from_str(&String::from_utf8_lossy(bytes))
            }
        }
    }

    /// Parse a document from a string.
    pub fn from_str(content: &str) -> Result<Self> {
        let (frontmatter, body) = Frontmatter::try_parse(content)?;
        Ok(Self {
            path: None,
            raw: content.to_string(),
            frontmatter,
            body,
        })
    }

    pub fn section_tree(&self) -> SectionTree {
        SectionTree::parse(&self.body)
    }

    /// Frontmatter `title`, else the first section title, else the file stem.
    pub fn title(&self) -> Option<String> {
        self.frontmatter
            .as_ref()
            .and_then(|fm| fm.get_display("title"))
            .or_else(|| {
                self.section_tree()
                    .sections
                    .first()
                    .map(|n| n.section.title.clone())
            })
            .or_else(|| {
                self.path
                    .as_ref()
                    .and_then(|p| p.file_stem())
                    .map(|s| s.to_string_lossy().to_string())
            })
    }

    /// Sectionize, render, recover the rendered headings and nest them.
    pub fn render(&self, config: &NavConfig) -> RenderedArticle {
        let sections = self.section_tree();
        let html = render::render_tree(&sections, &config.render);
        let headings = extract::extract_headings_upto(&html, config.toc.max_level);
        let toc = toc::build_heading_tree(&headings);
        RenderedArticle {
            sections,
            html,
            headings,
            toc,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
---
title: Portfolio Engine
---

# Overview

What it does.

## Stack

Rust.

## Stack

Still Rust.

# Setup

```sh
# install
cargo install md-nav
```
";

    #[test]
    fn test_from_str() {
        let doc = Document::from_str(SAMPLE).unwrap();
        assert!(doc.frontmatter.is_some());
        assert!(doc.body.trim_start().starts_with("# Overview"));
        assert_eq!(doc.title().as_deref(), Some("Portfolio Engine"));
    }

    #[test]
    fn test_title_falls_back_to_first_section() {
        let doc = Document::from_str("# First\n\nbody\n").unwrap();
        assert_eq!(doc.title().as_deref(), Some("First"));
    }

    #[test]
    fn test_from_bytes_lossy() {
        let doc = Document::from_bytes(b"# Caf\xe9\n\nbody\n").unwrap();
        let tree = doc.section_tree();
        assert_eq!(tree.sections.len(), 1);
        assert_eq!(tree.sections[0].section.id, "caf");
    }

    #[test]
    fn test_render_pipeline() {
        let doc = Document::from_str(SAMPLE).unwrap();
        let article = doc.render(&NavConfig::default());
        let ids: Vec<&str> = article.headings.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["overview", "overview-stack", "overview-stack-1", "setup"]);
        assert_eq!(article.toc.roots().len(), 2);
        assert_eq!(article.toc.len(), 4);
        assert!(!ids.contains(&"install"));
    }

    #[test]
    fn test_from_file_missing() {
        assert!(matches!(
            Document::from_file("/definitely/not/here.md"),
            Err(Error::FileNotFound(_))
        ));
    }
}
