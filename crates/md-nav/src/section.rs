use serde::Serialize;

use crate::heading::{is_fence, parse_heading_line};
use crate::slug::{section_id, SlugRegistry};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub level: u8,
    pub title: String,
    /// Anchor id, unique within the document.
    pub id: String,
    /// Body below the heading, trimmed. Nested heading lines are kept verbatim.
    pub content: String,
}

impl Section {
    pub fn new(level: u8, title: String, id: String, content: String) -> Self {
        Self {
            level,
            title,
            id,
            content,
        }
    }
}

/// Split markdown into the sections opened by `min_level` headings.
///
/// Deeper headings stay in their parent's `content`; lines before the first
/// `min_level` heading are discarded. Heading syntax inside fenced code blocks
/// is ignored.
pub fn parse_markdown_sections(content: &str, parent_id_prefix: &str, min_level: u8) -> Vec<Section> {
    let mut registry = SlugRegistry::new();
    parse_markdown_sections_with(content, parent_id_prefix, min_level, &mut registry)
}

/// Same as [`parse_markdown_sections`], drawing ids from a shared registry so
/// they stay unique across several calls.
pub fn parse_markdown_sections_with(
    content: &str,
    parent_id_prefix: &str,
    min_level: u8,
    registry: &mut SlugRegistry,
) -> Vec<Section> {
    if content.trim().is_empty() {
        log::debug!("no markdown content to sectionize (prefix {parent_id_prefix:?})");
        return Vec::new();
    }

    split_sections(content, min_level)
        .into_iter()
        .map(|raw| {
            let id = section_id(raw.title, parent_id_prefix, raw.line_index, registry);
            Section::new(raw.level, raw.title.to_string(), id, raw.content)
        })
        .collect()
}

/// A `min_level` heading and the lines below it, before an id is assigned.
struct RawSection<'a> {
    level: u8,
    title: &'a str,
    line_index: usize,
    content: String,
}

fn split_sections(content: &str, min_level: u8) -> Vec<RawSection<'_>> {
    let mut sections = Vec::new();
    let mut current: Option<(u8, &str, usize)> = None;
    let mut buffer: Vec<&str> = Vec::new();
    let mut in_code_block = false;

    for (index, line) in content.lines().enumerate() {
        if is_fence(line) {
            in_code_block = !in_code_block;
            buffer.push(line);
            continue;
        }
        if in_code_block {
            buffer.push(line);
            continue;
        }

        match parse_heading_line(line) {
            Some((level, title)) if level == min_level => {
                if let Some((level, title, line_index)) = current.take() {
                    sections.push(RawSection {
                        level,
                        title,
                        line_index,
                        content: join_trimmed(&buffer),
                    });
                }
                buffer.clear();
                current = Some((level, title, index));
            }
            _ => buffer.push(line),
        }
    }

    if let Some((level, title, line_index)) = current {
        sections.push(RawSection {
            level,
            title,
            line_index,
            content: join_trimmed(&buffer),
        });
    }

    sections
}

fn join_trimmed(lines: &[&str]) -> String {
    lines.join("\n").trim().to_string()
}

/// Heading levels found outside fenced code blocks, with the text preceding
/// the first one.
fn scan_headings(content: &str) -> (Vec<u8>, String) {
    let mut levels = Vec::new();
    let mut leading: Vec<&str> = Vec::new();
    let mut in_code_block = false;

    for line in content.lines() {
        if is_fence(line) {
            in_code_block = !in_code_block;
        } else if !in_code_block {
            if let Some((level, _)) = parse_heading_line(line) {
                levels.push(level);
                continue;
            }
        }
        if levels.is_empty() {
            leading.push(line);
        }
    }

    (levels, join_trimmed(&leading))
}

/// Whether any line outside fenced code is a heading.
pub fn has_nested_headings(content: &str) -> bool {
    shallowest_heading_level(content).is_some()
}

/// The smallest heading level used outside fenced code, if any.
pub fn shallowest_heading_level(content: &str) -> Option<u8> {
    scan_headings(content).0.into_iter().min()
}

/// A section with its nested sections resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionNode {
    pub section: Section,
    /// Text between the heading and the first nested heading. Empty for leaves.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub intro: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SectionNode>,
}

impl SectionNode {
    /// A leaf is rendered straight from its markdown content.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// The whole document as a recursive section tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SectionTree {
    /// Text before the first top-level heading.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub preamble: String,
    pub sections: Vec<SectionNode>,
}

impl SectionTree {
    /// Sectionize a document and descend into every section with nested
    /// headings. One registry covers the whole document and ids are issued in
    /// document order, so a collision always suffixes the later heading.
    pub fn parse(content: &str) -> Self {
        let (levels, preamble) = scan_headings(content);
        let Some(top) = levels.iter().copied().min() else {
            return Self {
                preamble: content.trim().to_string(),
                sections: Vec::new(),
            };
        };

        // Deeper headings ahead of the first top-level one would be dropped by
        // the sectionizer; keep them with the preamble text.
        let preamble = match levels.first() {
            Some(&first) if first == top => preamble,
            _ => leading_text_before_level(content, top),
        };

        let mut registry = SlugRegistry::new();
        let sections = build_level(content, "", top, &mut registry);

        Self { preamble, sections }
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Every section in document (pre-)order.
    pub fn flatten(&self) -> Vec<&Section> {
        fn walk<'a>(nodes: &'a [SectionNode], out: &mut Vec<&'a Section>) {
            for node in nodes {
                out.push(&node.section);
                walk(&node.children, out);
            }
        }
        let mut out = Vec::new();
        walk(&self.sections, &mut out);
        out
    }

    /// All anchor ids in document order.
    pub fn ids(&self) -> Vec<&str> {
        self.flatten().into_iter().map(|s| s.id.as_str()).collect()
    }

    /// Find a section node by anchor id.
    pub fn find(&self, id: &str) -> Option<&SectionNode> {
        fn walk<'a>(nodes: &'a [SectionNode], id: &str) -> Option<&'a SectionNode> {
            for node in nodes {
                if node.section.id == id {
                    return Some(node);
                }
                if let Some(found) = walk(&node.children, id) {
                    return Some(found);
                }
            }
            None
        }
        walk(&self.sections, id)
    }
}

/// Sections opened by `level` headings, each resolved depth-first before the
/// next sibling gets its id.
fn build_level(
    content: &str,
    prefix: &str,
    level: u8,
    registry: &mut SlugRegistry,
) -> Vec<SectionNode> {
    split_sections(content, level)
        .into_iter()
        .map(|raw| {
            let id = section_id(raw.title, prefix, raw.line_index, registry);
            let section = Section::new(raw.level, raw.title.to_string(), id, raw.content);
            build_node(section, registry)
        })
        .collect()
}

fn build_node(section: Section, registry: &mut SlugRegistry) -> SectionNode {
    let (levels, intro) = scan_headings(&section.content);
    // Descend at the shallowest nested level: level + 1 normally, deeper when
    // the author skipped a level (# then ###).
    let Some(child_level) = levels.iter().copied().min() else {
        return SectionNode {
            section,
            intro: String::new(),
            children: Vec::new(),
        };
    };

    // Deeper headings ahead of the first child belong to the intro.
    let intro = if levels.first() == Some(&child_level) {
        intro
    } else {
        leading_text_before_level(&section.content, child_level)
    };

    let children = build_level(&section.content, &section.id, child_level, registry);

    SectionNode {
        section,
        intro,
        children,
    }
}

/// Everything before the first heading of exactly `level`, outside fences.
fn leading_text_before_level(content: &str, level: u8) -> String {
    let mut leading: Vec<&str> = Vec::new();
    let mut in_code_block = false;
    for line in content.lines() {
        if is_fence(line) {
            in_code_block = !in_code_block;
        } else if !in_code_block && parse_heading_line(line).map(|(l, _)| l) == Some(level) {
            break;
        }
        leading.push(line);
    }
    join_trimmed(&leading)
}
